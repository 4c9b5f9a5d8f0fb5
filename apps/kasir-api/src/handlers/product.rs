use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tracing::info;

use kasir_core::model::{CreateProductRequest, Product, UpdateProductRequest};
use kasir_core::response::ApiResponse;

use super::{created, list, ok, respond, ApiJson};
use crate::error::ApiError;
use crate::AppState;

const KIND: &str = "kasir#product";
const LIST_KIND: &str = "kasir#productList";

/// `?name=&active=`; `active` stays raw so its parse error is ours.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub name: Option<String>,
    pub active: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Response, ApiError> {
    info!(name = ?query.name, active = ?query.active, "GET /api/products - Fetching products");
    let products = state
        .products
        .fetch(query.name.as_deref(), query.active.as_deref())
        .await?;
    Ok(list(LIST_KIND, products))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    info!("GET /api/products/{} - Fetching product", id);
    let product = state.products.fetch_by_id(&id).await?;
    Ok(ok(KIND, product))
}

pub async fn create_product(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateProductRequest>,
) -> Result<Response, ApiError> {
    info!("POST /api/products - Creating product");
    let product = state.products.create(request).await?;
    Ok(created(KIND, product))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateProductRequest>,
) -> Result<Response, ApiError> {
    info!("PUT /api/products/{} - Updating product", id);
    let product = state.products.update_by_id(&id, request).await?;
    Ok(ok(KIND, product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    info!("DELETE /api/products/{} - Deleting product", id);
    state.products.delete_by_id(&id).await?;
    Ok(respond(
        StatusCode::OK,
        ApiResponse::<Product>::empty().with_kind(KIND),
    ))
}
