use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tracing::info;

use kasir_core::model::{Category, CreateCategoryRequest, UpdateCategoryRequest};
use kasir_core::response::ApiResponse;

use super::{created, list, ok, respond, ApiJson};
use crate::error::ApiError;
use crate::AppState;

const KIND: &str = "kasir#category";
const LIST_KIND: &str = "kasir#categoryList";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(list_categories).post(create_category))
        .route(
            "/api/categories/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
}

pub async fn list_categories(State(state): State<AppState>) -> Result<Response, ApiError> {
    info!("GET /api/categories - Fetching all categories");
    let categories = state.categories.fetch_all().await?;
    Ok(list(LIST_KIND, categories))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    info!("GET /api/categories/{} - Fetching category", id);
    let category = state.categories.fetch_by_id(&id).await?;
    Ok(ok(KIND, category))
}

pub async fn create_category(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateCategoryRequest>,
) -> Result<Response, ApiError> {
    info!("POST /api/categories - Creating category");
    let category = state.categories.create(request).await?;
    Ok(created(KIND, category))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateCategoryRequest>,
) -> Result<Response, ApiError> {
    info!("PUT /api/categories/{} - Updating category", id);
    let category = state.categories.update_by_id(&id, request).await?;
    Ok(ok(KIND, category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    info!("DELETE /api/categories/{} - Deleting category", id);
    state.categories.delete_by_id(&id).await?;
    Ok(respond(
        StatusCode::OK,
        ApiResponse::<Category>::empty().with_kind(KIND),
    ))
}
