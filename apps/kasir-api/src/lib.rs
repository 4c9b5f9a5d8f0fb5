//! # Kasir API
//!
//! HTTP server for the Kasir point of sale backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir API                                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Router (axum) + TraceLayer                                     │   │
//! │  │  /health  /api/categories  /api/products                        │   │
//! │  │  /api/transactions  /api/reports                                │   │
//! │  └──────────────────────────┬──────────────────────────────────────┘   │
//! │                             │ AppState                                 │
//! │                             ▼                                          │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Services: Category, Product, Transaction                       │   │
//! │  └──────────────────────────┬──────────────────────────────────────┘   │
//! │                             │ Arc<dyn *Repository>                     │
//! │                             ▼                                          │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  kasir-db: SQLite or in-memory                                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod services;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use kasir_db::Repositories;

use crate::config::AppConfig;
use crate::services::{CategoryService, ProductService, TransactionService};

pub use error::{ApiError, ErrorCode};

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub categories: Arc<CategoryService>,
    pub products: Arc<ProductService>,
    pub transactions: Arc<TransactionService>,
}

impl AppState {
    /// Wires the services over `repos` using the configured actor and currency.
    pub fn new(repos: Repositories, config: &AppConfig) -> Self {
        let currency = config.currency();

        AppState {
            categories: Arc::new(CategoryService::new(
                repos.categories.clone(),
                config.actor.clone(),
            )),
            products: Arc::new(ProductService::new(
                repos.products.clone(),
                repos.categories,
                config.actor.clone(),
                currency.clone(),
            )),
            transactions: Arc::new(TransactionService::new(
                repos.transactions,
                repos.products,
                config.actor.clone(),
                currency,
            )),
        }
    }
}

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(handlers::health::router())
        .merge(handlers::category::router())
        .merge(handlers::product::router())
        .merge(handlers::transaction::router())
        .merge(handlers::report::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Router Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        build_router(AppState::new(Repositories::in_memory(), &AppConfig::default()))
    }

    /// Sends one request; returns status, `ETag` header and JSON body.
    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Option<String>, Value) {
        let request = match body {
            Some(body) => Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let etag = response
            .headers()
            .get(header::ETAG)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, etag, json)
    }

    async fn create_product(app: &Router, name: &str, price: i64, stocks: i64) -> String {
        let (status, _, body) = send(
            app,
            Method::POST,
            "/api/products",
            Some(json!({ "name": name, "price": price, "stocks": stocks })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["data"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, _, body) = send(&app(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "OK" }));
    }

    #[tokio::test]
    async fn test_category_lifecycle() {
        let app = app();

        let (status, etag, body) = send(
            &app,
            Method::POST,
            "/api/categories",
            Some(json!({ "name": "Minuman", "description": "Dingin" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["kind"], "kasir#category");
        assert_eq!(etag, Some(format!("\"{}\"", body["etag"].as_str().unwrap())));
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, _, body) = send(
            &app,
            Method::PUT,
            &format!("/api/categories/{}", id),
            Some(json!({ "name": "Minuman Dingin", "version": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["version"], 2);

        let (status, _, body) = send(
            &app,
            Method::PUT,
            &format!("/api/categories/{}", id),
            Some(json!({ "name": "Stale", "version": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], 409);

        let (status, _, body) = send(&app, Method::GET, "/api/categories", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["kind"], "kasir#categoryList");
        assert_eq!(body["data"]["items"][0]["name"], "Minuman Dingin");

        let (status, etag, body) =
            send(&app, Method::DELETE, &format!("/api/categories/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("data").is_none());
        assert!(etag.is_none());

        let (status, _, body) =
            send(&app, Method::GET, &format!("/api/categories/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["errors"][0]["reason"], "notFound");
    }

    #[tokio::test]
    async fn test_empty_list_keeps_items() {
        let (status, _, body) = send(&app(), Method::GET, "/api/products", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!({ "items": [] }));
        assert!(body["etag"].as_str().is_some_and(|e| !e.is_empty()));
    }

    #[tokio::test]
    async fn test_product_filters_and_bad_input() {
        let app = app();
        create_product(&app, "Apple Juice", 12_000, 5).await;
        create_product(&app, "Kopi", 5_000, 5).await;

        let (status, _, body) =
            send(&app, Method::GET, "/api/products?name=apple&active=true", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);

        let (status, _, body) = send(&app, Method::GET, "/api/products?active=maybe", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["errors"][0]["reason"], "invalidParameter");

        let (status, _, _) = send(&app, Method::GET, "/api/products/not-an-id", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/products")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"name\": "))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_checkout_and_report() {
        let app = app();
        let kopi = create_product(&app, "Kopi", 1000, 10).await;

        let (status, _, body) = send(
            &app,
            Method::POST,
            "/api/transactions",
            Some(json!({ "items": [{ "product_id": kopi, "quantity": 2 }] })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["kind"], "kasir#transaction");
        assert_eq!(body["data"]["total_items"], 2);
        assert_eq!(body["data"]["total_price"]["amount"], 2000);

        let (_, _, body) = send(&app, Method::GET, &format!("/api/products/{}", kopi), None).await;
        assert_eq!(body["data"]["stocks"], 8);

        let (status, _, body) = send(
            &app,
            Method::POST,
            "/api/transactions",
            Some(json!({ "items": [{ "product_id": kopi, "quantity": 9 }] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "insufficient stock for product: Kopi");

        let (status, _, body) = send(&app, Method::GET, "/api/reports/today", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total_transactions"], 1);
        assert_eq!(body["data"]["top_popular_items"][0]["name"], "Kopi");

        let (status, _, body) =
            send(&app, Method::GET, "/api/reports/popular-product", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total_sold_qty"], 2);
    }

    #[tokio::test]
    async fn test_report_errors() {
        let app = app();

        let (status, _, body) = send(
            &app,
            Method::GET,
            "/api/reports?startDate=2024-01-02&endDate=2024-01-01",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "startDate cannot be after endDate");

        let (status, _, _) = send(&app, Method::GET, "/api/reports/fortnight", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _, _) =
            send(&app, Method::GET, "/api/reports/popular-category", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _, body) = send(
            &app,
            Method::POST,
            "/api/transactions",
            Some(json!({ "items": [] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["errors"][0]["reason"], "required");
    }
}
