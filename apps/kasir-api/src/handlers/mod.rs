//! # HTTP Handlers
//!
//! Each module exposes a `router()` mounted by [`crate::build_router`].
//! Handlers translate between HTTP and the services; every body is an
//! [`ApiResponse`] envelope.

use axum::extract::FromRequest;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use kasir_core::response::ApiResponse;

use crate::error::ApiError;

pub mod category;
pub mod health;
pub mod product;
pub mod report;
pub mod transaction;

/// JSON body extractor whose rejections use the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Writes `body` with `status`, mirroring its etag into the `ETag` header.
pub(crate) fn respond<T: Serialize>(status: StatusCode, body: ApiResponse<T>) -> Response {
    let etag = body
        .etag
        .as_deref()
        .and_then(|etag| HeaderValue::from_str(&format!("\"{}\"", etag)).ok());

    let mut response = (status, Json(body)).into_response();
    if let Some(etag) = etag {
        response.headers_mut().insert(header::ETAG, etag);
    }
    response
}

/// 200 with `data` under `kind`.
pub(crate) fn ok<T: Serialize>(kind: &str, data: T) -> Response {
    respond(StatusCode::OK, ApiResponse::new(data).with_kind(kind))
}

/// 201 with `data` under `kind`.
pub(crate) fn created<T: Serialize>(kind: &str, data: T) -> Response {
    respond(StatusCode::CREATED, ApiResponse::new(data).with_kind(kind))
}

/// 200 with `{"items": [...]}` under `kind`.
pub(crate) fn list<T: Serialize>(kind: &str, items: Vec<T>) -> Response {
    respond(StatusCode::OK, ApiResponse::with_items(Some(items)).with_kind(kind))
}
