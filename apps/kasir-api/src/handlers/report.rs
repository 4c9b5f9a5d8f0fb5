//! Sales reports.
//!
//! `/api/reports/{period}` is a shortcut for `?period=`; when both are
//! present the query parameter wins.

use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tracing::info;

use super::ok;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/reports", get(get_report))
        .route("/api/reports/popular-category", get(get_popular_category))
        .route("/api/reports/popular-product", get(get_popular_product))
        .route("/api/reports/:period", get(get_report_for_period))
}

pub async fn get_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    info!(?query, "GET /api/reports - Building report");
    let report = state
        .transactions
        .fetch_report(&query.start_date, &query.end_date, &query.period)
        .await?;
    Ok(ok("kasir#report", report))
}

pub async fn get_report_for_period(
    State(state): State<AppState>,
    Path(period): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    info!("GET /api/reports/{} - Building report", period);
    let period = if query.period.is_empty() {
        period
    } else {
        query.period
    };
    let report = state
        .transactions
        .fetch_report(&query.start_date, &query.end_date, &period)
        .await?;
    Ok(ok("kasir#report", report))
}

pub async fn get_popular_category(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    info!("GET /api/reports/popular-category - Finding top category");
    let top = state
        .transactions
        .fetch_most_popular_category(&query.start_date, &query.end_date)
        .await?;
    Ok(ok("kasir#popularCategory", top))
}

pub async fn get_popular_product(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    info!("GET /api/reports/popular-product - Finding top product");
    let top = state
        .transactions
        .fetch_most_popular_product(&query.start_date, &query.end_date)
        .await?;
    Ok(ok("kasir#popularProduct", top))
}
