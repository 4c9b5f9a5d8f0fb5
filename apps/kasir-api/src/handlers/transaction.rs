use axum::extract::State;
use axum::response::Response;
use axum::routing::post;
use axum::Router;
use tracing::info;

use kasir_core::model::CreateTransactionRequest;

use super::{created, ApiJson};
use crate::error::ApiError;
use crate::AppState;

const KIND: &str = "kasir#transaction";

pub fn router() -> Router<AppState> {
    Router::new().route("/api/transactions", post(create_transaction))
}

pub async fn create_transaction(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateTransactionRequest>,
) -> Result<Response, ApiError> {
    info!(lines = request.items.len(), "POST /api/transactions - Creating transaction");
    let transaction = state.transactions.create(request).await?;
    Ok(created(KIND, transaction))
}
