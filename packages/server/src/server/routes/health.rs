use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    actions: usize,
    transactions: usize,
}

/// Health check endpoint
///
/// The manager lives in-process, so the server is healthy whenever it can
/// answer. Reports registered action and transaction counts.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            actions: state.manager.list_actions().len(),
            transactions: state.manager.transaction_count(),
        }),
    )
}
