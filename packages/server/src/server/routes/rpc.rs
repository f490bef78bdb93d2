//! RPC endpoints.
//!
//! POST /api/<method> with a JSON params body; the result is the JSON body
//! of a 200 response. Failures use the shared error envelope.

use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use interval_core::{Invocation, Snapshot, TransactionId, TransactionState, TransactionSummary};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeParams {
    #[serde(alias = "slug")]
    pub action_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionParams {
    pub transaction_id: TransactionId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondParams {
    pub transaction_id: TransactionId,
    /// Missing is treated as `null` and fails validation like any bad body.
    #[serde(default)]
    pub body: Value,
}

/// `{transactionId, value, version}`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateResponse {
    pub transaction_id: TransactionId,
    #[serde(flatten)]
    pub snapshot: Snapshot<TransactionState>,
}

pub async fn invoke_transaction(
    Extension(state): Extension<AppState>,
    params: Result<Json<InvokeParams>, JsonRejection>,
) -> Result<Json<Invocation>, ApiError> {
    let Json(params) = params?;
    let invocation = state.manager.invoke(&params.action_name)?;
    Ok(Json(invocation))
}

pub async fn get_transaction_state(
    Extension(state): Extension<AppState>,
    params: Result<Json<TransactionParams>, JsonRejection>,
) -> Result<Json<StateResponse>, ApiError> {
    let Json(params) = params?;
    let snapshot = state.manager.get_state(params.transaction_id)?;
    Ok(Json(StateResponse {
        transaction_id: params.transaction_id,
        snapshot,
    }))
}

pub async fn respond_to_io_request(
    Extension(state): Extension<AppState>,
    params: Result<Json<RespondParams>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(params) = params?;
    state
        .manager
        .respond_to_io_request(params.transaction_id, &params.body)?;
    Ok(Json(json!({})))
}

pub async fn list_available_actions(Extension(state): Extension<AppState>) -> Json<Vec<String>> {
    Json(state.manager.list_actions())
}

pub async fn list_transactions(
    Extension(state): Extension<AppState>,
) -> Json<Vec<TransactionSummary>> {
    Json(state.manager.list_transactions())
}
