//! SSE snapshot endpoint.
//!
//! GET /api/events/:transaction_id
//!
//! Subscribes to one transaction's state and forwards every snapshot as an
//! SSE event named `snapshot`, starting with the current one. Unknown ids
//! are rejected with 404 before the stream starts.

use std::convert::Infallible;

use axum::{
    extract::{rejection::PathRejection, Extension, Path},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::StreamExt;
use interval_core::TransactionId;

use crate::server::app::AppState;
use crate::server::error::ApiError;

/// SSE stream handler.
pub async fn events_handler(
    Extension(state): Extension<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Sse<impl futures::Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let Path(id) = path?;
    let transaction_id = TransactionId(id);

    let snapshots = state.manager.subscribe(transaction_id)?;
    tracing::debug!(transaction_id = %transaction_id, "Event stream opened");

    let events = snapshots.filter_map(move |snapshot| async move {
        match Event::default().event("snapshot").json_data(&snapshot) {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                tracing::warn!(
                    transaction_id = %transaction_id,
                    version = snapshot.version,
                    error = %e,
                    "Failed to encode snapshot"
                );
                None
            }
        }
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::new().interval(state.sse_keep_alive)))
}
