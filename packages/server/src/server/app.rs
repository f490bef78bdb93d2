//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use interval_core::TransactionManager;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::server::routes::{
    events_handler, get_transaction_state, health_handler, invoke_transaction,
    list_available_actions, list_transactions, respond_to_io_request,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<TransactionManager>,
    pub sse_keep_alive: Duration,
}

/// Build the Axum application router
pub fn build_app(manager: Arc<TransactionManager>, config: &Config) -> Router {
    let app_state = AppState {
        manager,
        sse_keep_alive: config.sse_keep_alive,
    };

    // RPC calls are short; only they get a timeout
    let rpc = Router::new()
        .route("/api/invoke_transaction", post(invoke_transaction))
        .route("/api/get_transaction_state", post(get_transaction_state))
        .route("/api/respond_to_io_request", post(respond_to_io_request))
        .route("/api/list_available_actions", post(list_available_actions))
        .route("/api/list_transactions", post(list_transactions))
        .layer(TimeoutLayer::new(config.request_timeout));

    Router::new()
        .merge(rpc)
        .route("/api/events/:transaction_id", get(events_handler))
        .route("/health", get(health_handler))
        .layer(Extension(app_state))
        .layer(cors_layer(&config.allowed_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
}
