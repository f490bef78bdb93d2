// HTTP server setup (Axum RPC + SSE)
pub mod app;
pub mod error;
pub mod routes;

pub use app::*;
pub use error::ApiError;
