#![allow(dead_code)]

//! Test harness for router-level and end-to-end tests.
//!
//! [`test_manager`] registers small deterministic actions. [`TestHarness`]
//! serves the full app on an ephemeral port and hands out a client.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use axum::{body::Body, http::Request, Router};
use interval_client::IntervalClient;
use interval_core::{io, Action, InputNumberProps, TransactionManager};
use interval_server::{server::build_app, Config};
use serde_json::Value;
use tokio::task::JoinHandle;
use tower::ServiceExt;

/// Initialize a tracing subscriber that respects RUST_LOG.
///
/// Uses try_init() so every test can call it.
/// Run tests with: RUST_LOG=debug cargo test -- --nocapture
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Actions used across the server tests.
pub fn test_manager() -> TransactionManager {
    TransactionManager::builder()
        .action(
            "hello",
            Action::new(|| async {
                let name = io::input_text("What is your name?").await?;
                tracing::info!("Hello, {}", name);
                Ok(())
            }),
        )
        .action(
            "pick_number",
            Action::new(|| async {
                let n = io::input_number(InputNumberProps::new("Pick a number").min(1.0).max(10.0))
                    .await?;
                tracing::info!(n, "Picked");
                Ok(())
            }),
        )
        .action(
            "always_fails",
            Action::new(|| async { bail!("this action always fails") }),
        )
        .action(
            "sleeper",
            Action::new(|| async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            }),
        )
        .build()
}

pub fn test_config() -> Config {
    Config {
        sse_keep_alive: Duration::from_millis(200),
        ..Config::default()
    }
}

pub fn test_app() -> Router {
    init_tracing();
    build_app(Arc::new(test_manager()), &test_config())
}

/// POST a JSON body to an RPC route and return status plus parsed body.
pub async fn rpc(app: &Router, method: &str, params: Value) -> (u16, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/{}", method))
        .header("content-type", "application/json")
        .body(Body::from(params.to_string()))
        .expect("valid request");

    send(app, request).await
}

/// Send any request through the router.
pub async fn send(app: &Router, request: Request<Body>) -> (u16, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");

    let status = response.status().as_u16();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };

    (status, body)
}

/// The full app served on an ephemeral port.
pub struct TestHarness {
    pub base_url: String,
    pub manager: Arc<TransactionManager>,
    server: JoinHandle<()>,
}

impl TestHarness {
    pub async fn start() -> Result<Self> {
        init_tracing();

        let manager = Arc::new(test_manager());
        let app = build_app(manager.clone(), &test_config());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind test listener")?;
        let addr = listener.local_addr()?;

        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Test server failed");
            }
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            manager,
            server,
        })
    }

    pub fn client(&self) -> IntervalClient {
        IntervalClient::new(&self.base_url)
    }
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        self.server.abort();
    }
}
