//! HTTP client for an interval server.
//!
//! Wraps the RPC endpoints, decodes the snapshot event stream, and merges
//! what both channels report through a version-based [`Reconciler`].
//!
//! # Example
//!
//! ```rust,ignore
//! use interval_client::{IntervalClient, TransactionWatcher};
//! use serde_json::json;
//!
//! let client = IntervalClient::new("http://localhost:3001");
//! let invocation = client.invoke("hello").await?;
//!
//! let mut watcher = TransactionWatcher::new(client.clone(), invocation.transaction_id).await?;
//! watcher.wait_until(|s| s.pending_io_request.is_some()).await?;
//!
//! client.respond(invocation.transaction_id, &json!("Ada")).await?;
//! let done = watcher.wait_until(|s| s.status.is_terminal()).await?;
//! println!("finished with {}", done.value.status);
//! ```

mod client;
pub mod error;
pub mod events;
pub mod reconciler;
mod watch;

pub use client::IntervalClient;
pub use error::{ClientError, Result};
pub use events::SnapshotEvents;
pub use reconciler::{resolve, Reconciler};
pub use watch::TransactionWatcher;
