//! # Interval Core
//!
//! Long-running server-side actions that pause to ask a remote caller for
//! typed input, and publish their evolving status as versioned snapshots.
//!
//! ## Core Concepts
//!
//! - [`Action`] = a named handler registered with the manager
//! - [`Transaction`] = one run of an action, with its own versioned state
//! - [`IoMethod`] = a typed request for input (what the handler waits on)
//! - [`Snapshot`] = `{value, version}`, the only shape observers ever see
//!
//! ## Architecture
//!
//! ```text
//! Edge (HTTP / SSE)
//!     │
//!     ▼ invoke()
//! TransactionManager ── allocates id ──► Transaction
//!     │                                     │
//!     │ respond_to_io_request()             ▼ tokio::spawn
//!     │                              context::scope(handler)
//!     │                                     │
//!     │                                     ▼ io::input_text(..)
//!     │                              IoRendezvous (pending)
//!     │                                     │ publish {running, request}
//!     └──── validated body ────────────────►│
//!                                           ▼ publish {running, none}
//!                                    handler resumes ... finishes
//!                                           │
//!                                           ▼ publish {success | error}
//! ```
//!
//! ## Key Invariants
//!
//! 1. **Versions only go up** - every mutation bumps the version by exactly one
//! 2. **Single flight** - a transaction has at most one pending IO request
//! 3. **Exactly-once resolution** - a request resolves once, with a validated value
//! 4. **Terminal is final** - `running → success | error`, never back
//!
//! ## Example
//!
//! ```ignore
//! use interval_core::{io, Action, TransactionManager};
//!
//! let manager = TransactionManager::builder()
//!     .action("hello", Action::new(|| async {
//!         let name = io::input_text("What is your name?").await?;
//!         tracing::info!("Hello, {name}");
//!         Ok(())
//!     }))
//!     .build();
//!
//! let invocation = manager.invoke("hello")?;
//! manager.respond_to_io_request(invocation.transaction_id, &json!("Ada"))?;
//! ```

mod action;
pub mod context;
mod error;
pub mod io;
mod manager;
mod rendezvous;
mod state;
mod transaction;

pub use action::{Action, HandlerFuture};
pub use context::{IoContext, IoHandler};
pub use error::{ErrorCategory, IoError, TransactionError};
pub use io::{
    InputNumberProps, InputTextProps, IoMethod, IoValue, IssueCode, ValidationFailure,
    ValidationIssue,
};
pub use manager::{Invocation, TransactionManager, TransactionManagerBuilder, TransactionSummary};
pub use rendezvous::{IoRendezvous, ResponseWaiter, SubmitError};
pub use state::{Snapshot, SnapshotStream, StateContainer, Subscription};
pub use transaction::{Transaction, TransactionId, TransactionState, TransactionStatus};

// Re-export commonly used external types
pub use async_trait::async_trait;
