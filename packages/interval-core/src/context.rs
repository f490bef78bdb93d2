//! Ambient IO context for code running inside an action handler.
//!
//! A transaction runs its handler under [`scope`], which binds an
//! [`IoContext`] to the handler's task. Anything the handler calls, however
//! deep, can then reach [`issue_io_request`] without a handle being passed
//! down through every signature.
//!
//! The binding is task-local, not global: two transactions never see each
//! other's context, and code outside any scope gets
//! [`IoError::NoActiveContext`].
//!
//! # Scope boundaries
//!
//! The binding follows the handler's future, not its task tree. Work moved
//! onto a separately spawned task runs outside the scope; capture
//! [`current`] first and call [`IoContext::issue`] on it there.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::IoError;
use crate::io::{IoMethod, IoValue};
use crate::transaction::TransactionId;

tokio::task_local! {
    static IO_CONTEXT: IoContext;
}

/// Something that can turn an IO request into a response.
///
/// Transactions implement this by parking the request as their pending
/// request and waiting for the remote caller.
#[async_trait]
pub trait IoHandler: Send + Sync + 'static {
    async fn issue(&self, method: IoMethod) -> Result<IoValue, IoError>;
}

/// The binding established for one handler run.
///
/// Immutable and cheap to clone.
#[derive(Clone)]
pub struct IoContext {
    transaction_id: TransactionId,
    handler: Arc<dyn IoHandler>,
}

impl IoContext {
    pub fn new(transaction_id: TransactionId, handler: Arc<dyn IoHandler>) -> Self {
        Self {
            transaction_id,
            handler,
        }
    }

    /// The transaction this context belongs to.
    pub fn transaction_id(&self) -> TransactionId {
        self.transaction_id
    }

    /// Issue a request through this context. Suspends until resolved.
    pub async fn issue(&self, method: IoMethod) -> Result<IoValue, IoError> {
        self.handler.issue(method).await
    }
}

impl std::fmt::Debug for IoContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IoContext")
            .field("transaction_id", &self.transaction_id)
            .finish()
    }
}

/// Run `future` with `context` bound as the ambient IO context.
pub async fn scope<F: Future>(context: IoContext, future: F) -> F::Output {
    IO_CONTEXT.scope(context, future).await
}

/// The ambient context, if any.
pub fn current() -> Result<IoContext, IoError> {
    IO_CONTEXT
        .try_with(IoContext::clone)
        .map_err(|_| IoError::NoActiveContext)
}

/// Issue an IO request through the ambient context.
pub async fn issue_io_request(method: IoMethod) -> Result<IoValue, IoError> {
    let context = current()?;
    context.issue(method).await
}
