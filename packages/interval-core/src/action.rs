//! Action handlers.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

/// Future returned by an action handler.
pub type HandlerFuture = BoxFuture<'static, anyhow::Result<()>>;

/// A named, invocable long-running handler.
///
/// Each invocation calls the handler once and runs the returned future as a
/// new transaction. Handlers ask for input through [`io`](crate::io); an
/// `Err` (or a panic) ends the transaction with the `error` status.
///
/// # Example
///
/// ```ignore
/// let hello = Action::new(|| async {
///     let name = io::input_text("What is your name?").await?;
///     tracing::info!("Hello, {name}");
///     Ok(())
/// });
/// ```
#[derive(Clone)]
pub struct Action {
    handler: Arc<dyn Fn() -> HandlerFuture + Send + Sync>,
}

impl Action {
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            handler: Arc::new(move || handler().boxed()),
        }
    }

    /// Start one run of the handler.
    pub(crate) fn run(&self) -> HandlerFuture {
        (self.handler)()
    }
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action").finish_non_exhaustive()
    }
}
