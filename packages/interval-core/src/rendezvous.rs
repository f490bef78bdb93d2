//! One-shot exchange between a suspended handler and a remote responder.
//!
//! The handler side holds a [`ResponseWaiter`] and awaits it. The responder
//! side calls [`IoRendezvous::submit_response`] with a raw body, possibly
//! several times:
//!
//! - An invalid body is rejected with a [`ValidationFailure`] and the waiter
//!   keeps waiting.
//! - The first valid body resolves the waiter. Nothing resolves it again.
//!
//! The waiter only ever sees values that passed [`IoMethod::parse_response`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::task::{Context, Poll};

use serde_json::Value;
use thiserror::Error;
use tokio::sync::oneshot;

use crate::error::IoError;
use crate::io::{IoMethod, IoValue, ValidationFailure};
use crate::state::lock;

/// Why a response was not accepted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    /// The body does not match the method's return shape.
    #[error("{0}")]
    Invalid(ValidationFailure),

    /// A valid response was already accepted.
    #[error("IO request already resolved")]
    AlreadyResolved,

    /// The waiting side is gone.
    #[error("IO request is no longer awaited")]
    Closed,
}

/// The responder half: the request descriptor plus the means to resolve it.
pub struct IoRendezvous {
    method: IoMethod,
    sender: Mutex<Option<oneshot::Sender<IoValue>>>,
}

impl IoRendezvous {
    /// Create a rendezvous and the waiter that resolves with its response.
    pub fn new(method: IoMethod) -> (Self, ResponseWaiter) {
        let (sender, receiver) = oneshot::channel();
        let method_name = method.method_name();
        (
            Self {
                method,
                sender: Mutex::new(Some(sender)),
            },
            ResponseWaiter {
                method_name,
                receiver,
            },
        )
    }

    /// The request descriptor.
    pub fn method(&self) -> &IoMethod {
        &self.method
    }

    /// Validate `body` and, if valid, resolve the waiter.
    pub fn submit_response(&self, body: &Value) -> Result<(), SubmitError> {
        let value = self
            .method
            .parse_response(body)
            .map_err(SubmitError::Invalid)?;

        self.resolve(value)
    }

    /// Resolve the waiter with an already validated value.
    pub(crate) fn resolve(&self, value: IoValue) -> Result<(), SubmitError> {
        let sender = lock(&self.sender)
            .take()
            .ok_or(SubmitError::AlreadyResolved)?;

        sender.send(value).map_err(|_| SubmitError::Closed)
    }

    /// Give up on the request. The waiter resolves with
    /// [`IoError::Abandoned`] and later submissions get `AlreadyResolved`.
    ///
    /// Returns `false` if the rendezvous was already resolved or closed.
    pub fn close(&self) -> bool {
        lock(&self.sender).take().is_some()
    }

    /// Check if a valid response was already accepted.
    pub fn is_resolved(&self) -> bool {
        lock(&self.sender).is_none()
    }
}

impl std::fmt::Debug for IoRendezvous {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IoRendezvous")
            .field("method", &self.method)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// The handler half. Resolves once with the validated response, or with
/// [`IoError::Abandoned`] if the rendezvous is dropped unresolved.
pub struct ResponseWaiter {
    method_name: &'static str,
    receiver: oneshot::Receiver<IoValue>,
}

impl Future for ResponseWaiter {
    type Output = Result<IoValue, IoError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let method_name = this.method_name;
        Pin::new(&mut this.receiver)
            .poll(cx)
            .map(|result| result.map_err(|_| IoError::Abandoned { method_name }))
    }
}
