//! Error taxonomy for transactions and IO calls.
//!
//! Two audiences, two enums:
//!
//! - [`TransactionError`] is what callers of the manager see (the RPC edge).
//!   Every variant is safe to show to the remote caller and carries a stable
//!   [`code`](TransactionError::code) plus an [`ErrorCategory`] the edge maps
//!   to a status.
//! - [`IoError`] is what action handlers see when they ask for input.
//!
//! Handler failures are neither: they are caught at the transaction boundary
//! and only show up as the `error` status.

use std::fmt;

use thiserror::Error;

use crate::io::ValidationFailure;
use crate::transaction::TransactionId;

// =============================================================================
// Error Category
// =============================================================================

/// Coarse classification of a [`TransactionError`] for the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The referenced action or transaction does not exist.
    NotFound,
    /// The transaction is not in a state that accepts the call.
    Conflict,
    /// The submitted body does not match the pending request.
    Validation,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::NotFound => write!(f, "not_found"),
            ErrorCategory::Conflict => write!(f, "conflict"),
            ErrorCategory::Validation => write!(f, "validation_error"),
        }
    }
}

// =============================================================================
// Transaction Error
// =============================================================================

/// Failures returned by [`TransactionManager`](crate::TransactionManager) and
/// [`Transaction`](crate::Transaction) operations.
///
/// None of these are fatal: each one affects only the call that produced it.
#[derive(Debug, Clone, Error)]
pub enum TransactionError {
    /// `invoke` named an action that was never registered.
    #[error("action {0} not found")]
    ActionNotFound(String),

    /// The id does not belong to any transaction of this manager.
    #[error("transaction {0} not found")]
    TransactionNotFound(TransactionId),

    /// A response arrived while nothing was waiting for one.
    #[error("transaction {0} has no pending IO request")]
    NoPendingRequest(TransactionId),

    /// The body does not match the pending request. The request stays
    /// pending so the caller can resubmit.
    #[error("{0}")]
    Validation(ValidationFailure),
}

impl TransactionError {
    /// Stable, machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            TransactionError::ActionNotFound(_) => "action_not_found",
            TransactionError::TransactionNotFound(_) => "transaction_not_found",
            TransactionError::NoPendingRequest(_) => "no_pending_request",
            TransactionError::Validation(_) => "validation_failure",
        }
    }

    /// Category used by the edge to pick a status.
    pub fn category(&self) -> ErrorCategory {
        match self {
            TransactionError::ActionNotFound(_) | TransactionError::TransactionNotFound(_) => {
                ErrorCategory::NotFound
            }
            TransactionError::NoPendingRequest(_) => ErrorCategory::Conflict,
            TransactionError::Validation(_) => ErrorCategory::Validation,
        }
    }

    /// Structured validation detail, if this is a validation failure.
    pub fn validation(&self) -> Option<&ValidationFailure> {
        match self {
            TransactionError::Validation(failure) => Some(failure),
            _ => None,
        }
    }
}

// =============================================================================
// IO Error
// =============================================================================

/// Failures seen by handler code calling into [`io`](crate::io).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IoError {
    /// The call was made outside of a running transaction.
    #[error("no active IO context: IO requests can only be made from inside an action handler")]
    NoActiveContext,

    /// The request was dropped before any response was accepted.
    #[error("IO request {method_name} was abandoned before a response arrived")]
    Abandoned {
        /// Method of the abandoned request.
        method_name: &'static str,
    },

    /// The resolved value does not have the shape the typed helper expects.
    #[error("IO request {method_name} resolved with an unexpected value")]
    UnexpectedValue {
        /// Method of the request.
        method_name: &'static str,
    },
}
