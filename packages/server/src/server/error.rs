//! HTTP error responses.
//!
//! Every failure leaves the server as
//! `{"error": {"code": "...", "message": "...", "details": ...}}`.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use interval_core::{ErrorCategory, TransactionError};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("Invalid path: {0}")]
    InvalidPath(#[from] PathRejection),
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Transaction(e) => match e.category() {
                ErrorCategory::NotFound => StatusCode::NOT_FOUND,
                ErrorCategory::Conflict => StatusCode::CONFLICT,
                ErrorCategory::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            },
            ApiError::InvalidBody(rejection) => rejection.status(),
            ApiError::InvalidPath(rejection) => rejection.status(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Transaction(e) => e.code(),
            ApiError::InvalidBody(_) | ApiError::InvalidPath(_) => "invalid_request",
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            ApiError::Transaction(e) => e
                .validation()
                .and_then(|failure| serde_json::to_value(failure).ok()),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_client_error() {
            tracing::debug!(code = self.code(), error = %self, "Request rejected");
        }

        let envelope = ErrorEnvelope {
            error: ErrorBody {
                code: self.code(),
                message: self.to_string(),
                details: self.details(),
            },
        };

        (status, Json(envelope)).into_response()
    }
}
