//! Failure taxonomy for the credit service
//!
//! Every business-rule violation is recovered at the service boundary and
//! returned as one of these typed variants; storage failures surface as
//! `Internal` with the detail logged rather than leaked.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Typed failures returned by the enrollment and review services
#[derive(Error, Debug)]
pub enum CoreError {
    /// Referenced entity does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Operation is illegal for the entity's current lifecycle state
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Activity has no free slots left
    #[error("activity capacity exceeded")]
    CapacityExceeded,

    /// An active registration already exists for this user and activity
    #[error("already registered for this activity")]
    AlreadyRegistered,

    /// Role or ownership check failed
    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    /// Request payload violates a value constraint
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Lost a concurrency race; safe for the caller to retry
    #[error("conflicting concurrent update, retry the request")]
    ConflictRetry,

    /// Unexpected storage failure; possibly not applied
    #[error("internal error")]
    Internal(String),
}

impl CoreError {
    /// Classify a write error: constraint violations on insert mean we lost
    /// a race against a concurrent writer, everything else is internal.
    pub fn from_write(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => CoreError::ConflictRetry,
            _ => CoreError::Internal(err.to_string()),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::InvalidState(_)
            | CoreError::CapacityExceeded
            | CoreError::AlreadyRegistered
            | CoreError::ConflictRetry => StatusCode::CONFLICT,
            CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
            CoreError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            CoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        CoreError::Internal(err.to_string())
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            // Storage details stay in the log, not the response body.
            CoreError::Internal(detail) => {
                error!("internal error: {}", detail);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": message,
            "retryable": matches!(self, CoreError::ConflictRetry),
        }));

        (status, body).into_response()
    }
}

/// Type alias for service results
pub type CoreResult<T> = Result<T, CoreError>;
