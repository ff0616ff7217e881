//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use pointbank_core::LedgerError;
use pointbank_store::StoreError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden - valid credentials but insufficient permissions.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Conflict - resource already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A ledger operation was rejected or rolled back.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

type Parts = (StatusCode, &'static str, String, Option<serde_json::Value>);

fn internal(msg: &str) -> Parts {
    tracing::error!(error = %msg, "Internal server error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "An internal error occurred".to_string(),
        None,
    )
}

fn ledger_parts(err: &LedgerError) -> Parts {
    let message = err.to_string();
    match err {
        LedgerError::InvalidAmount(_) => (StatusCode::BAD_REQUEST, "invalid_amount", message, None),
        LedgerError::InvalidInput(_) | LedgerError::InvalidId(_) => {
            (StatusCode::BAD_REQUEST, "bad_request", message, None)
        }
        LedgerError::InsufficientPool {
            available,
            requested,
        } => (
            StatusCode::CONFLICT,
            "insufficient_pool",
            message,
            Some(serde_json::json!({
                "available": available,
                "requested": requested
            })),
        ),
        LedgerError::InsufficientBalance { balance, required } => (
            StatusCode::CONFLICT,
            "insufficient_balance",
            message,
            Some(serde_json::json!({
                "balance": balance,
                "required": required
            })),
        ),
        LedgerError::AccountNotFound { .. } => {
            (StatusCode::NOT_FOUND, "account_not_found", message, None)
        }
        LedgerError::UserNotFound { .. } => (StatusCode::NOT_FOUND, "user_not_found", message, None),
        LedgerError::EventNotFound { .. } => {
            (StatusCode::NOT_FOUND, "event_not_found", message, None)
        }
        LedgerError::AlreadyAttended { user_id, event_id } => (
            StatusCode::CONFLICT,
            "already_attended",
            message,
            Some(serde_json::json!({
                "user_id": user_id,
                "event_id": event_id
            })),
        ),
        LedgerError::NotPermitted(_) => (StatusCode::FORBIDDEN, "not_permitted", message, None),
        LedgerError::Storage(msg) => internal(msg),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
                None,
            ),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone(), None),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone(), None),
            Self::Ledger(err) => ledger_parts(err),
            Self::Internal(msg) => internal(msg),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => Self::NotFound(format!("{entity} not found: {id}")),
            StoreError::Conflict { entity, id } => {
                Self::Conflict(format!("{entity} already exists: {id}"))
            }
            StoreError::Database(msg)
            | StoreError::Contention(msg)
            | StoreError::Serialization(msg) => Self::Internal(msg),
        }
    }
}
