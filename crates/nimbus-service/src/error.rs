//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::discord::DiscordError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or invalid session.
    #[error("unauthorized")]
    Unauthorized,

    /// Resource not found. Ownership mismatches report this too, so server
    /// ids are not probeable.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed input, with per-field messages.
    #[error("validation error")]
    Validation(Vec<FieldError>),

    /// Balance does not cover the requested operation.
    #[error("insufficient balance: required={required}, current={current}")]
    InsufficientBalance {
        /// Total price of the requested operation.
        required: i64,
        /// Current balance.
        current: i64,
    },

    /// The target exists but cannot be operated on (inactive tier).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The identity provider rejected the exchange or profile fetch.
    #[error("upstream auth error: {0}")]
    UpstreamAuth(String),

    /// Unexpected failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Shortcut for a single-field validation error.
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError {
            field,
            message: message.into(),
        }])
    }
}

/// A per-field validation message.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    /// The offending request field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

/// JSON error response body: `{"success": false, "error": ..., ...details}`.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    required: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    missing: Option<i64>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            fields: None,
            required: None,
            current: None,
            missing: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new("Unauthorized"),
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::new(msg)),
            Self::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    fields: Some(fields),
                    ..ErrorResponse::new("Validation error")
                },
            ),
            Self::InsufficientBalance { required, current } => (
                StatusCode::PAYMENT_REQUIRED,
                ErrorResponse {
                    required: Some(required),
                    current: Some(current),
                    missing: Some(required - current),
                    ..ErrorResponse::new("Insufficient balance")
                },
            ),
            Self::InvalidState(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::new(msg)),
            Self::UpstreamAuth(msg) => {
                tracing::warn!(error = %msg, "Identity provider error");
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorResponse::new("Identity provider error"),
                )
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("An internal error occurred"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<nimbus_store::StoreError> for ApiError {
    fn from(err: nimbus_store::StoreError) -> Self {
        match err {
            nimbus_store::StoreError::NotFound { entity, id } => {
                Self::NotFound(format!("{entity} not found: {id}"))
            }
            nimbus_store::StoreError::InsufficientBalance { current, required } => {
                Self::InsufficientBalance { required, current }
            }
            nimbus_store::StoreError::Database(msg)
            | nimbus_store::StoreError::Serialization(msg) => Self::Internal(msg),
        }
    }
}

impl From<DiscordError> for ApiError {
    fn from(err: DiscordError) -> Self {
        Self::UpstreamAuth(err.to_string())
    }
}
