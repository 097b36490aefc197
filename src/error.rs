//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::engine::LedgerError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // Ledger outcomes - mapped to HTTP status per variant
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }

            AppError::Ledger(ref ledger_err) => match ledger_err {
                LedgerError::InvalidAmount(msg) => {
                    (StatusCode::BAD_REQUEST, "invalid_amount", Some(msg.clone()))
                }
                LedgerError::InvalidKind(kind) => {
                    (StatusCode::BAD_REQUEST, "invalid_kind", Some(kind.clone()))
                }
                LedgerError::NotFound(id) => {
                    (StatusCode::NOT_FOUND, "account_not_found", Some(id.to_string()))
                }
                LedgerError::AccountInactive => {
                    (StatusCode::BAD_REQUEST, "account_inactive", None)
                }
                LedgerError::InsufficientFunds {
                    required,
                    available,
                } => (
                    StatusCode::BAD_REQUEST,
                    "insufficient_funds",
                    Some(format!(
                        "required {required} minor units, available {available}"
                    )),
                ),
                // Retries exhausted; the request itself was fine
                LedgerError::Busy => (StatusCode::CONFLICT, "busy", None),
                LedgerError::StoreUnavailable(e) => {
                    tracing::error!("Ledger store unavailable: {:?}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "store_unavailable", None)
                }
            },

            // 500 Internal Server Error
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
