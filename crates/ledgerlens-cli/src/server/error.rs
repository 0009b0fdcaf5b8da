//! API error types and handling.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ledgerlens::{FilterError, LedgerError};
use serde::Serialize;

/// API error type.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from client.
    BadRequest(String),
    /// A filter set could not be built.
    Filter(FilterError),
    /// Error from the ledgerlens library.
    Ledger(LedgerError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Filter(e) => (StatusCode::UNPROCESSABLE_ENTITY, "filter_error", e.to_string()),
            ApiError::Ledger(LedgerError::Filter(e)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "filter_error", e.to_string())
            }
            ApiError::Ledger(e @ LedgerError::Io { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "io_error", e.to_string())
            }
            ApiError::Ledger(e @ LedgerError::WorkbookExport(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "export_error", e.to_string())
            }
            ApiError::Ledger(e) => (StatusCode::BAD_REQUEST, "ledger_error", e.to_string()),
        };

        (
            status,
            Json(ErrorResponse {
                error: error.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::Ledger(err)
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        ApiError::Filter(err)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Filter(e) => write!(f, "Filter error: {}", e),
            ApiError::Ledger(e) => write!(f, "LedgerLens error: {}", e),
        }
    }
}

impl std::error::Error for ApiError {}
