//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service, and the mapping
//! from core errors to HTTP responses.

use crate::config::ConfigError;
use axum::http::StatusCode;
use resource_list_core::{EngineError, PortError};
use tracing::error;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// Converts a core error into the `(StatusCode, String)` pair handlers return.
/// Server-side failures are logged and reported without internal detail.
pub fn engine_error_response(context: &str, e: EngineError) -> (StatusCode, String) {
    match e {
        EngineError::NotFound(what) | EngineError::Port(PortError::NotFound(what)) => {
            (StatusCode::NOT_FOUND, what)
        }
        EngineError::InvalidInput(reason) => (StatusCode::BAD_REQUEST, reason),
        EngineError::Port(PortError::Conflict(detail)) => (StatusCode::CONFLICT, detail),
        other => {
            error!("{}: {:?}", context, other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{} failed", context),
            )
        }
    }
}
