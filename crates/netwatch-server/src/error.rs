//! Error types for the netwatch API server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use netwatch_core::IntelError;
use serde::Serialize;
use thiserror::Error;

/// Result type alias for server startup
pub type Result<T> = std::result::Result<T, ServerError>;

/// Errors that stop the server from starting or running
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// Listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    /// Lookup services could not be built.
    #[error(transparent)]
    Intel(#[from] IntelError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// JSON error response: `{"error": ..., "details": ...}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    details: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

impl ApiError {
    /// 400 with `message`
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: message.into(),
            details: None,
        }
    }

    /// 404 with `message`
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: message.into(),
            details: None,
        }
    }

    /// Map a failed call to a caller-chosen upstream as 502; `details` holds
    /// the bare cause
    pub fn upstream(context: &str, err: IntelError) -> Self {
        if let IntelError::InvalidInput(message) = err {
            return Self::bad_request(message);
        }
        let details = match &err {
            IntelError::Source(source) => source
                .reason()
                .map_or_else(|| source.to_string(), str::to_string),
            other => other.to_string(),
        };
        tracing::warn!(error = %err, "{context}");
        Self {
            status: StatusCode::BAD_GATEWAY,
            error: context.to_string(),
            details: Some(details),
        }
    }

    /// Map a lookup failure; `context` names what failed for the caller
    pub fn lookup(context: &str, err: IntelError) -> Self {
        let status = match &err {
            IntelError::InvalidInput(message) => return Self::bad_request(message.clone()),
            IntelError::AllSourcesFailed { .. } => StatusCode::SERVICE_UNAVAILABLE,
            IntelError::Source(_) | IntelError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!(error = %err, "{context}");
        Self {
            status,
            error: context.to_string(),
            details: Some(err.to_string()),
        }
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: &self.error,
            details: self.details.as_deref(),
        });
        (self.status, body).into_response()
    }
}
