use std::net::SocketAddr;
use std::path::PathBuf;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bustrack_api::ErrorBody;
use bustrack_config::ConfigError;
use bustrack_core::{BusId, CoreError};
use thiserror::Error;
use tracing::error;

/// Failures opening or writing the document store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("unsupported store URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid store URL: {0}")]
    InvalidUrl(String),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid document {}: {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

/// Per-request registry failures. Each maps to one HTTP status.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Bus not found: {id}")]
    NotFound { id: BusId },

    #[error("{message}")]
    BadRequest { message: String },

    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl RegistryError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client. Store internals stay in the log.
    fn public_message(&self) -> String {
        match self {
            Self::Unavailable { .. } => "Bus store is unavailable".into(),
            Self::Storage(_) => "Bus store failed to save the record".into(),
            other => other.to_string(),
        }
    }
}

impl From<CoreError> for RegistryError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationFailed { message } => Self::BadRequest { message },
            other => Self::BadRequest {
                message: other.to_string(),
            },
        }
    }
}

impl From<JsonRejection> for RegistryError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest {
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Startup and serve-loop failures.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("bus store failed to open: {0}")]
    Store(#[from] StorageError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}
