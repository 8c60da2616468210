// ── Core error types ──
//
// Domain errors for consumers of bustrack-core. The `From<bustrack_api::Error>`
// impl folds transport, status and body failures into domain variants so
// logs stay precise, while `user_message` collapses them into the one
// sentence a front end shows for each operation.

use strum::Display;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach bustrack server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to bustrack server timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Bus not found: {id}")]
    BusNotFound { id: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    /// A record from the server that does not convert to a [`Bus`](crate::Bus).
    #[error("Malformed bus record: {message}")]
    MalformedRecord { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if the server answered).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

/// The user-level operation an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Load,
    Save,
    Track,
}

impl Operation {
    /// The generic message shown for any failure of this operation.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::Load => "Could not load buses. Please try again later.",
            Self::Save => "Could not save changes.",
            Self::Track => "Error tracking the bus.",
        }
    }
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    /// HTTP status behind this error, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => *status,
            Self::BusNotFound { .. } => Some(404),
            _ => None,
        }
    }

    /// Name the bus in a 404 coming back from a per-bus endpoint.
    pub(crate) fn for_bus(self, id: &crate::model::BusId) -> Self {
        match self {
            Self::Api {
                status: Some(404), ..
            } => Self::BusNotFound { id: id.to_string() },
            other => other,
        }
    }

    /// Text to show the user when `op` failed with this error.
    ///
    /// Form validation happens before any request and keeps its own
    /// message. Everything that went over the wire collapses into the
    /// operation's generic message.
    pub fn user_message(&self, op: Operation) -> String {
        match self {
            Self::ValidationFailed { message } => message.clone(),
            _ => op.failure_message().to_owned(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<bustrack_api::Error> for CoreError {
    fn from(err: bustrack_api::Error) -> Self {
        match err {
            bustrack_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            bustrack_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            bustrack_api::Error::InvalidBaseUrl(url) => CoreError::Config {
                message: format!("API URL cannot carry paths: {url}"),
            },
            bustrack_api::Error::ClientBuild(reason) => CoreError::Config {
                message: format!("HTTP client setup failed: {reason}"),
            },
            bustrack_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            bustrack_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
