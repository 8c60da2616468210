//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help
//! text. Registry failures show the operation's generic message; the
//! underlying cause goes to the help line.

use miette::Diagnostic;
use thiserror::Error;

use bustrack_config::ConfigError;
use bustrack_core::{CoreError, Operation};
use bustrack_server::ServerError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("{summary}")]
    #[diagnostic(
        code(bustrack::connection_failed),
        help(
            "Could not reach the server at {url}.\n\
             Start one with: bustrack serve\n\
             Or point --api-url at a running server."
        )
    )]
    ConnectionFailed { summary: String, url: String },

    #[error("{summary}")]
    #[diagnostic(
        code(bustrack::timeout),
        help("The server did not answer in time. Raise the limit with --timeout.")
    )]
    Timeout { summary: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Bus '{identifier}' not found")]
    #[diagnostic(
        code(bustrack::not_found),
        help("Run: bustrack buses list to see available buses")
    )]
    NotFound { identifier: String },

    // ── Request ──────────────────────────────────────────────────────
    #[error("{summary}")]
    #[diagnostic(code(bustrack::request_failed), help("{detail}"))]
    RequestFailed { summary: String, detail: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(bustrack::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(bustrack::config),
        help("Check the file shown by: bustrack config path")
    )]
    Config(#[from] ConfigError),

    // ── Server ───────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(bustrack::server))]
    Server(#[from] ServerError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Translate a core failure of `op` into a CLI error.
    pub fn from_core(err: CoreError, op: Operation) -> Self {
        let summary = err.user_message(op);
        match err {
            CoreError::ConnectionFailed { url, .. } => Self::ConnectionFailed { summary, url },
            CoreError::Timeout => Self::Timeout { summary },
            CoreError::BusNotFound { id } => Self::NotFound { identifier: id },
            CoreError::ValidationFailed { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },
            other => Self::RequestFailed {
                summary,
                detail: other.to_string(),
            },
        }
    }

    /// Shorthand for a core error raised before any request was sent.
    pub fn input(err: CoreError) -> Self {
        Self::from_core(err, Operation::Save)
    }
}
