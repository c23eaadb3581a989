//! Error types and exit codes for tootmirror
//!
//! Exit codes:
//! - 0: Success
//! - 1: Generic failure (transport, lost stream connection, IO)
//! - 2: Usage or configuration error (bad flags, env values, credentials)

mod macros;

use thiserror::Error;

/// Process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage or configuration error (2)
    Usage = 2,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

/// Errors that can occur while configuring or running the mirror
#[derive(Error, Debug)]
pub enum MirrorError {
    // Configuration errors (exit code 2)
    #[error("{0}")]
    Usage(String),

    #[error("invalid {context}: {value}")]
    InvalidValue { context: String, value: String },

    #[error("missing {0}")]
    MissingValue(String),

    #[error("unsupported {context}: {value} (supported: {supported})")]
    Unsupported {
        context: String,
        value: String,
        supported: String,
    },

    // Transport errors (exit code 1, recovered per event by the orchestrator)
    #[error("{service} returned HTTP {status}")]
    Http { service: String, status: u16 },

    #[error("{service} request failed: {reason}")]
    Transport { service: String, reason: String },

    #[error("{service} API error: {reason}")]
    Api { service: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Fatal for a streaming run
    #[error("stream connection lost: {0}")]
    ConnectionLost(String),
}

impl MirrorError {
    /// Create an error for an invalid configuration value
    pub fn invalid_value(context: &str, value: impl std::fmt::Display) -> Self {
        MirrorError::InvalidValue {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for a required value that was not provided
    pub fn missing(context: &str) -> Self {
        MirrorError::MissingValue(context.to_string())
    }

    /// Create an error for an unsupported value
    pub fn unsupported(
        context: &str,
        value: impl std::fmt::Display,
        supported: impl std::fmt::Display,
    ) -> Self {
        MirrorError::Unsupported {
            context: context.to_string(),
            value: value.to_string(),
            supported: supported.to_string(),
        }
    }

    /// Create an error from a failed HTTP call against `service`
    pub fn from_http(service: &str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(status) => MirrorError::Http {
                service: service.to_string(),
                status,
            },
            other => MirrorError::Transport {
                service: service.to_string(),
                reason: other.to_string(),
            },
        }
    }

    /// Create an error for an unexpected API response body
    pub fn api(service: &str, reason: impl std::fmt::Display) -> Self {
        MirrorError::Api {
            service: service.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True for errors that must stop the process before mirroring starts
    pub fn is_config_error(&self) -> bool {
        self.exit_code() == ExitCode::Usage
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            MirrorError::Usage(_)
            | MirrorError::InvalidValue { .. }
            | MirrorError::MissingValue(_)
            | MirrorError::Unsupported { .. } => ExitCode::Usage,

            MirrorError::Http { .. }
            | MirrorError::Transport { .. }
            | MirrorError::Api { .. }
            | MirrorError::Json(_)
            | MirrorError::Io(_)
            | MirrorError::ConnectionLost(_) => ExitCode::Failure,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            MirrorError::Usage(_) => "usage_error",
            MirrorError::InvalidValue { .. } => "invalid_value",
            MirrorError::MissingValue(_) => "missing_value",
            MirrorError::Unsupported { .. } => "unsupported",
            MirrorError::Http { .. } => "http_error",
            MirrorError::Transport { .. } => "transport_error",
            MirrorError::Api { .. } => "api_error",
            MirrorError::Json(_) => "json_error",
            MirrorError::Io(_) => "io_error",
            MirrorError::ConnectionLost(_) => "connection_lost",
        }
    }

    /// Convert error to JSON representation for structured error output.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.exit_code() as i32,
                "type": self.error_type(),
                "message": self.to_string(),
            }
        })
    }
}

/// Result type alias for tootmirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;
