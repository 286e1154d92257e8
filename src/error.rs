//! Error types for flood-warnings
//!
//! This module provides the error taxonomy for the retrieval pipeline:
//! - Top-level [`Error`] used across the crate
//! - [`TransportError`] for remote repository faults
//! - [`StagingError`] for local artifact read/delete faults
//! - [`ParseError`] for structured document decoding
//! - HTTP status code mapping and JSON error envelopes for the API layer

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for flood-warnings operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for flood-warnings
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    ///
    /// Raised before any network attempt and never retried.
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "host")
        key: Option<String>,
    },

    /// Connection to the remote repository could not be established
    /// after the retry budget was exhausted
    #[error("failed to connect to {host}: {source}")]
    Connection {
        /// Remote host that was being contacted
        host: String,
        /// The error from the last connection attempt
        #[source]
        source: TransportError,
    },

    /// Remote repository transport error
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Local staged artifact could not be read or removed
    #[error("staging error: {0}")]
    Staging(#[from] StagingError),

    /// Structured document could not be decoded
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Warning identifier does not match the accepted format
    #[error("invalid warning identifier: {0}")]
    InvalidIdentifier(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

/// Remote repository transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    /// The repository reported that the named file does not exist
    /// (FTP reply 550)
    #[error("remote file not found: {name}")]
    MissingFile {
        /// Remote name that was requested
        name: String,
    },

    /// Establishing the control connection or logging in failed
    #[error("connection failed: {0}")]
    Connect(String),

    /// The server answered with an unexpected reply
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Local or socket I/O failed while transferring
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which step of the staged-artifact read failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    /// Reading the staged file
    Read,
    /// Removing the staged file after a successful read
    Delete,
}

impl std::fmt::Display for FileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileOperation::Read => write!(f, "read"),
            FileOperation::Delete => write!(f, "delete"),
        }
    }
}

/// Local artifact errors
#[derive(Debug, Error)]
pub enum StagingError {
    /// The staged file does not exist
    #[error("file not found during {operation}: {path}")]
    NotFound {
        /// Path of the staged file
        path: PathBuf,
        /// The step that failed
        operation: FileOperation,
    },

    /// Access to the staged file was denied
    #[error("permission denied during {operation}: {path}")]
    PermissionDenied {
        /// Path of the staged file
        path: PathBuf,
        /// The step that failed
        operation: FileOperation,
    },

    /// Any other filesystem failure, with the original cause
    #[error("failed to {operation} {path}: {source}")]
    Io {
        /// Path of the staged file
        path: PathBuf,
        /// The step that failed
        operation: FileOperation,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl StagingError {
    /// The step that failed
    pub fn operation(&self) -> FileOperation {
        match self {
            StagingError::NotFound { operation, .. }
            | StagingError::PermissionDenied { operation, .. }
            | StagingError::Io { operation, .. } => *operation,
        }
    }
}

/// Structured document errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// An accessor was invoked on an empty document
    #[error("document is empty")]
    EmptyDocument,

    /// The document is not well-formed markup
    #[error("malformed document: {0}")]
    Malformed(String),
}

/// API error response format
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "not_found",
///     "message": "warning IDV60000 not found"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "not_found", "validation_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an API error with additional details
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    /// Create a "not found" error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new("not_found", format!("{} not found", resource.into()))
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::InvalidIdentifier(_) => 400,

            // 502 Bad Gateway - Upstream repository errors
            Error::Connection { .. } => 502,
            Error::Transport(_) => 502,

            // 500 Internal Server Error - Server-side issues
            Error::Config { .. } => 500,
            Error::Staging(_) => 500,
            Error::Parse(_) => 500,
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Connection { .. } => "connection_error",
            Error::Transport(TransportError::MissingFile { .. }) => "remote_file_missing",
            Error::Transport(_) => "transport_error",
            Error::Staging(e) => match e {
                StagingError::NotFound { .. } => "staged_file_not_found",
                StagingError::PermissionDenied { .. } => "permission_denied",
                StagingError::Io { .. } => "staging_io_error",
            },
            Error::Parse(_) => "parse_error",
            Error::InvalidIdentifier(_) => "validation_error",
            Error::Io(_) => "io_error",
            Error::ApiServerError(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();

        // Server-side faults never leak internals to API clients
        if error.status_code() >= 500 {
            return ApiError::new(code, "internal server error");
        }

        let message = error.to_string();
        let details = match &error {
            Error::InvalidIdentifier(id) => Some(serde_json::json!({
                "id": id,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
