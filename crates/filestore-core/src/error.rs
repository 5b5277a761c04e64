//! Error types module
//!
//! All failures that can reach the RPC boundary are unified under [`AppError`]. Each
//! variant self-describes how it should be presented to a client through
//! [`ErrorMetadata`]; the transport crate turns [`StatusKind`] into a wire status.

use crate::models::OperationKind;
use crate::validation::FilenameError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like resource limits
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Transport-independent status category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    InvalidArgument,
    NotFound,
    ResourceExhausted,
    Aborted,
    Internal,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// Status category to return
    fn status_kind(&self) -> StatusKind;

    /// Machine-readable error code (e.g., "RESOURCE_EXHAUSTED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Empty file")]
    EmptyPayload,

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("{operation} limit exceeded (capacity {capacity})")]
    ResourceExhausted {
        operation: OperationKind,
        capacity: usize,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<FilenameError> for AppError {
    fn from(err: FilenameError) -> Self {
        AppError::InvalidFilename(err.to_string())
    }
}

/// Static metadata for each variant: (status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    StatusKind,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::InvalidFilename(_) => (
            StatusKind::InvalidArgument,
            "INVALID_FILENAME",
            true,
            Some("Use a plain file name without '..', '/' or '\\'"),
            false,
            LogLevel::Debug,
        ),
        AppError::EmptyPayload => (
            StatusKind::InvalidArgument,
            "EMPTY_PAYLOAD",
            false,
            Some("Upload a file with at least one byte"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            StatusKind::NotFound,
            "NOT_FOUND",
            false,
            Some("Verify the file name with a list call"),
            false,
            LogLevel::Debug,
        ),
        AppError::ResourceExhausted { .. } => (
            StatusKind::ResourceExhausted,
            "RESOURCE_EXHAUSTED",
            true,
            Some("Back off and retry later"),
            false,
            LogLevel::Warn,
        ),
        AppError::Storage(_) => (
            StatusKind::Internal,
            "STORAGE_ERROR",
            false,
            Some("Contact the operator if this error persists"),
            true,
            LogLevel::Error,
        ),
        AppError::Stream(_) => (
            StatusKind::Aborted,
            "STREAM_ERROR",
            true,
            Some("Check the connection and retry the transfer"),
            false,
            LogLevel::Warn,
        ),
        AppError::Config(_) => (
            StatusKind::Internal,
            "CONFIG_ERROR",
            false,
            None,
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidFilename(_) => "InvalidFilename",
            AppError::EmptyPayload => "EmptyPayload",
            AppError::NotFound(_) => "NotFound",
            AppError::ResourceExhausted { .. } => "ResourceExhausted",
            AppError::Storage(_) => "Storage",
            AppError::Stream(_) => "Stream",
            AppError::Config(_) => "Config",
        }
    }
}

impl ErrorMetadata for AppError {
    fn status_kind(&self) -> StatusKind {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidFilename(ref name) => format!("invalid filename: {}", name),
            AppError::EmptyPayload => "empty file".to_string(),
            AppError::NotFound(ref name) => format!("file not found: {}", name),
            AppError::ResourceExhausted { operation, .. } => {
                format!("{} limit exceeded", operation)
            }
            AppError::Storage(_) => "failed to access storage".to_string(),
            AppError::Stream(ref msg) => format!("stream aborted: {}", msg),
            AppError::Config(_) => "server misconfigured".to_string(),
        }
    }
}
