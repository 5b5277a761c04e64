//! gRPC status conversion
//!
//! Handlers work with [`AppError`] (or anything convertible into it) and turn it into a
//! `tonic::Status` through [`GrpcAppError`], so every failure is logged at its own level
//! and rendered the same way. The status message is always the client-facing message;
//! structured details travel as response metadata.

use filestore_core::{AppError, ErrorMetadata, LogLevel, StatusKind};
use filestore_services::TransferError;
use filestore_storage::StorageError;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::{Code, Status};

pub const ERROR_CODE_KEY: &str = "x-error-code";
pub const RECOVERABLE_KEY: &str = "x-error-recoverable";
pub const ERROR_TYPE_KEY: &str = "x-error-type";
pub const ERROR_DETAILS_KEY: &str = "x-error-details";
pub const SUGGESTED_ACTION_KEY: &str = "x-suggested-action";

/// Wrapper type for AppError so it can be converted into `tonic::Status`
/// (orphan rule: both `AppError` and `Status` are foreign to this crate).
#[derive(Debug)]
pub struct GrpcAppError(pub AppError);

impl From<AppError> for GrpcAppError {
    fn from(err: AppError) -> Self {
        GrpcAppError(err)
    }
}

impl From<StorageError> for GrpcAppError {
    fn from(err: StorageError) -> Self {
        GrpcAppError(err.into())
    }
}

impl From<TransferError> for GrpcAppError {
    fn from(err: TransferError) -> Self {
        GrpcAppError(err.into())
    }
}

pub fn status_code(kind: StatusKind) -> Code {
    match kind {
        StatusKind::InvalidArgument => Code::InvalidArgument,
        StatusKind::NotFound => Code::NotFound,
        StatusKind::ResourceExhausted => Code::ResourceExhausted,
        StatusKind::Aborted => Code::Aborted,
        StatusKind::Internal => Code::Internal,
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

fn insert_ascii(status: &mut Status, key: &'static str, value: &str) {
    // Non-ASCII values (e.g. unicode filenames in details) are dropped from metadata.
    if let Ok(value) = value.parse::<MetadataValue<Ascii>>() {
        status.metadata_mut().insert(key, value);
    }
}

impl GrpcAppError {
    /// Log the error and render it as a status.
    ///
    /// With `hide_details` set (production), or for sensitive errors, only the client
    /// message, code and retry hints are exposed.
    pub fn into_status(self, hide_details: bool) -> Status {
        let app_error = &self.0;
        log_error(app_error);

        let mut status = Status::new(
            status_code(app_error.status_kind()),
            app_error.client_message(),
        );

        insert_ascii(&mut status, ERROR_CODE_KEY, app_error.error_code());
        insert_ascii(
            &mut status,
            RECOVERABLE_KEY,
            if app_error.is_recoverable() { "true" } else { "false" },
        );
        if let Some(action) = app_error.suggested_action() {
            insert_ascii(&mut status, SUGGESTED_ACTION_KEY, action);
        }

        if !(hide_details || app_error.is_sensitive()) {
            insert_ascii(&mut status, ERROR_TYPE_KEY, app_error.error_type());
            insert_ascii(&mut status, ERROR_DETAILS_KEY, &app_error.to_string());
        }

        status
    }
}

impl From<GrpcAppError> for Status {
    fn from(err: GrpcAppError) -> Self {
        err.into_status(is_production_env())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filestore_core::validation::FilenameError;
    use filestore_core::OperationKind;

    fn metadata(status: &Status, key: &str) -> Option<String> {
        status
            .metadata()
            .get(key)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    }

    #[test]
    fn test_resource_exhausted_status() {
        let err = GrpcAppError(AppError::ResourceExhausted {
            operation: OperationKind::Upload,
            capacity: 10,
        });
        let status = err.into_status(false);

        assert_eq!(status.code(), Code::ResourceExhausted);
        assert_eq!(status.message(), "upload limit exceeded");
        assert_eq!(
            metadata(&status, ERROR_CODE_KEY).as_deref(),
            Some("RESOURCE_EXHAUSTED")
        );
        assert_eq!(metadata(&status, RECOVERABLE_KEY).as_deref(), Some("true"));
    }

    #[test]
    fn test_from_storage_error_not_found() {
        let GrpcAppError(app_err) = StorageError::NotFound("missing.txt".to_string()).into();
        match app_err {
            AppError::NotFound(name) => assert_eq!(name, "missing.txt"),
            other => panic!("Expected NotFound variant, got {:?}", other),
        }
    }

    #[test]
    fn test_from_transfer_error_maps_categories() {
        let status = GrpcAppError::from(TransferError::EmptyPayload).into_status(false);
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), "empty file");

        let status = GrpcAppError::from(TransferError::InvalidFilename(
            FilenameError::ParentDirectory("../evil.txt".to_string()),
        ))
        .into_status(false);
        assert_eq!(status.code(), Code::InvalidArgument);

        let status = GrpcAppError::from(TransferError::Storage(StorageError::NotFound(
            "gone.txt".to_string(),
        )))
        .into_status(false);
        assert_eq!(status.code(), Code::NotFound);
        assert_eq!(status.message(), "file not found: gone.txt");
    }

    #[test]
    fn test_sensitive_errors_hide_details() {
        let err = GrpcAppError::from(StorageError::WriteFailed(
            "/var/data/secret/path: permission denied".to_string(),
        ));
        let status = err.into_status(false);

        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), "failed to access storage");
        assert!(metadata(&status, ERROR_DETAILS_KEY).is_none());
        assert!(!status.message().contains("secret"));
    }

    #[test]
    fn test_details_exposed_outside_production_only() {
        let err = || GrpcAppError(AppError::NotFound("a.txt".to_string()));

        let dev = err().into_status(false);
        assert_eq!(metadata(&dev, ERROR_TYPE_KEY).as_deref(), Some("NotFound"));
        assert!(metadata(&dev, ERROR_DETAILS_KEY).is_some());

        let prod = err().into_status(true);
        assert!(metadata(&prod, ERROR_TYPE_KEY).is_none());
        assert!(metadata(&prod, ERROR_DETAILS_KEY).is_none());
        assert_eq!(metadata(&prod, ERROR_CODE_KEY).as_deref(), Some("NOT_FOUND"));
    }
}
