use filestore_core::validation::FilenameError;
use filestore_core::AppError;
use filestore_storage::StorageError;
use thiserror::Error;

/// Errors returned by [`TransferService`](crate::TransferService).
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("invalid filename: {0}")]
    InvalidFilename(#[from] FilenameError),

    #[error("empty file")]
    EmptyPayload,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<TransferError> for AppError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::InvalidFilename(e) => e.into(),
            TransferError::EmptyPayload => AppError::EmptyPayload,
            TransferError::Storage(e) => e.into(),
        }
    }
}
