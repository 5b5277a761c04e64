//! Transfer service: the validation gate in front of the content repository.
//!
//! Filenames become paths under the storage root, so an upload's name is checked
//! before anything is written. Downloads are passed straight through: a name that
//! could never have been saved simply does not resolve.

use crate::error::TransferError;
use crate::repository::ContentRepository;
use bytes::Bytes;
use filestore_core::validation::validate_filename;
use filestore_core::FileMetadata;

#[derive(Clone)]
pub struct TransferService {
    repository: ContentRepository,
}

impl TransferService {
    pub fn new(repository: ContentRepository) -> Self {
        Self { repository }
    }

    /// Validate and persist an upload.
    ///
    /// The filename is checked first, then the payload length; both checks run before
    /// any storage I/O.
    pub async fn save_file(&self, filename: &str, data: Bytes) -> Result<(), TransferError> {
        validate_filename(filename)?;
        if data.is_empty() {
            return Err(TransferError::EmptyPayload);
        }
        self.repository.save(filename, data).await?;
        Ok(())
    }

    pub async fn get_file(&self, filename: &str) -> Result<Vec<u8>, TransferError> {
        Ok(self.repository.get(filename).await?)
    }

    pub fn list_files(&self) -> Vec<FileMetadata> {
        self.repository.list()
    }

    pub fn touch_access(&self, filename: &str) {
        self.repository.touch_access(filename);
    }
}
