use filestore_core::FileMetadata;
use filestore_infra::AdmissionPermit;
use filestore_services::TransferService;

use crate::proto::{FileInfo, ListFilesResponse};

impl From<FileMetadata> for FileInfo {
    fn from(meta: FileMetadata) -> Self {
        FileInfo {
            created_at: meta.created_at_rfc3339(),
            updated_at: meta.updated_at_rfc3339(),
            size: i64::try_from(meta.size).unwrap_or(i64::MAX),
            filename: meta.filename,
        }
    }
}

/// Snapshot every metadata record. The permit is released once the response is built.
pub fn list_files(transfer: &TransferService, permit: AdmissionPermit) -> ListFilesResponse {
    let files: Vec<FileInfo> = transfer.list_files().into_iter().map(FileInfo::from).collect();
    drop(permit);

    tracing::debug!(count = files.len(), "Listed files");
    ListFilesResponse { files }
}
