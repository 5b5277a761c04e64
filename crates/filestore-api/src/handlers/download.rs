//! Server-streaming download.
//!
//! The response stream owns both the file content and the admission permit. When the
//! transport finishes sending, or drops the stream because the client went away, the
//! permit goes with it.

use std::pin::Pin;
use std::task::{Context, Poll};

use filestore_core::constants::CHUNK_SIZE;
use filestore_core::ChunkCursor;
use filestore_infra::AdmissionPermit;
use filestore_services::TransferService;
use futures::Stream;
use tonic::Status;

use crate::error::GrpcAppError;
use crate::proto::DownloadResponse;

pub struct DownloadStream {
    filename: String,
    cursor: ChunkCursor,
    sent: usize,
    _permit: AdmissionPermit,
}

impl DownloadStream {
    pub fn new(filename: String, content: Vec<u8>, permit: AdmissionPermit) -> Self {
        Self {
            filename,
            cursor: ChunkCursor::new(content, CHUNK_SIZE),
            sent: 0,
            _permit: permit,
        }
    }

    pub fn chunk_count(&self) -> usize {
        self.cursor.chunk_count()
    }
}

impl Stream for DownloadStream {
    type Item = Result<DownloadResponse, Status>;

    fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.cursor.next() {
            Some(chunk) => {
                self.sent += 1;
                Poll::Ready(Some(Ok(DownloadResponse { chunk })))
            }
            None => Poll::Ready(None),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.cursor.size_hint()
    }
}

impl Drop for DownloadStream {
    fn drop(&mut self) {
        if self.cursor.remaining() == 0 {
            tracing::info!(
                filename = %self.filename,
                size_bytes = self.cursor.total_len(),
                chunks = self.sent,
                "Download completed"
            );
        } else {
            tracing::warn!(
                filename = %self.filename,
                chunks_sent = self.sent,
                bytes_remaining = self.cursor.remaining(),
                "Download aborted before completion"
            );
        }
    }
}

/// Resolve `filename` and build its response stream.
///
/// A missing file fails before any chunk is produced. The access-touch is best-effort.
pub async fn open_download(
    transfer: &TransferService,
    permit: AdmissionPermit,
    filename: String,
) -> Result<DownloadStream, Status> {
    let content = transfer
        .get_file(&filename)
        .await
        .map_err(GrpcAppError::from)?;

    transfer.touch_access(&filename);
    tracing::debug!(filename = %filename, "Touched access time");

    Ok(DownloadStream::new(filename, content, permit))
}
