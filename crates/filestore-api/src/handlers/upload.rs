//! Client-streaming upload.
//!
//! An upload is driven through an explicit state machine:
//!
//! ```text
//! AwaitingFirstChunk -> ReceivingChunks -> Finalizing -> Completed
//!          \                  \                 \
//!           +------------------+-----------------+-> Failed
//! ```
//!
//! Nothing is written until the client closes its side of the stream cleanly, so a
//! disconnect, deadline or transport error can never commit a partial file. The
//! admission permit lives for the whole run and is released once a terminal state is
//! reached.

use bytes::{Bytes, BytesMut};
use filestore_core::constants::UPLOAD_SUCCESS_MESSAGE;
use filestore_core::validation::validate_filename;
use filestore_core::AppError;
use filestore_infra::AdmissionPermit;
use filestore_services::TransferService;
use futures::{Stream, StreamExt};
use tonic::{Code, Status};

use crate::error::GrpcAppError;
use crate::proto::{UploadRequest, UploadResponse};

/// Bytes received so far for one upload.
#[derive(Debug)]
pub struct PartialUpload {
    filename: String,
    buffer: BytesMut,
    chunks: usize,
}

impl PartialUpload {
    fn start(first: UploadRequest) -> Self {
        let mut upload = Self {
            filename: first.filename,
            buffer: BytesMut::new(),
            chunks: 0,
        };
        upload.append(first.chunk);
        upload
    }

    // Filenames on later messages are ignored; only the payload counts.
    fn append(&mut self, chunk: Bytes) {
        self.buffer.extend_from_slice(&chunk);
        self.chunks += 1;
    }
}

#[derive(Debug)]
pub enum UploadState {
    AwaitingFirstChunk,
    ReceivingChunks(PartialUpload),
    Finalizing(PartialUpload),
    Completed(UploadResponse),
    Failed(Status),
}

impl UploadState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadState::Completed(_) | UploadState::Failed(_))
    }

    /// Advance by one step. Terminal states are returned unchanged.
    pub async fn advance<S>(self, stream: &mut S, transfer: &TransferService) -> UploadState
    where
        S: Stream<Item = Result<UploadRequest, Status>> + Unpin + Send,
    {
        match self {
            UploadState::AwaitingFirstChunk => match stream.next().await {
                None => fail(AppError::EmptyPayload),
                Some(Err(status)) => stream_failed(status, 0),
                Some(Ok(first)) => match validate_filename(&first.filename) {
                    Ok(()) => {
                        tracing::Span::current().record("filename", first.filename.as_str());
                        UploadState::ReceivingChunks(PartialUpload::start(first))
                    }
                    Err(e) => fail(e.into()),
                },
            },
            UploadState::ReceivingChunks(mut upload) => match stream.next().await {
                None => UploadState::Finalizing(upload),
                Some(Ok(request)) => {
                    upload.append(request.chunk);
                    UploadState::ReceivingChunks(upload)
                }
                Some(Err(status)) => stream_failed(status, upload.chunks),
            },
            UploadState::Finalizing(upload) => {
                let size = upload.buffer.len();
                let data = upload.buffer.freeze();
                match transfer.save_file(&upload.filename, data).await {
                    Ok(()) => {
                        tracing::info!(
                            filename = %upload.filename,
                            chunks = upload.chunks,
                            size_bytes = size,
                            "Upload completed"
                        );
                        UploadState::Completed(UploadResponse {
                            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
                            size: size as i64,
                        })
                    }
                    Err(e) => UploadState::Failed(GrpcAppError::from(e).into()),
                }
            }
            terminal => terminal,
        }
    }
}

fn fail(err: AppError) -> UploadState {
    UploadState::Failed(GrpcAppError(err).into())
}

// Cancellation and deadline statuses keep their code; any other transport error aborts.
fn stream_failed(status: Status, chunks_received: usize) -> UploadState {
    tracing::warn!(
        code = ?status.code(),
        message = %status.message(),
        chunks_received,
        "Upload stream failed, discarding received data"
    );
    match status.code() {
        Code::Cancelled | Code::DeadlineExceeded => UploadState::Failed(status),
        _ => fail(AppError::Stream(status.message().to_string())),
    }
}

/// Run an upload to completion while holding `permit`.
pub async fn handle_upload<S>(
    transfer: &TransferService,
    permit: AdmissionPermit,
    mut stream: S,
) -> Result<UploadResponse, Status>
where
    S: Stream<Item = Result<UploadRequest, Status>> + Unpin + Send,
{
    let _permit = permit;
    let mut state = UploadState::AwaitingFirstChunk;
    loop {
        state = match state {
            UploadState::Completed(response) => return Ok(response),
            UploadState::Failed(status) => return Err(status),
            pending => pending.advance(&mut stream, transfer).await,
        };
    }
}
