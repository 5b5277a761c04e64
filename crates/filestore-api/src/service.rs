//! `filestore.v1.FileService` implementation.
//!
//! Every call takes its admission slot before doing any work; a full pool rejects the
//! call immediately with `RESOURCE_EXHAUSTED`.

use filestore_core::OperationKind;
use tonic::{Request, Response, Status, Streaming};

use crate::error::GrpcAppError;
use crate::handlers::{download, list, upload};
use crate::proto::file_service_server::FileService;
use crate::proto::{DownloadRequest, Empty, ListFilesResponse, UploadRequest, UploadResponse};
use crate::state::AppState;

#[derive(Clone)]
pub struct FileStoreService {
    state: AppState,
}

impl FileStoreService {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[tonic::async_trait]
impl FileService for FileStoreService {
    #[tracing::instrument(skip(self, request), fields(filename = tracing::field::Empty))]
    async fn upload(
        &self,
        request: Request<Streaming<UploadRequest>>,
    ) -> Result<Response<UploadResponse>, Status> {
        let permit = self
            .state
            .admission
            .try_acquire(OperationKind::Upload)
            .map_err(GrpcAppError::from)?;

        let response =
            upload::handle_upload(&self.state.transfer, permit, request.into_inner()).await?;
        Ok(Response::new(response))
    }

    type DownloadStream = download::DownloadStream;

    #[tracing::instrument(skip(self, request), fields(filename = %request.get_ref().filename))]
    async fn download(
        &self,
        request: Request<DownloadRequest>,
    ) -> Result<Response<Self::DownloadStream>, Status> {
        let permit = self
            .state
            .admission
            .try_acquire(OperationKind::Download)
            .map_err(GrpcAppError::from)?;

        let filename = request.into_inner().filename;
        let stream = download::open_download(&self.state.transfer, permit, filename).await?;
        tracing::debug!(chunks = stream.chunk_count(), "Streaming file");
        Ok(Response::new(stream))
    }

    #[tracing::instrument(skip(self, _request))]
    async fn list_files(
        &self,
        _request: Request<Empty>,
    ) -> Result<Response<ListFilesResponse>, Status> {
        let permit = self
            .state
            .admission
            .try_acquire(OperationKind::List)
            .map_err(GrpcAppError::from)?;

        Ok(Response::new(list::list_files(&self.state.transfer, permit)))
    }
}
