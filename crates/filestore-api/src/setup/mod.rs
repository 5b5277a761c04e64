//! Application setup and initialization

pub mod server;
pub mod validation;

use anyhow::{Context, Result};
use filestore_core::constants::MAX_MESSAGE_SIZE;
use filestore_core::Config;
use filestore_services::{create_storage, ContentRepository, TransferService};

use crate::proto::file_service_server::FileServiceServer;
use crate::service::FileStoreService;
use crate::state::AppState;

/// Initialize the entire application: configuration checks, telemetry, then services.
pub async fn initialize_app(config: Config) -> Result<FileServiceServer<FileStoreService>> {
    // Validate configuration first - fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    filestore_infra::init_telemetry(config.log_format(), config.environment())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    let state = build_state(config).await?;
    Ok(grpc_service(state))
}

/// Wire storage, repository, transfer service and admission control together.
/// Does not touch global state, so tests can build as many as they need.
pub async fn build_state(config: Config) -> Result<AppState> {
    let storage = create_storage(&config)
        .await
        .context("Failed to initialize storage")?;
    tracing::info!(
        backend = %storage.backend_type(),
        path = %config.storage_path(),
        "Storage initialized"
    );

    let transfer = TransferService::new(ContentRepository::new(storage));
    Ok(AppState::new(config, transfer))
}

/// The tonic service, with message limits raised so large client chunks are accepted.
pub fn grpc_service(state: AppState) -> FileServiceServer<FileStoreService> {
    FileServiceServer::new(FileStoreService::new(state))
        .max_decoding_message_size(MAX_MESSAGE_SIZE)
        .max_encoding_message_size(MAX_MESSAGE_SIZE)
}
