use filestore_api::setup;
use filestore_core::Config;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (telemetry, storage, services)
    let service = setup::initialize_app(config.clone()).await?;

    // Start the server
    setup::server::start_server(&config, service).await?;

    filestore_infra::shutdown_telemetry().await;
    Ok(())
}
