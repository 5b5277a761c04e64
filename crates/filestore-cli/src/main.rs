//! Filestore CLI: command-line client for the filestore gRPC server.
//!
//! Set FILESTORE_ADDR (or pass --address) to point at a server other than localhost.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use filestore_cli::{
    default_download_path, format_table, init_tracing, upload_name, FileRow, FileStoreClient,
    DEFAULT_ADDRESS, LIST_TIMEOUT, TRANSFER_TIMEOUT,
};

#[derive(Parser)]
#[command(name = "filestore", about = "Filestore gRPC client")]
struct Cli {
    /// Server address
    #[arg(long, global = true, env = "FILESTORE_ADDR", default_value = DEFAULT_ADDRESS)]
    address: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a local file under its base name
    Upload {
        /// Path to the file to upload
        file: PathBuf,
    },
    /// Download a stored file
    Download {
        /// Name of the stored file
        name: String,
        /// Where to write the content (default: downloaded_<NAME>)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// List stored files with their timestamps and sizes
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut client = FileStoreClient::connect(&cli.address)
        .await
        .with_context(|| format!("Failed to connect to {}", cli.address))?;

    match cli.command {
        Commands::Upload { file } => {
            let filename = upload_name(&file)
                .with_context(|| format!("{} has no file name", file.display()))?;
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;

            tracing::debug!(filename = %filename, size_bytes = data.len(), "Uploading");
            let response = client
                .upload_bytes(&filename, data, TRANSFER_TIMEOUT)
                .await
                .context("Upload failed")?;
            println!(
                "Uploaded: {}, size={} bytes",
                response.message, response.size
            );
        }
        Commands::Download { name, output } => {
            let content = client
                .download(&name, TRANSFER_TIMEOUT)
                .await
                .context("Download failed")?;
            let path = output.unwrap_or_else(|| default_download_path(&name));
            tokio::fs::write(&path, &content)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Downloaded {} bytes to {}", content.len(), path.display());
        }
        Commands::List { json } => {
            let files = client.list(LIST_TIMEOUT).await.context("List failed")?;
            let rows: Vec<FileRow> = files.into_iter().map(FileRow::from).collect();
            if json {
                let out = serde_json::to_string_pretty(&rows).context("Serialize response")?;
                println!("{}", out);
            } else {
                print!("{}", format_table(&rows));
            }
        }
    }

    Ok(())
}
