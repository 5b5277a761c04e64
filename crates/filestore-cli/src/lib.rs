//! Filestore client library.
//!
//! [`FileStoreClient`] wraps the generated gRPC client with chunked upload, reassembled
//! download and per-call deadlines. The `filestore` binary is a thin clap front-end over
//! it; the helpers below format its output.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use filestore_api::proto::file_service_client::FileServiceClient;
use filestore_api::proto::{DownloadRequest, Empty, FileInfo, UploadRequest, UploadResponse};
use filestore_core::constants::{CHUNK_SIZE, MAX_MESSAGE_SIZE};
use filestore_core::ChunkCursor;
use futures::StreamExt;
use serde::Serialize;
use tonic::transport::{Channel, Endpoint};
use tokio::time::Instant;
use tonic::{Code, Request, Status};

pub const DEFAULT_ADDRESS: &str = "http://localhost:50051";

/// Deadline for uploads and downloads
pub const TRANSFER_TIMEOUT: Duration = Duration::from_secs(30);

/// Deadline for list calls
pub const LIST_TIMEOUT: Duration = Duration::from_secs(5);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid server address {0}")]
    InvalidAddress(String),

    #[error("failed to connect: {0}")]
    Connect(#[from] tonic::transport::Error),

    #[error("{}: {}", .0.code(), .0.message())]
    Rpc(#[from] Status),

    #[error("deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}

impl ClientError {
    /// gRPC status code, when the server (or transport) supplied one
    pub fn code(&self) -> Option<Code> {
        match self {
            ClientError::Rpc(status) => Some(status.code()),
            ClientError::DeadlineExceeded(_) => Some(Code::DeadlineExceeded),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Prefix `http://` when the address has no scheme (`localhost:50051`).
pub fn normalize_address(address: &str) -> String {
    if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{}", address)
    }
}

#[derive(Clone, Debug)]
pub struct FileStoreClient {
    inner: FileServiceClient<Channel>,
}

impl FileStoreClient {
    pub async fn connect(address: &str) -> ClientResult<Self> {
        let address = normalize_address(address);
        let endpoint = Endpoint::from_shared(address.clone())
            .map_err(|_| ClientError::InvalidAddress(address))?
            .connect_timeout(CONNECT_TIMEOUT);
        let channel = endpoint.connect().await?;

        Ok(Self {
            inner: FileServiceClient::new(channel)
                .max_decoding_message_size(MAX_MESSAGE_SIZE)
                .max_encoding_message_size(MAX_MESSAGE_SIZE),
        })
    }

    /// Stream `data` to the server in [`CHUNK_SIZE`] chunks.
    ///
    /// Every message carries the filename. Empty content is sent as one empty chunk so
    /// the server can reject it explicitly.
    pub async fn upload_bytes(
        &mut self,
        filename: &str,
        data: impl Into<Bytes>,
        timeout: Duration,
    ) -> ClientResult<UploadResponse> {
        let data: Bytes = data.into();
        let filename = filename.to_string();

        let first = if data.is_empty() {
            Some(UploadRequest {
                filename: filename.clone(),
                chunk: Bytes::new(),
            })
        } else {
            None
        };
        let chunks = ChunkCursor::new(data, CHUNK_SIZE).map(move |chunk| UploadRequest {
            filename: filename.clone(),
            chunk,
        });
        let messages = futures::stream::iter(first.into_iter().chain(chunks));

        let mut request = Request::new(messages);
        request.set_timeout(timeout);

        let client = &mut self.inner;
        with_deadline(timeout, async move {
            Ok(client.upload(request).await?.into_inner())
        })
        .await
    }

    /// Download `filename`, reassembling chunks in arrival order.
    pub async fn download(&mut self, filename: &str, timeout: Duration) -> ClientResult<Vec<u8>> {
        let mut request = Request::new(DownloadRequest {
            filename: filename.to_string(),
        });
        request.set_timeout(timeout);

        let client = &mut self.inner;
        with_deadline(timeout, async move {
            let mut stream = client.download(request).await?.into_inner();
            let mut content = Vec::new();
            while let Some(message) = stream.next().await {
                content.extend_from_slice(&message?.chunk);
            }
            Ok(content)
        })
        .await
    }

    pub async fn list(&mut self, timeout: Duration) -> ClientResult<Vec<FileInfo>> {
        let mut request = Request::new(Empty {});
        request.set_timeout(timeout);

        let client = &mut self.inner;
        with_deadline(timeout, async move {
            Ok(client.list_files(request).await?.into_inner().files)
        })
        .await
    }
}

async fn with_deadline<T, F>(timeout: Duration, fut: F) -> ClientResult<T>
where
    F: Future<Output = ClientResult<T>>,
{
    let started = Instant::now();
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result.map_err(|err| classify_expired(err, timeout, started.elapsed())),
        Err(_) => Err(ClientError::DeadlineExceeded(timeout)),
    }
}

/// The server enforces the propagated `grpc-timeout` too and may answer first, with
/// CANCELLED or DEADLINE_EXCEEDED. Once the deadline has passed, either one is reported
/// as the local deadline.
fn classify_expired(err: ClientError, timeout: Duration, elapsed: Duration) -> ClientError {
    match err {
        ClientError::Rpc(ref status)
            if elapsed >= timeout
                && matches!(status.code(), Code::Cancelled | Code::DeadlineExceeded) =>
        {
            ClientError::DeadlineExceeded(timeout)
        }
        other => other,
    }
}

/// Name under which a local file is uploaded: its base name.
pub fn upload_name(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().into_owned())
}

/// `downloaded_<name>` in the current directory
pub fn default_download_path(filename: &str) -> PathBuf {
    PathBuf::from(format!("downloaded_{}", filename))
}

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Listing row in the shape printed by `list --json`.
#[derive(Debug, Serialize)]
pub struct FileRow {
    pub filename: String,
    pub created_at: String,
    pub updated_at: String,
    pub size: i64,
}

impl From<FileInfo> for FileRow {
    fn from(info: FileInfo) -> Self {
        Self {
            filename: info.filename,
            created_at: info.created_at,
            updated_at: info.updated_at,
            size: info.size,
        }
    }
}

const MAX_FILENAME_WIDTH: usize = 48;

/// Render rows as an aligned text table.
pub fn format_table(rows: &[FileRow]) -> String {
    let headers = ["Filename", "Created At", "Updated At", "Size (bytes)"];
    let cells: Vec<[String; 4]> = rows
        .iter()
        .map(|row| {
            [
                truncate_string(&row.filename, MAX_FILENAME_WIDTH),
                row.created_at.clone(),
                row.updated_at.clone(),
                row.size.to_string(),
            ]
        })
        .collect();

    let mut widths = headers.map(|h| h.len());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut push_line = |cols: [&str; 4]| {
        let line = format!(
            "{:<w0$}  {:<w1$}  {:<w2$}  {:>w3$}",
            cols[0],
            cols[1],
            cols[2],
            cols[3],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
            w3 = widths[3],
        );
        out.push_str(line.trim_end());
        out.push('\n');
    };

    push_line(headers);
    for row in &cells {
        push_line([row[0].as_str(), row[1].as_str(), row[2].as_str(), row[3].as_str()]);
    }
    out
}

/// Initialize tracing for the CLI binary (stderr, `info` unless `RUST_LOG` says otherwise).
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_address_adds_scheme() {
        assert_eq!(normalize_address("localhost:50051"), "http://localhost:50051");
        assert_eq!(
            normalize_address("https://files.example.com"),
            "https://files.example.com"
        );
    }

    #[test]
    fn upload_name_is_base_name() {
        assert_eq!(
            upload_name(Path::new("/tmp/some/dir/report.pdf")).as_deref(),
            Some("report.pdf")
        );
        assert_eq!(upload_name(Path::new("notes.txt")).as_deref(), Some("notes.txt"));
        assert_eq!(upload_name(Path::new("/")), None);
    }

    #[test]
    fn default_download_path_prefixes_name() {
        assert_eq!(
            default_download_path("a.txt"),
            PathBuf::from("downloaded_a.txt")
        );
    }

    #[test]
    fn truncate_string_counts_chars() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("ééééé", 4), "é...");
        assert_eq!(truncate_string("hello", 0), "...");
    }

    #[test]
    fn format_table_aligns_columns() {
        let rows = vec![
            FileRow {
                filename: "a.txt".to_string(),
                created_at: "2024-01-02T03:04:05Z".to_string(),
                updated_at: "2024-01-02T03:04:06Z".to_string(),
                size: 3,
            },
            FileRow {
                filename: "longer-name.dat".to_string(),
                created_at: "2024-01-02T03:04:05Z".to_string(),
                updated_at: "2024-01-02T03:04:05Z".to_string(),
                size: 65536,
            },
        ];

        let table = format_table(&rows);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Filename         Created At"));
        assert!(lines[0].ends_with("Size (bytes)"));
        assert!(lines[1].starts_with("a.txt            2024-01-02T03:04:05Z"));
        assert!(lines[1].ends_with("           3"));
        assert!(lines[2].ends_with("       65536"));
    }

    #[test]
    fn server_cancel_after_deadline_is_deadline_exceeded() {
        let timeout = Duration::from_millis(100);
        let err = classify_expired(
            ClientError::Rpc(Status::cancelled("Timeout expired")),
            timeout,
            Duration::from_millis(100),
        );
        assert!(matches!(err, ClientError::DeadlineExceeded(d) if d == timeout));

        let err = classify_expired(
            ClientError::Rpc(Status::deadline_exceeded("Timeout expired")),
            timeout,
            Duration::from_millis(250),
        );
        assert_eq!(err.code(), Some(Code::DeadlineExceeded));
        assert!(matches!(err, ClientError::DeadlineExceeded(_)));
    }

    #[test]
    fn cancel_before_deadline_is_kept() {
        let err = classify_expired(
            ClientError::Rpc(Status::cancelled("client went away")),
            Duration::from_secs(5),
            Duration::from_millis(10),
        );
        assert_eq!(err.code(), Some(Code::Cancelled));

        let err = classify_expired(
            ClientError::Rpc(Status::not_found("file not found: a.txt")),
            Duration::from_millis(1),
            Duration::from_secs(1),
        );
        assert_eq!(err.code(), Some(Code::NotFound));
    }

    #[tokio::test]
    async fn with_deadline_times_out_pending_call() {
        let timeout = Duration::from_millis(20);
        let result: ClientResult<()> = with_deadline(timeout, std::future::pending()).await;
        assert!(matches!(result, Err(ClientError::DeadlineExceeded(d)) if d == timeout));
    }

    #[test]
    fn format_table_empty_has_header_only() {
        let table = format_table(&[]);
        assert_eq!(table.lines().count(), 1);
    }
}
