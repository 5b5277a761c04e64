//! Protocol and runtime constants.

/// Size of a single chunk when splitting a payload for transfer (64 KiB).
///
/// This is a tuning parameter, not a protocol maximum: receivers accept chunks of any
/// size up to [`MAX_MESSAGE_SIZE`].
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Largest encoded/decoded RPC message the server accepts.
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Confirmation message returned after a completed upload.
pub const UPLOAD_SUCCESS_MESSAGE: &str = "file uploaded successfully";

/// Default listen address for the RPC server.
pub const DEFAULT_GRPC_ADDR: &str = "0.0.0.0:50051";

/// Default storage root.
pub const DEFAULT_STORAGE_PATH: &str = "./uploads_default";

pub const DEFAULT_UPLOAD_LIMIT: usize = 10;
pub const DEFAULT_DOWNLOAD_LIMIT: usize = 10;
pub const DEFAULT_LIST_LIMIT: usize = 100;
