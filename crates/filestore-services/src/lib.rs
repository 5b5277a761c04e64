//! Filestore Services Layer
//!
//! This crate is the **business service layer**: the in-memory metadata index, the
//! content repository that keeps stored bytes and metadata in step, and the transfer
//! service that validates requests before they reach the repository. Keep transport
//! concerns (chunking, admission, wire messages) in filestore-api.

pub mod error;
pub mod metadata_store;
pub mod repository;
pub mod transfer;

pub use error::TransferError;
pub use filestore_storage::{create_storage, Storage, StorageBackend, StorageError, StorageResult};
pub use metadata_store::MetadataStore;
pub use repository::ContentRepository;
pub use transfer::TransferService;
