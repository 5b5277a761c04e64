//! Filestore Core Library
//!
//! This crate provides the domain model, error taxonomy, configuration, and validation
//! shared across all filestore components (storage, services, API server and CLI).

pub mod chunking;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use chunking::ChunkCursor;
pub use config::{AdmissionLimits, BaseConfig, Config, FileStoreConfig};
pub use error::{AppError, ErrorMetadata, LogLevel, StatusKind};
pub use models::{FileMetadata, OperationKind};
pub use storage_types::StorageBackend;
