//! Filestore Storage Library
//!
//! Raw byte storage for the file store. The rest of the system only sees the
//! [`Storage`] trait, which exposes `write(key, bytes)` and `read(key) -> bytes`.
//!
//! # Storage key format
//!
//! Keys are validated filenames and map one-to-one onto files directly under the
//! storage root. Keys must not contain `..` or a leading `/`.

pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use filestore_core::StorageBackend;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};
