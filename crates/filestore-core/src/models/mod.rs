//! Data models shared by the storage, service and transport layers.

mod file;
mod operation;

pub use file::FileMetadata;
pub use operation::OperationKind;
