//! Filestore gRPC API
//!
//! The tonic service implementing `filestore.v1.FileService`, its setup and server
//! runtime, and the generated protocol types (also used by the `filestore` client).

pub mod error;
pub mod handlers;
pub mod service;
pub mod setup;
pub mod state;

pub mod proto {
    tonic::include_proto!("filestore.v1");
}

pub use error::GrpcAppError;
pub use service::FileStoreService;
pub use state::AppState;
