//! Filestore Infrastructure Library
//!
//! Shared infrastructure components used by the server:
//! - Admission control (bounded, non-queuing slot pools per operation kind)
//! - Telemetry initialization (tracing subscriber)

#[cfg(feature = "admission")]
pub mod admission;

#[cfg(feature = "observability-basic")]
pub mod telemetry;

#[cfg(feature = "admission")]
pub use admission::{AdmissionController, AdmissionPermit};

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry};
