//! Validation modules

pub mod filename;

pub use filename::{validate_filename, FilenameError};
