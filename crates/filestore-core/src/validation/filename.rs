//! Filename validation.
//!
//! A stored filename maps directly onto a path under the storage root, so it must not be
//! able to name anything outside that root.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilenameError {
    #[error("filename is empty")]
    Empty,

    #[error("filename contains a parent-directory marker: {0}")]
    ParentDirectory(String),

    #[error("filename contains a path separator: {0}")]
    PathSeparator(String),
}

/// Reject empty names, `..`, and forward or backward slashes.
pub fn validate_filename(filename: &str) -> Result<(), FilenameError> {
    if filename.is_empty() {
        return Err(FilenameError::Empty);
    }
    if filename.contains("..") {
        return Err(FilenameError::ParentDirectory(filename.to_string()));
    }
    if filename.contains(['/', '\\']) {
        return Err(FilenameError::PathSeparator(filename.to_string()));
    }
    Ok(())
}
