//! RPC handler bodies, independent of the generated service trait.

pub mod download;
pub mod list;
pub mod upload;
