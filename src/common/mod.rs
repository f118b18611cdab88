//! Shared error handling used across every layer

pub mod error;
pub mod result;

pub use error::RepoSyncError;
pub use result::RepoSyncResult;
