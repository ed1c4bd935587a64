//! Authentication error types.

use sqlraw_storage::StorageError;
use thiserror::Error;

/// Errors that can occur while serving a backend operation.
///
/// Unknown users, wrong passwords and missing queries are not errors: they
/// surface as negative results. Only failures talking to the database end up
/// here.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A configured query could not be executed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Password hashing failed.
    #[error("hashing failed: {0}")]
    Hash(String),
}
