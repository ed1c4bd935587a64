//! Storage error types.

use thiserror::Error;

/// Errors that can occur while talking to the user database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The database could not be reached or the pool could not be created.
    #[error("connection error: {0}")]
    Connection(String),

    /// The statement was rejected or failed while executing.
    #[error("query failed: {0}")]
    Query(String),

    /// Named parameters do not match the placeholders of the statement.
    #[error("parameter error: {0}")]
    Parameter(String),

    /// A column value could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}
