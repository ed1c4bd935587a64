//! Database connector traits.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::statement::Statement;
use crate::value::ColumnValue;

/// Source of database handles.
///
/// Constructing a connector must not open a connection. The first call to
/// [`DatabaseConnector::handle`] materialises one; whether handles are pooled
/// or cached afterwards is up to the implementation.
#[async_trait]
pub trait DatabaseConnector: Send + Sync {
    /// Handle type yielded by this connector.
    type Handle: DatabaseHandle;

    /// Acquires a usable handle, connecting on first use.
    async fn handle(&self) -> Result<Self::Handle, StorageError>;
}

/// A live database handle able to run prepared statements.
#[async_trait]
pub trait DatabaseHandle: Send + Sync {
    /// Executes the statement and returns the first column of the first row.
    ///
    /// Returns `Ok(None)` when the statement produced no rows.
    async fn fetch_column(
        &self,
        statement: &Statement,
    ) -> Result<Option<ColumnValue>, StorageError>;

    /// Executes the statement and returns the first column of every row,
    /// in the order the database produced them.
    async fn fetch_all_column(
        &self,
        statement: &Statement,
    ) -> Result<Vec<ColumnValue>, StorageError>;

    /// Wraps a complete query so that clauses can be appended after it.
    fn wrap_subquery(&self, sql: &str) -> String {
        format!("({sql})")
    }
}
