//! # sqlraw Storage - SQLite Connector
//!
//! SQLite implementation of the database connector. The connection pool is
//! created on first use, so building a connector never touches the database.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, ValueRef};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use sqlraw_storage::{
    ColumnValue, DatabaseConnector, DatabaseHandle, ParamValue, Statement, StorageError,
};

fn default_max_connections() -> u32 {
    5
}

/// SQLite connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteConfig {
    /// Connection URL, e.g. `sqlite:/var/lib/users.db`.
    pub url: String,
    /// Maximum number of pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl SqliteConfig {
    /// Creates a configuration for the given URL with default pool size.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_max_connections(),
        }
    }
}

/// Lazily connecting SQLite connector.
#[derive(Debug)]
pub struct SqliteConnector {
    config: SqliteConfig,
    pool: OnceCell<SqlitePool>,
}

impl SqliteConnector {
    /// Creates a connector. No connection is opened until a handle is requested.
    pub fn new(config: SqliteConfig) -> Self {
        Self {
            config,
            pool: OnceCell::new(),
        }
    }

    /// Creates a connector for a database file, creating the file on first use.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let url = format!("sqlite:{}?mode=rwc", path.as_ref().display());
        Self::new(SqliteConfig::new(url))
    }

    /// Returns whether the pool has been materialised.
    pub fn is_connected(&self) -> bool {
        self.pool.initialized()
    }

    /// Executes raw SQL statements (schema creation, fixtures).
    pub async fn execute_raw(&self, sql: &str) -> Result<(), StorageError> {
        let handle = self.handle().await?;
        for statement in sql.split(';').filter(|s| !s.trim().is_empty()) {
            sqlx::query(statement.trim())
                .execute(&handle.pool)
                .await
                .map_err(|e| StorageError::Query(e.to_string()))?;
        }
        Ok(())
    }
}

#[async_trait]
impl DatabaseConnector for SqliteConnector {
    type Handle = SqliteHandle;

    async fn handle(&self) -> Result<SqliteHandle, StorageError> {
        let pool = self
            .pool
            .get_or_try_init(|| async {
                debug!(url = %self.config.url, "Opening SQLite pool");

                let pool = SqlitePoolOptions::new()
                    .max_connections(self.config.max_connections)
                    .connect(&self.config.url)
                    .await
                    .map_err(|e| StorageError::Connection(e.to_string()))?;

                info!(max_connections = self.config.max_connections, "SQLite pool ready");
                Ok::<_, StorageError>(pool)
            })
            .await?;

        Ok(SqliteHandle { pool: pool.clone() })
    }
}

/// Handle onto the shared SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteHandle {
    pool: SqlitePool,
}

impl SqliteHandle {
    /// Renders the statement with `?N` placeholders and collects its values.
    fn positional(statement: &Statement) -> Result<(String, Vec<ParamValue>), StorageError> {
        let values = statement.ordered_values()?.into_iter().cloned().collect();
        Ok((statement.positional_sql(|n| format!("?{n}")), values))
    }
}

fn bind_all(sql: &str, values: Vec<ParamValue>) -> Query<'_, Sqlite, SqliteArguments<'_>> {
    let mut query = sqlx::query(sql);
    for value in values {
        query = match value {
            ParamValue::Text(s) => query.bind(s),
            ParamValue::Integer(v) => query.bind(v),
        };
    }
    query
}

/// Decodes the first column of a row, whatever its storage class.
fn first_column(row: &SqliteRow) -> Result<ColumnValue, StorageError> {
    let raw = row
        .try_get_raw(0)
        .map_err(|e| StorageError::Decode(e.to_string()))?;
    if raw.is_null() {
        return Ok(ColumnValue::Null);
    }

    if let Ok(v) = row.try_get::<i64, _>(0) {
        return Ok(ColumnValue::Integer(v));
    }
    if let Ok(v) = row.try_get::<String, _>(0) {
        return Ok(ColumnValue::Text(v));
    }
    if let Ok(v) = row.try_get::<f64, _>(0) {
        return Ok(ColumnValue::Real(v));
    }
    row.try_get::<Vec<u8>, _>(0)
        .map(ColumnValue::Blob)
        .map_err(|e| StorageError::Decode(e.to_string()))
}

#[async_trait]
impl DatabaseHandle for SqliteHandle {
    async fn fetch_column(
        &self,
        statement: &Statement,
    ) -> Result<Option<ColumnValue>, StorageError> {
        let (sql, values) = Self::positional(statement)?;

        let row = bind_all(&sql, values)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;

        row.as_ref().map(first_column).transpose()
    }

    async fn fetch_all_column(
        &self,
        statement: &Statement,
    ) -> Result<Vec<ColumnValue>, StorageError> {
        let (sql, values) = Self::positional(statement)?;

        let rows = bind_all(&sql, values)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;

        debug!(rows = rows.len(), "Fetched column");
        rows.iter().map(first_column).collect()
    }

    fn wrap_subquery(&self, sql: &str) -> String {
        // SQLite rejects a bare parenthesised select as a statement.
        format!("SELECT * FROM ({sql})")
    }
}
