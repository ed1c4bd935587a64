//! Integration tests for the SQL raw backend.
//!
//! These tests run the backend against real SQLite databases, from query
//! configuration to hash verification and paginated listings.

// Allow unwrap() in tests - panics are acceptable for test assertions
#![allow(clippy::disallowed_methods)]

use anyhow::{Context, Result};
use tempfile::TempDir;

use sqlraw_auth::{QueryConfig, SqlRawBackend};
use sqlraw_storage_sqlite::SqliteConnector;

// ============================================================================
// Fixtures
// ============================================================================

/// Query returning a user's password hash.
pub const HASH_QUERY: &str = "SELECT hash FROM users WHERE name = :username";

/// Query returning a truthy value for existing users.
pub const EXISTS_QUERY: &str = "SELECT 1 FROM users WHERE name = :username";

/// Query listing users by substring, honouring backslash-escaped wildcards.
pub const USERS_QUERY: &str =
    "SELECT name FROM users WHERE name LIKE :username ESCAPE '\\' ORDER BY name";

const SCHEMA: &str = "CREATE TABLE users (name TEXT PRIMARY KEY, hash TEXT)";

/// A user row to seed.
pub struct Fixture<'a> {
    /// Login name.
    pub name: &'a str,
    /// Stored password hash, if any.
    pub hash: Option<String>,
}

/// A temporary SQLite user database.
pub struct TestDatabase {
    connector: SqliteConnector,
    _dir: TempDir,
}

impl TestDatabase {
    /// Creates a database with the given users.
    pub async fn seed(users: &[Fixture<'_>]) -> Result<Self> {
        let dir = TempDir::new().context("Failed to create temp dir")?;
        let connector = SqliteConnector::open(dir.path().join("users.db"));

        connector.execute_raw(SCHEMA).await?;
        for user in users {
            let hash = user
                .hash
                .as_deref()
                .map_or_else(|| "NULL".to_string(), |h| format!("'{h}'"));
            connector
                .execute_raw(&format!(
                    "INSERT INTO users (name, hash) VALUES ('{}', {hash})",
                    user.name.replace('\'', "''")
                ))
                .await?;
        }

        Ok(Self {
            connector,
            _dir: dir,
        })
    }

    /// Builds a backend over this database.
    pub fn backend(self, config: QueryConfig) -> TestBackend {
        TestBackend {
            backend: SqlRawBackend::new(config, self.connector),
            _dir: self._dir,
        }
    }
}

/// A backend bound to a temporary database that lives as long as it does.
pub struct TestBackend {
    /// The backend under test.
    pub backend: SqlRawBackend<SqliteConnector>,
    _dir: TempDir,
}

/// All three queries configured.
pub fn full_config() -> QueryConfig {
    QueryConfig::new()
        .with_password_hash_query(HASH_QUERY)
        .with_user_exists_query(EXISTS_QUERY)
        .with_get_users_query(USERS_QUERY)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sqlraw_auth::{hash, Actions, AuthError, UserBackend};
    use sqlraw_storage::StorageError;

    fn argon2_hash(password: &str) -> String {
        hash::hash_password(password).unwrap()
    }

    fn listing_names() -> Vec<Fixture<'static>> {
        ["alice", "alina", "bob", "a_b", "axb", "50%off", "500off"]
            .into_iter()
            .map(|name| Fixture { name, hash: None })
            .collect()
    }

    async fn listing_backend() -> TestBackend {
        TestDatabase::seed(&listing_names())
            .await
            .unwrap()
            .backend(full_config())
    }

    #[tokio::test]
    async fn test_login_scenario() {
        let db = TestDatabase::seed(&[Fixture {
            name: "alice",
            hash: Some(argon2_hash("secret")),
        }])
        .await
        .unwrap();

        let config = QueryConfig::new()
            .with_password_hash_query(HASH_QUERY)
            .with_user_exists_query(EXISTS_QUERY);
        let test = db.backend(config);
        let backend = &test.backend;

        assert!(backend.implements_actions(Actions::CHECK_PASSWORD));

        assert_eq!(
            backend.check_password("alice", "secret").await.unwrap(),
            Some("alice".to_string())
        );
        assert_eq!(backend.check_password("alice", "wrong").await.unwrap(), None);
        assert_eq!(backend.check_password("bob", "x").await.unwrap(), None);

        assert!(backend.user_exists("alice").await.unwrap());
        assert!(!backend.user_exists("carol").await.unwrap());
    }

    #[tokio::test]
    async fn test_bcrypt_hashes_verify() {
        let stored = bcrypt::hash("hunter2", 4).unwrap();
        let php_style = format!("$2y${}", &stored[4..]);

        let test = TestDatabase::seed(&[
            Fixture {
                name: "dave",
                hash: Some(stored),
            },
            Fixture {
                name: "erin",
                hash: Some(php_style),
            },
        ])
        .await
        .unwrap()
        .backend(full_config());

        let backend = &test.backend;
        assert_eq!(
            backend.check_password("dave", "hunter2").await.unwrap(),
            Some("dave".to_string())
        );
        assert_eq!(
            backend.check_password("erin", "hunter2").await.unwrap(),
            Some("erin".to_string())
        );
        assert_eq!(backend.check_password("erin", "hunter3").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sha_crypt_hashes_verify() {
        // `openssl passwd -6 -salt abcdefgh secret` / `openssl passwd -5 -salt saltsalt secret`
        let sha512 = concat!(
            "$6$abcdefgh$ltjgWl6579NluT/Vi1nwEvcil.G5Nbc4NiXZaNGStk8PSwGfQv72N2CKPPr",
            "VACtLtip/cZ/1GM/O6IND4WQhG."
        );
        let sha256 = "$5$saltsalt$0IyaXrmV7.sGNS6tirgqHLqX/G.FBvgkYA.lpPdS5sA";

        let test = TestDatabase::seed(&[
            Fixture {
                name: "mail",
                hash: Some(sha512.to_string()),
            },
            Fixture {
                name: "relay",
                hash: Some(sha256.to_string()),
            },
        ])
        .await
        .unwrap()
        .backend(full_config());

        let backend = &test.backend;
        assert_eq!(
            backend.check_password("mail", "secret").await.unwrap(),
            Some("mail".to_string())
        );
        assert_eq!(
            backend.check_password("relay", "secret").await.unwrap(),
            Some("relay".to_string())
        );
        assert_eq!(backend.check_password("mail", "Secret").await.unwrap(), None);
        assert_eq!(backend.check_password("relay", "").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_user_without_hash_is_not_authenticated() {
        let test = TestDatabase::seed(&[Fixture {
            name: "frank",
            hash: None,
        }])
        .await
        .unwrap()
        .backend(full_config());

        assert_eq!(test.backend.check_password("frank", "").await.unwrap(), None);
        assert!(test.backend.user_exists("frank").await.unwrap());
    }

    #[tokio::test]
    async fn test_backend_connects_lazily() {
        let test = TestDatabase::seed(&[]).await.unwrap().backend(full_config());
        assert!(test.backend.connector().is_connected());

        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("lazy.db");
        let backend = SqlRawBackend::new(full_config(), SqliteConnector::open(&db_path));

        assert!(backend.implements_actions(Actions::CHECK_PASSWORD));
        assert!(!backend.connector().is_connected());
        assert!(!db_path.exists());

        // The table is missing, so the query fails once the connection exists.
        let result = backend.user_exists("alice").await;
        assert!(matches!(result, Err(AuthError::Storage(StorageError::Query(_)))));
        assert!(backend.connector().is_connected());
    }

    #[tokio::test]
    async fn test_malformed_query_propagates() {
        let config = QueryConfig::new()
            .with_password_hash_query("SELECT hash FROM nowhere WHERE name = :username")
            .with_user_exists_query(EXISTS_QUERY);
        let test = TestDatabase::seed(&[]).await.unwrap().backend(config);

        let result = test.backend.check_password("alice", "secret").await;
        assert!(matches!(result, Err(AuthError::Storage(_))));
    }

    #[tokio::test]
    async fn test_list_all_users_in_query_order() {
        let test = listing_backend().await;

        let users = test.backend.get_users("", None, None).await.unwrap();
        assert_eq!(
            users,
            vec!["50%off", "500off", "a_b", "alice", "alina", "axb", "bob"]
        );
    }

    #[tokio::test]
    async fn test_search_substring() {
        let test = listing_backend().await;

        let users = test.backend.get_users("li", None, None).await.unwrap();
        assert_eq!(users, vec!["alice", "alina"]);
    }

    #[tokio::test]
    async fn test_search_wildcards_are_literal() {
        let test = listing_backend().await;

        let users = test.backend.get_users("a_b", None, None).await.unwrap();
        assert_eq!(users, vec!["a_b"]);

        let users = test.backend.get_users("50%", None, None).await.unwrap();
        assert_eq!(users, vec!["50%off"]);
    }

    #[tokio::test]
    async fn test_pagination() {
        let test = listing_backend().await;
        let backend = &test.backend;

        assert_eq!(
            backend.get_users("", Some(2), None).await.unwrap(),
            vec!["50%off", "500off"]
        );
        assert_eq!(
            backend.get_users("", Some(2), Some(1)).await.unwrap(),
            vec!["500off", "a_b"]
        );
        assert_eq!(
            backend.get_users("a", Some(10), Some(3)).await.unwrap(),
            vec!["axb"]
        );
        assert!(backend.get_users("", Some(0), Some(0)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_offset_without_limit_is_left_to_the_database() {
        // SQLite only accepts OFFSET after LIMIT; the clause is still emitted
        // and the database error surfaces to the caller.
        let test = listing_backend().await;

        let result = test.backend.get_users("", None, Some(1)).await;
        assert!(matches!(result, Err(AuthError::Storage(StorageError::Query(_)))));
    }

    #[tokio::test]
    async fn test_listing_without_query_is_empty() {
        let config = QueryConfig::new()
            .with_password_hash_query(HASH_QUERY)
            .with_user_exists_query(EXISTS_QUERY);
        let test = TestDatabase::seed(&listing_names()).await.unwrap().backend(config);

        assert!(test.backend.get_users("", None, None).await.unwrap().is_empty());
    }
}
