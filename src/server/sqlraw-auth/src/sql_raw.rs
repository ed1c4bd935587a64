//! SQL raw user backend.
//!
//! Runs the configured query templates against the connector's database.
//! Only the `:username` placeholder (plus `:limit`/`:offset` for listings) is
//! ever bound; the templates themselves are passed through untouched.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, warn};

use sqlraw_storage::{ColumnValue, DatabaseConnector, DatabaseHandle, Statement};

use crate::hash;
use crate::{Actions, AuthError, QueryConfig, UserBackend};

/// Placeholder carrying the user name (or search pattern) in every query.
const USERNAME_PARAM: &str = "username";
const LIMIT_PARAM: &str = "limit";
const OFFSET_PARAM: &str = "offset";

/// Backend name reported to the host.
pub const BACKEND_NAME: &str = "SQL raw";

/// Escapes the `LIKE` wildcards `_` and `%` with a backslash.
///
/// Backslashes already present in the input are left as they are.
pub fn escape_like_wildcards(input: &str) -> String {
    input.replace('_', "\\_").replace('%', "\\%")
}

/// Builds the substring pattern bound to `:username` for user listings.
pub fn search_pattern(search: &str) -> String {
    format!("%{}%", escape_like_wildcards(search))
}

/// User backend driven by administrator-supplied SQL queries.
///
/// Construction never touches the database; every operation asks the
/// connector for a handle when it runs.
pub struct SqlRawBackend<C> {
    config: QueryConfig,
    connector: C,
}

impl<C: DatabaseConnector> SqlRawBackend<C> {
    /// Creates a backend over the given queries and connector.
    pub fn new(config: QueryConfig, connector: C) -> Self {
        Self { config, connector }
    }

    /// Returns the query configuration.
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Returns the connector.
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Returns the actions this configuration supports.
    ///
    /// Password checks are only offered when both the hash query and the
    /// existence query are set.
    pub fn supported_actions(&self) -> Actions {
        if self.config.login_queries_set() {
            Actions::CHECK_PASSWORD
        } else {
            Actions::NONE
        }
    }
}

#[async_trait]
impl<C: DatabaseConnector> UserBackend for SqlRawBackend<C> {
    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn implements_actions(&self, actions: Actions) -> bool {
        self.supported_actions().intersects(actions)
    }

    async fn check_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<String>, AuthError> {
        let Some(query) = self.config.password_hash_query() else {
            warn!("check_password called without a password hash query");
            return Ok(None);
        };

        let handle = self.connector.handle().await?;
        let statement = Statement::prepare(query).bind(USERNAME_PARAM, username);

        let Some(stored) = handle.fetch_column(&statement).await? else {
            debug!("No password hash found");
            return Ok(None);
        };
        let Some(stored_hash) = stored.into_text() else {
            debug!("Password hash column is NULL");
            return Ok(None);
        };

        if hash::verify_password(password, &stored_hash) {
            // The caller's input is echoed back, not the stored spelling.
            Ok(Some(username.to_string()))
        } else {
            debug!("Password verification failed");
            Ok(None)
        }
    }

    async fn user_exists(&self, username: &str) -> Result<bool, AuthError> {
        let Some(query) = self.config.user_exists_query() else {
            warn!("user_exists called without a user exists query");
            return Ok(false);
        };

        let handle = self.connector.handle().await?;
        let statement = Statement::prepare(query).bind(USERNAME_PARAM, username);

        let exists = handle
            .fetch_column(&statement)
            .await?
            .is_some_and(|value| value.is_truthy());
        Ok(exists)
    }

    async fn get_users(
        &self,
        search: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<String>, AuthError> {
        let Some(query) = self.config.get_users_query() else {
            warn!("get_users called without a get users query");
            return Ok(Vec::new());
        };

        let handle = self.connector.handle().await?;

        let mut sql = handle.wrap_subquery(query);
        if limit.is_some() {
            sql.push_str(" LIMIT :limit");
        }
        if offset.is_some() {
            sql.push_str(" OFFSET :offset");
        }

        let mut statement = Statement::prepare(sql).bind(USERNAME_PARAM, search_pattern(search));
        if let Some(limit) = limit {
            statement = statement.bind(LIMIT_PARAM, limit);
        }
        if let Some(offset) = offset {
            statement = statement.bind(OFFSET_PARAM, offset);
        }

        let users: Vec<String> = handle
            .fetch_all_column(&statement)
            .await?
            .into_iter()
            .filter_map(ColumnValue::into_text)
            .collect();

        debug!(count = users.len(), "Listed users");
        Ok(users)
    }

    fn delete_user(&self, _uid: &str) -> bool {
        false
    }

    fn get_display_name(&self, _uid: &str) -> Option<String> {
        None
    }

    fn get_display_names(
        &self,
        _search: &str,
        _limit: Option<u32>,
        _offset: Option<u32>,
    ) -> HashMap<String, String> {
        HashMap::new()
    }

    fn has_user_listings(&self) -> bool {
        false
    }
}
