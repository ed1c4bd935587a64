//! Query configuration.

use serde::Deserialize;

/// Administrator-supplied SQL query templates, keyed by purpose.
///
/// Each query is optional. An empty string is treated the same as an absent
/// query. The templates are opaque: only their `:username` placeholder is
/// bound, nothing else is parsed or validated.
///
/// Deserialises from a table such as:
///
/// ```toml
/// [queries]
/// get_password_hash_for_user = "SELECT hash FROM users WHERE name = :username"
/// user_exists = "SELECT 1 FROM users WHERE name = :username"
/// get_users = "SELECT name FROM users WHERE name LIKE :username ESCAPE '\\' ORDER BY name"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryConfig {
    get_password_hash_for_user: Option<String>,
    user_exists: Option<String>,
    get_users: Option<String>,
}

impl QueryConfig {
    /// Creates a configuration with no query set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the query returning a user's password hash in its first column.
    pub fn with_password_hash_query(mut self, query: impl Into<String>) -> Self {
        self.get_password_hash_for_user = Some(query.into());
        self
    }

    /// Sets the query returning a truthy first column for existing users.
    pub fn with_user_exists_query(mut self, query: impl Into<String>) -> Self {
        self.user_exists = Some(query.into());
        self
    }

    /// Sets the query listing user names matching a `LIKE` pattern.
    pub fn with_get_users_query(mut self, query: impl Into<String>) -> Self {
        self.get_users = Some(query.into());
        self
    }

    /// Returns the password hash query, if set.
    pub fn password_hash_query(&self) -> Option<&str> {
        non_empty(&self.get_password_hash_for_user)
    }

    /// Returns the user existence query, if set.
    pub fn user_exists_query(&self) -> Option<&str> {
        non_empty(&self.user_exists)
    }

    /// Returns the user listing query, if set.
    pub fn get_users_query(&self) -> Option<&str> {
        non_empty(&self.get_users)
    }

    /// Returns true if both queries needed for logins are set.
    pub fn login_queries_set(&self) -> bool {
        self.password_hash_query().is_some() && self.user_exists_query().is_some()
    }
}

fn non_empty(query: &Option<String>) -> Option<&str> {
    query.as_deref().filter(|q| !q.is_empty())
}
