//! User backend trait.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::{Actions, AuthError};

/// Operations a pluggable user backend offers to its host.
///
/// The host asks [`UserBackend::implements_actions`] before invoking an
/// optional operation. All members must be callable regardless of what was
/// advertised.
#[async_trait]
pub trait UserBackend: Send + Sync {
    /// Returns the name of this backend for logging/debugging.
    fn backend_name(&self) -> &'static str;

    /// Returns true if the backend supports any of the requested actions.
    fn implements_actions(&self, actions: Actions) -> bool;

    /// Checks a login name and password.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(username))` - The provided username, if the password matches
    /// * `Ok(None)` - Unknown user, wrong password or no query configured
    /// * `Err(AuthError)` - If the database could not answer
    async fn check_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<String>, AuthError>;

    /// Returns true if the user exists.
    async fn user_exists(&self, username: &str) -> Result<bool, AuthError>;

    /// Lists user names containing `search`, optionally paginated.
    async fn get_users(
        &self,
        search: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<String>, AuthError>;

    /// Deletes a user. Returns true on success.
    fn delete_user(&self, uid: &str) -> bool;

    /// Returns the display name of a user.
    fn get_display_name(&self, uid: &str) -> Option<String>;

    /// Returns display names keyed by user id.
    fn get_display_names(
        &self,
        search: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> HashMap<String, String>;

    /// Returns true if the backend can list its users.
    fn has_user_listings(&self) -> bool;
}
