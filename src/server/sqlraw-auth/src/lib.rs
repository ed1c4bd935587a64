//! # sqlraw Auth
//!
//! User backend that authenticates, lists and checks users by running
//! administrator-supplied SQL queries against an external database.
//!
//! ## Operations
//!
//! - Capability negotiation derived from the configured queries
//! - Password check against a stored Argon2 or bcrypt hash
//! - User existence check
//! - Substring search over user names with `LIMIT`/`OFFSET` pagination

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod actions;
pub mod backend;
pub mod config;
pub mod error;
pub mod hash;
pub mod sql_raw;

pub use actions::Actions;
pub use backend::UserBackend;
pub use config::QueryConfig;
pub use error::AuthError;
pub use sql_raw::SqlRawBackend;
