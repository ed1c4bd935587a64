//! # sqlraw Storage
//!
//! Connector abstraction between the sqlraw user backend and a relational
//! database.
//!
//! Provides the traits a database driver implements, statements with named
//! placeholders and the column values read back from result sets.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod error;
pub mod statement;
pub mod value;

pub use backend::{DatabaseConnector, DatabaseHandle};
pub use error::StorageError;
pub use statement::{ParamValue, Statement};
pub use value::ColumnValue;
