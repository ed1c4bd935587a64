//! Column values read back from result sets.

/// A single column value as returned by the database.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    /// SQL `NULL`.
    Null,
    /// Integer value.
    Integer(i64),
    /// Floating point value.
    Real(f64),
    /// Text value.
    Text(String),
    /// Binary value.
    Blob(Vec<u8>),
}

impl ColumnValue {
    /// Loose truthiness of a fetched column.
    ///
    /// `NULL`, zero, the empty string, the string `"0"` and an empty blob are
    /// false; everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Integer(v) => *v != 0,
            Self::Real(v) => *v != 0.0,
            Self::Text(s) => !s.is_empty() && s != "0",
            Self::Blob(b) => !b.is_empty(),
        }
    }

    /// Converts the value to text. `NULL` has no text form.
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Integer(v) => Some(v.to_string()),
            Self::Real(v) => Some(v.to_string()),
            Self::Text(s) => Some(s),
            Self::Blob(b) => Some(String::from_utf8_lossy(&b).into_owned()),
        }
    }
}

impl From<&str> for ColumnValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}
