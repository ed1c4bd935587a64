//! Statements with named placeholders.
//!
//! Query templates are written by administrators and stay opaque: the only
//! structure extracted from them is the list of `:name` placeholders. Drivers
//! render the template in their own positional syntax and bind the values in
//! placeholder order.
//!
//! Literals follow standard SQL quoting: a quote inside a literal is written
//! twice (`'it''s'`). A backslash is an ordinary character, so `ESCAPE '\'`
//! is a complete literal. Templates for MySQL or PostgreSQL `E''` strings
//! that rely on `\'` must use the doubled form instead.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

use crate::error::StorageError;

/// A value bound to a named placeholder.
#[derive(Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Text parameter.
    Text(String),
    /// Integer parameter.
    Integer(i64),
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

// Parameter values may carry credentials or search input; keep them out of logs.
impl fmt::Debug for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(_) => f.write_str("Text(..)"),
            Self::Integer(_) => f.write_str("Integer(..)"),
        }
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Text(Range<usize>),
    Placeholder(usize),
}

/// A prepared statement: a query template plus its named parameters.
#[derive(Clone)]
pub struct Statement {
    sql: String,
    segments: Vec<Segment>,
    placeholders: Vec<String>,
    params: BTreeMap<String, ParamValue>,
}

impl Statement {
    /// Prepares a query template, locating its `:name` placeholders.
    ///
    /// Placeholders are numbered in order of first appearance; a name used
    /// twice refers to the same position. Quoted literals, comments and `::`
    /// casts are skipped.
    pub fn prepare(sql: impl Into<String>) -> Self {
        let sql = sql.into();
        let (segments, placeholders) = scan(&sql);
        Self {
            sql,
            segments,
            placeholders,
            params: BTreeMap::new(),
        }
    }

    /// Binds a value to a named placeholder, replacing any earlier value.
    pub fn bind(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    /// Returns the template as written.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the distinct placeholder names in positional order.
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Returns the value bound to `name`, if any.
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Renders the template with every placeholder replaced by `render(n)`,
    /// where `n` is the 1-based position of the placeholder's name.
    pub fn positional_sql(&self, render: impl Fn(usize) -> String) -> String {
        let mut out = String::with_capacity(self.sql.len());
        for segment in &self.segments {
            match segment {
                Segment::Text(range) => out.push_str(&self.sql[range.clone()]),
                Segment::Placeholder(index) => out.push_str(&render(index + 1)),
            }
        }
        out
    }

    /// Returns bound values in positional order.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Parameter`] if a placeholder has no bound value
    /// or a bound value has no placeholder.
    pub fn ordered_values(&self) -> Result<Vec<&ParamValue>, StorageError> {
        if let Some(unused) = self
            .params
            .keys()
            .find(|&name| !self.placeholders.contains(name))
        {
            return Err(StorageError::Parameter(format!(
                "parameter :{unused} has no placeholder in the statement"
            )));
        }

        self.placeholders
            .iter()
            .map(|name| {
                self.params.get(name).ok_or_else(|| {
                    StorageError::Parameter(format!("no value bound for placeholder :{name}"))
                })
            })
            .collect()
    }
}

impl fmt::Debug for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("sql", &self.sql)
            .field("placeholders", &self.placeholders)
            .field("bound", &self.params.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Returns the index just past the closing `quote`, or the end of input.
///
/// A doubled quote closes the literal and immediately reopens it, so it needs
/// no special case.
fn skip_quoted(bytes: &[u8], open: usize, quote: u8) -> usize {
    bytes[open + 1..]
        .iter()
        .position(|&b| b == quote)
        .map_or(bytes.len(), |pos| open + 1 + pos + 1)
}

fn scan(sql: &str) -> (Vec<Segment>, Vec<String>) {
    let bytes = sql.as_bytes();
    let mut segments = Vec::new();
    let mut placeholders: Vec<String> = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => i = skip_quoted(bytes, i, quote),
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = bytes[i..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(bytes.len(), |pos| i + pos + 1);
            },
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = sql[i + 2..]
                    .find("*/")
                    .map_or(bytes.len(), |pos| i + 2 + pos + 2);
            },
            b':' if bytes.get(i + 1) == Some(&b':') => i += 2,
            b':' if bytes.get(i + 1).is_some_and(|&b| is_ident_start(b)) => {
                let start = i + 1;
                let end = bytes[start..]
                    .iter()
                    .position(|&b| !is_ident_continue(b))
                    .map_or(bytes.len(), |pos| start + pos);

                if text_start < i {
                    segments.push(Segment::Text(text_start..i));
                }

                let name = &sql[start..end];
                let index = match placeholders.iter().position(|p| p == name) {
                    Some(index) => index,
                    None => {
                        placeholders.push(name.to_string());
                        placeholders.len() - 1
                    },
                };
                segments.push(Segment::Placeholder(index));

                i = end;
                text_start = end;
            },
            _ => i += 1,
        }
    }

    if text_start < bytes.len() {
        segments.push(Segment::Text(text_start..bytes.len()));
    }

    (segments, placeholders)
}
