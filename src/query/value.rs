//! Scalar values bound to query placeholders.

use std::borrow::Cow;
use std::fmt;

use rusqlite::types::{ToSql, ToSqlOutput};
use serde::Serialize;

/// Typed value bound to a positional placeholder.
///
/// Text is a `Cow` so declared defaults can live in `static` tables while request
/// values own their strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    /// Signed 64-bit integer.
    Integer(i64),
    /// UTF-8 text (dates travel as `YYYY-MM-DD` text).
    Text(Cow<'static, str>),
}

impl SqlValue {
    /// Builds an owned text value.
    pub fn text(value: impl Into<String>) -> Self {
        SqlValue::Text(Cow::Owned(value.into()))
    }

    /// Returns the integer payload, if any.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(v) => Some(*v),
            SqlValue::Text(_) => None,
        }
    }

    /// Returns the text payload, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(v) => Some(v),
            SqlValue::Integer(_) => None,
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Integer(v) => write!(f, "{v}"),
            SqlValue::Text(v) => write!(f, "'{v}'"),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<&'static str> for SqlValue {
    fn from(value: &'static str) -> Self {
        SqlValue::Text(Cow::Borrowed(value))
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            SqlValue::Integer(v) => Ok(ToSqlOutput::from(*v)),
            SqlValue::Text(v) => Ok(ToSqlOutput::from(&**v)),
        }
    }
}
