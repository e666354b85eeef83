//! Query execution against the backing views.

pub mod sqlite;

use std::path::PathBuf;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::query::{PlaceholderStyle, SqlValue};

pub use sqlite::SqliteExecutor;

/// One row of a view, keyed by column name. Passed through unmodified.
pub type ReportRow = Map<String, Value>;

/// Failures raised while executing a query. Never shown to clients.
#[derive(Debug, Error)]
pub enum DataAccessError {
    /// The database file does not exist.
    #[error("database not found: {0}")]
    MissingDatabase(PathBuf),
    /// SQLite reported an error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The SQL text and value count disagree.
    #[error("query has {placeholders} placeholders but {values} values")]
    ArityMismatch { placeholders: usize, values: usize },
    /// The blocking query task panicked or was cancelled.
    #[error("query task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Capability to run a composed query and return its rows.
///
/// Implementations must treat the SQL as read-only and bind `values` to
/// placeholders strictly left to right.
pub trait QueryExecutor: Send + Sync + 'static {
    /// Runs `sql` with `values` bound positionally.
    fn execute(&self, sql: &str, values: &[SqlValue]) -> Result<Vec<ReportRow>, DataAccessError>;

    /// Placeholder syntax this backend expects.
    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Positional
    }
}

impl<E: QueryExecutor + ?Sized> QueryExecutor for std::sync::Arc<E> {
    fn execute(&self, sql: &str, values: &[SqlValue]) -> Result<Vec<ReportRow>, DataAccessError> {
        (**self).execute(sql, values)
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        (**self).placeholder_style()
    }
}
