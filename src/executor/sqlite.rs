//! SQLite executor opening the report database read-only per query.

use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::Engine;
use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection, OpenFlags, Row};
use serde_json::{Number, Value};

use super::{DataAccessError, QueryExecutor, ReportRow};
use crate::query::SqlValue;

/// Default time SQLite waits on a locked database.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Executes report queries against a SQLite database holding the views.
#[derive(Clone, Debug)]
pub struct SqliteExecutor {
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteExecutor {
    /// Creates an executor for the database at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Overrides the busy timeout.
    #[must_use]
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Database path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Connection, DataAccessError> {
        if !self.path.exists() {
            return Err(DataAccessError::MissingDatabase(self.path.clone()));
        }
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&self.path, flags)?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }
}

impl QueryExecutor for SqliteExecutor {
    fn execute(&self, sql: &str, values: &[SqlValue]) -> Result<Vec<ReportRow>, DataAccessError> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(sql)?;
        let placeholders = stmt.parameter_count();
        if placeholders != values.len() {
            return Err(DataAccessError::ArityMismatch {
                placeholders,
                values: values.len(),
            });
        }
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.query(params_from_iter(values.iter()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(row_to_json(&columns, row)?);
        }
        Ok(out)
    }
}

fn row_to_json(columns: &[String], row: &Row<'_>) -> rusqlite::Result<ReportRow> {
    let mut map = ReportRow::new();
    for (idx, name) in columns.iter().enumerate() {
        map.insert(name.clone(), value_to_json(row.get_ref(idx)?));
    }
    Ok(map)
}

fn value_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Number(Number::from(v)),
        ValueRef::Real(v) => Number::from_f64(v).map_or(Value::Null, Value::Number),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => {
            Value::String(base64::engine::general_purpose::STANDARD.encode(bytes))
        }
    }
}
