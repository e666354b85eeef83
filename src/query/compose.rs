//! Predicate composition: validated parameters to parameterized SQL.
//!
//! Placeholders are only ever emitted together with their value, so the
//! placeholder count always equals the value count and both follow the final
//! clause order.

use serde::Serialize;
use thiserror::Error;

use crate::query::{SqlValue, ValidatedParams};
use crate::report::{ParamRole, ReportKind, ReportQuerySpec};

/// How placeholders are rendered in the SQL text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderStyle {
    /// Anonymous `?` (SQLite and most drivers).
    #[default]
    Positional,
    /// `$1`, `$2`, ... numbered in final clause order (PostgreSQL).
    Numbered,
}

/// Internal invariant violations; never produced for output of [`crate::validate`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComposeError {
    /// Parameters were validated for a different report.
    #[error("parameters validated for report {found} cannot compose report {expected}")]
    KindMismatch {
        expected: ReportKind,
        found: ReportKind,
    },
    /// A paginated report is missing its limit or offset value.
    #[error("report {kind} is missing pagination value '{param}'")]
    MissingPagination {
        kind: ReportKind,
        param: &'static str,
    },
}

/// Final SQL text plus the values its placeholders consume, left to right.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QueryPlan {
    sql: String,
    values: Vec<SqlValue>,
    clauses: usize,
}

impl QueryPlan {
    /// Assembled SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Ordered placeholder values.
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Number of filter predicates in the `WHERE` clause.
    pub fn filter_count(&self) -> usize {
        self.clauses
    }

    /// Splits the plan into its SQL text and values.
    pub fn into_parts(self) -> (String, Vec<SqlValue>) {
        (self.sql, self.values)
    }
}

/// Ordered accumulator of `(predicate, value)` pairs.
///
/// Scoped to one compose call; clauses render in push order.
#[derive(Debug)]
pub struct PredicateBuilder {
    style: PlaceholderStyle,
    clauses: Vec<String>,
    values: Vec<SqlValue>,
}

impl PredicateBuilder {
    /// Creates an empty builder.
    pub fn new(style: PlaceholderStyle) -> Self {
        Self {
            style,
            clauses: Vec::new(),
            values: Vec::new(),
        }
    }

    fn placeholder(&mut self, value: SqlValue) -> String {
        self.values.push(value);
        match self.style {
            PlaceholderStyle::Positional => "?".to_string(),
            PlaceholderStyle::Numbered => format!("${}", self.values.len()),
        }
    }

    /// Appends `column op <placeholder>` bound to `value`.
    pub fn push(&mut self, column: &str, op: &str, value: SqlValue) {
        let placeholder = self.placeholder(value);
        self.clauses.push(format!("{column} {op} {placeholder}"));
    }

    /// Number of predicates pushed so far.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Whether no predicate was pushed.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Renders `SELECT ... FROM view [WHERE ...] ORDER BY ... [LIMIT ? OFFSET ?]`.
    pub fn finish(
        mut self,
        spec: &ReportQuerySpec,
        pagination: Option<(SqlValue, SqlValue)>,
    ) -> QueryPlan {
        let mut sql = format!("SELECT {} FROM {}", spec.columns.join(", "), spec.view);
        if !self.clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(spec.order_by);
        if let Some((limit, offset)) = pagination {
            let limit = self.placeholder(limit);
            let offset = self.placeholder(offset);
            sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));
        }
        QueryPlan {
            sql,
            values: self.values,
            clauses: self.clauses.len(),
        }
    }
}

/// Composes the query for `kind` with anonymous `?` placeholders.
pub fn compose(kind: ReportKind, validated: &ValidatedParams) -> Result<QueryPlan, ComposeError> {
    compose_with(kind, validated, PlaceholderStyle::Positional)
}

/// Composes the query for `kind` using the given placeholder style.
///
/// Filters are appended in declaration order, not the order the
/// caller supplied them; `LIMIT` and `OFFSET` always come last.
pub fn compose_with(
    kind: ReportKind,
    validated: &ValidatedParams,
    style: PlaceholderStyle,
) -> Result<QueryPlan, ComposeError> {
    if validated.kind() != kind {
        return Err(ComposeError::KindMismatch {
            expected: kind,
            found: validated.kind(),
        });
    }
    let spec = kind.spec();
    let mut builder = PredicateBuilder::new(style);
    for (param, column, op) in spec.filters() {
        if let Some(value) = validated.value(param.name) {
            builder.push(column, op.as_sql(), value.clone());
        }
    }
    let pagination = if spec.is_paginated() {
        Some((
            pagination_value(spec, validated, ParamRole::Limit, "limit")?,
            pagination_value(spec, validated, ParamRole::Offset, "offset")?,
        ))
    } else {
        None
    };
    Ok(builder.finish(spec, pagination))
}

fn pagination_value(
    spec: &ReportQuerySpec,
    validated: &ValidatedParams,
    role: ParamRole,
    label: &'static str,
) -> Result<SqlValue, ComposeError> {
    spec.params
        .iter()
        .find(|p| p.role == role)
        .and_then(|p| validated.value(p.name))
        .cloned()
        .ok_or(ComposeError::MissingPagination {
            kind: spec.kind,
            param: label,
        })
}
