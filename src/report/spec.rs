//! Declarative parameter contracts for report queries.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::query::validate::is_calendar_date;
use crate::query::SqlValue;
use crate::report::ReportKind;

/// Comparison applied by a filter predicate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FilterOp {
    /// `column = ?`
    Eq,
    /// `column >= ?`
    Gte,
    /// `column <= ?`
    Lte,
}

impl FilterOp {
    /// SQL operator token.
    pub fn as_sql(self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Gte => ">=",
            FilterOp::Lte => "<=",
        }
    }
}

/// Accepted type and bounds of a parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParamKind {
    /// Base-10 integer within `[min, max]` (inclusive; `None` is unbounded).
    Integer {
        /// Lower bound.
        min: Option<i64>,
        /// Upper bound.
        max: Option<i64>,
    },
    /// Calendar date written as `YYYY-MM-DD`.
    Date,
    /// Case-sensitive member of a fixed set.
    Enum(&'static [&'static str]),
}

impl ParamKind {
    /// Short type name used by the report catalog.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamKind::Integer { .. } => "integer",
            ParamKind::Date => "date",
            ParamKind::Enum(_) => "enum",
        }
    }

    /// Returns true when `value` has this kind's type and satisfies its bounds.
    pub fn admits(&self, value: &SqlValue) -> bool {
        match (self, value) {
            (ParamKind::Integer { min, max }, SqlValue::Integer(v)) => {
                min.map_or(true, |lo| *v >= lo) && max.map_or(true, |hi| *v <= hi)
            }
            (ParamKind::Date, SqlValue::Text(text)) => is_calendar_date(text),
            (ParamKind::Enum(allowed), SqlValue::Text(text)) => allowed.contains(&text.as_ref()),
            _ => false,
        }
    }
}

/// What the composer does with a validated parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParamRole {
    /// Appends `column op ?` when the parameter is provided.
    Filter {
        /// View column the predicate tests.
        column: &'static str,
        /// Comparison operator.
        op: FilterOp,
    },
    /// Bound to the `LIMIT` placeholder.
    Limit,
    /// Bound to the `OFFSET` placeholder.
    Offset,
}

/// Contract for a single named parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamSpec {
    /// Query-string key.
    pub name: &'static str,
    /// Type and bounds.
    pub kind: ParamKind,
    /// Whether absence without a default is an error.
    pub required: bool,
    /// Value used when the parameter is not provided.
    pub default: Option<SqlValue>,
    /// How the composer uses the value.
    pub role: ParamRole,
}

/// Static description of one report: the view it reads and the parameters it accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportQuerySpec {
    /// Report identifier.
    pub kind: ReportKind,
    /// Backing view.
    pub view: &'static str,
    /// Output columns, in order.
    pub columns: &'static [&'static str],
    /// `ORDER BY` body, e.g. `posicion ASC`.
    pub order_by: &'static str,
    /// Accepted parameters in declaration order. Filter predicates are
    /// appended in this order.
    pub params: Vec<ParamSpec>,
}

/// Violations of the spec table's own invariants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// Two parameters share a name.
    #[error("report {kind}: duplicate parameter '{name}'")]
    DuplicateParam { kind: ReportKind, name: &'static str },
    /// A default fails its own parameter's bounds.
    #[error("report {kind}: default for '{name}' violates its bounds")]
    DefaultOutOfBounds { kind: ReportKind, name: &'static str },
    /// Only one of limit/offset was declared, or one was declared twice.
    #[error("report {kind}: pagination requires exactly one limit and one offset")]
    UnpairedPagination { kind: ReportKind },
    /// Pagination parameters need a default.
    #[error("report {kind}: pagination parameter '{name}' has no default")]
    PaginationWithoutDefault { kind: ReportKind, name: &'static str },
}

impl ReportQuerySpec {
    /// Returns the parameter with the given name.
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Filter parameters in declaration order.
    pub fn filters(&self) -> impl Iterator<Item = (&ParamSpec, &'static str, FilterOp)> {
        self.params.iter().filter_map(|p| match p.role {
            ParamRole::Filter { column, op } => Some((p, column, op)),
            _ => None,
        })
    }

    /// Whether the report appends `LIMIT ? OFFSET ?`.
    pub fn is_paginated(&self) -> bool {
        self.params.iter().any(|p| p.role == ParamRole::Limit)
    }

    /// Checks name uniqueness, default bounds and pagination pairing.
    pub fn check(&self) -> Result<(), SpecError> {
        let kind = self.kind;
        let mut seen = HashSet::new();
        let mut limits = 0;
        let mut offsets = 0;
        for param in &self.params {
            if !seen.insert(param.name) {
                return Err(SpecError::DuplicateParam {
                    kind,
                    name: param.name,
                });
            }
            if let Some(default) = &param.default {
                if !param.kind.admits(default) {
                    return Err(SpecError::DefaultOutOfBounds {
                        kind,
                        name: param.name,
                    });
                }
            }
            match param.role {
                ParamRole::Limit => limits += 1,
                ParamRole::Offset => offsets += 1,
                ParamRole::Filter { .. } => continue,
            }
            if param.default.is_none() {
                return Err(SpecError::PaginationWithoutDefault {
                    kind,
                    name: param.name,
                });
            }
        }
        if (limits, offsets) != (0, 0) && (limits, offsets) != (1, 1) {
            return Err(SpecError::UnpairedPagination { kind });
        }
        Ok(())
    }
}

/// Catalog view of a parameter.
#[derive(Clone, Debug, Serialize)]
pub struct ParamDescriptor {
    /// Query-string key.
    pub name: &'static str,
    /// `integer`, `date` or `enum`.
    #[serde(rename = "type")]
    pub type_name: &'static str,
    /// Whether the parameter must be supplied.
    pub required: bool,
    /// Default value, if any.
    pub default: Option<SqlValue>,
    /// Inclusive lower bound for integers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    /// Inclusive upper bound for integers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    /// Allowed values for enums.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed: Option<&'static [&'static str]>,
}

impl From<&ParamSpec> for ParamDescriptor {
    fn from(spec: &ParamSpec) -> Self {
        let (min, max) = match spec.kind {
            ParamKind::Integer { min, max } => (min, max),
            _ => (None, None),
        };
        let allowed = match spec.kind {
            ParamKind::Enum(values) => Some(values),
            _ => None,
        };
        Self {
            name: spec.name,
            type_name: spec.kind.type_name(),
            required: spec.required,
            default: spec.default.clone(),
            min,
            max,
            allowed,
        }
    }
}

pub(crate) fn limit_param() -> ParamSpec {
    ParamSpec {
        name: "limit",
        kind: ParamKind::Integer {
            min: Some(1),
            max: Some(100),
        },
        required: false,
        default: Some(SqlValue::Integer(10)),
        role: ParamRole::Limit,
    }
}

pub(crate) fn offset_param() -> ParamSpec {
    ParamSpec {
        name: "offset",
        kind: ParamKind::Integer {
            min: Some(0),
            max: None,
        },
        required: false,
        default: Some(SqlValue::Integer(0)),
        role: ParamRole::Offset,
    }
}

pub(crate) fn filter_param(
    name: &'static str,
    kind: ParamKind,
    column: &'static str,
    op: FilterOp,
) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        required: false,
        default: None,
        role: ParamRole::Filter { column, op },
    }
}
