//! Query contract validation: raw query-string input to typed, bounds-checked values.

use time::macros::format_description;
use time::Date;
use thiserror::Error;

use crate::query::{RawInput, SqlValue};
use crate::report::{ParamKind, ParamSpec, ReportKind, ReportQuerySpec};

/// Reasons raw input is rejected.
///
/// Messages name the parameter but never echo the submitted value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required parameter was not provided and has no default.
    #[error("parameter '{param}' is required")]
    Missing { param: &'static str },
    /// The value is not a base-10 integer.
    #[error("parameter '{param}' must be an integer")]
    NotAnInteger { param: &'static str },
    /// The integer falls outside the inclusive bounds.
    #[error("parameter '{param}' is out of range")]
    OutOfRange {
        param: &'static str,
        min: Option<i64>,
        max: Option<i64>,
    },
    /// The value does not match the declared format.
    #[error("parameter '{param}' must match {expected}")]
    BadFormat {
        param: &'static str,
        expected: &'static str,
    },
    /// The value is not one of the allowed enum members.
    #[error("parameter '{param}' is not an allowed value")]
    NotAllowed { param: &'static str },
}

impl ValidationError {
    /// Name of the offending parameter.
    pub fn param(&self) -> &'static str {
        match self {
            ValidationError::Missing { param }
            | ValidationError::NotAnInteger { param }
            | ValidationError::OutOfRange { param, .. }
            | ValidationError::BadFormat { param, .. }
            | ValidationError::NotAllowed { param } => param,
        }
    }
}

/// A validated parameter: a typed value, or the explicit "not provided" marker.
///
/// `Absent` is distinct from `0` or `""`: it suppresses the parameter's
/// predicate entirely.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Param {
    /// Value supplied by the caller or taken from its declared default.
    Provided(SqlValue),
    /// Optional parameter left out, with no default.
    Absent,
}

impl Param {
    /// The value, if provided.
    pub fn value(&self) -> Option<&SqlValue> {
        match self {
            Param::Provided(value) => Some(value),
            Param::Absent => None,
        }
    }
}

/// Output of [`validate`]: one entry per declared parameter, in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedParams {
    kind: ReportKind,
    entries: Vec<(&'static str, Param)>,
}

impl ValidatedParams {
    /// Report these parameters were validated against.
    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    /// Validated entry for `name`; `None` when the report does not declare it.
    pub fn get(&self, name: &str) -> Option<&Param> {
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, param)| param)
    }

    /// Provided value for `name`, if any.
    pub fn value(&self, name: &str) -> Option<&SqlValue> {
        self.get(name).and_then(Param::value)
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Param)> {
        self.entries.iter().map(|(name, param)| (*name, param))
    }
}

/// Validates `raw` against `spec`.
///
/// Pure: unknown keys are ignored, declared parameters resolve to a value, a
/// default, or [`Param::Absent`]. The first failing parameter (in declaration
/// order) is reported.
pub fn validate(spec: &ReportQuerySpec, raw: &RawInput) -> Result<ValidatedParams, ValidationError> {
    let entries = spec
        .params
        .iter()
        .map(|param| Ok((param.name, validate_param(param, raw.get(param.name))?)))
        .collect::<Result<Vec<_>, ValidationError>>()?;
    Ok(ValidatedParams {
        kind: spec.kind,
        entries,
    })
}

fn validate_param(spec: &ParamSpec, raw: Option<&str>) -> Result<Param, ValidationError> {
    // Blank filters count as not provided; blank pagination values still parse (and fail).
    let raw = raw.filter(|value| !(value.is_empty() && spec.default.is_none()));
    let Some(raw) = raw else {
        return match (&spec.default, spec.required) {
            (Some(default), _) => Ok(Param::Provided(default.clone())),
            (None, true) => Err(ValidationError::Missing { param: spec.name }),
            (None, false) => Ok(Param::Absent),
        };
    };
    coerce(spec, raw).map(Param::Provided)
}

fn coerce(spec: &ParamSpec, raw: &str) -> Result<SqlValue, ValidationError> {
    let param = spec.name;
    match spec.kind {
        ParamKind::Integer { min, max } => {
            let value = raw
                .parse::<i64>()
                .map_err(|_| ValidationError::NotAnInteger { param })?;
            let below = min.is_some_and(|lo| value < lo);
            let above = max.is_some_and(|hi| value > hi);
            if below || above {
                return Err(ValidationError::OutOfRange { param, min, max });
            }
            Ok(SqlValue::Integer(value))
        }
        ParamKind::Date => {
            if !is_calendar_date(raw) {
                return Err(ValidationError::BadFormat {
                    param,
                    expected: "YYYY-MM-DD",
                });
            }
            Ok(SqlValue::text(raw))
        }
        ParamKind::Enum(allowed) => allowed
            .iter()
            .find(|candidate| **candidate == raw)
            .map(|member| SqlValue::from(*member))
            .ok_or(ValidationError::NotAllowed { param }),
    }
}

/// True when `text` is exactly `YYYY-MM-DD` and names a real calendar date.
pub fn is_calendar_date(text: &str) -> bool {
    let bytes = text.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(idx, b)| match idx {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    shaped && Date::parse(text, format_description!("[year]-[month]-[day]")).is_ok()
}
