//! Vista: read-only reporting dashboard over precomputed SQL views.
//!
//! Each report accepts a handful of query-string parameters. Requests flow
//! through [`query::validate`], then [`query::compose`], then a
//! [`executor::QueryExecutor`], and the resulting rows are served as JSON by
//! the [`dashboard`] HTTP surface.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod dashboard;
pub mod demo;
pub mod error;
pub mod executor;
pub mod gateway;
pub mod query;
pub mod report;

pub use error::ReportError;
pub use gateway::ReportGateway;
pub use query::{compose, validate, QueryPlan, RawInput, ValidatedParams};
pub use report::ReportKind;
