//! Report gateway: identifier lookup, validation, composition and execution.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error};

use crate::error::{ReportError, Result};
use crate::executor::{QueryExecutor, ReportRow};
use crate::query::{compose_with, validate, QueryPlan, RawInput};
use crate::report::ReportKind;

/// Resolves a textual identifier (`"1"`..`"5"`).
pub fn resolve(id: &str) -> Result<ReportKind> {
    id.parse().map_err(|_| ReportError::NotFound)
}

/// Success body of a report request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReportResponse {
    /// Rows exactly as returned by the view.
    pub data: Vec<ReportRow>,
}

/// Routes a request for a report identifier through the query pipeline.
///
/// Holds no per-request state; cloning shares the executor.
pub struct ReportGateway<E> {
    executor: Arc<E>,
}

impl<E> Clone for ReportGateway<E> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
        }
    }
}

impl<E: QueryExecutor> ReportGateway<E> {
    /// Wraps an executor.
    pub fn new(executor: E) -> Self {
        Self {
            executor: Arc::new(executor),
        }
    }

    /// Shared executor handle.
    pub fn executor(&self) -> &Arc<E> {
        &self.executor
    }

    /// Validates and composes without executing.
    pub fn plan(&self, kind: ReportKind, raw: &RawInput) -> Result<QueryPlan> {
        let validated = validate(kind.spec(), raw).map_err(|err| {
            debug!(report = %kind, param = err.param(), "rejected report parameters");
            err
        })?;
        let plan = compose_with(kind, &validated, self.executor.placeholder_style())?;
        debug!(
            report = %kind,
            sql = plan.sql(),
            values = plan.values().len(),
            "composed report query"
        );
        Ok(plan)
    }

    /// Runs the full pipeline for `kind`.
    pub fn run(&self, kind: ReportKind, raw: &RawInput) -> Result<ReportResponse> {
        let plan = self.plan(kind, raw)?;
        let data = self
            .executor
            .execute(plan.sql(), plan.values())
            .map_err(|err| {
                error!(report = %kind, error = %err, "report query failed");
                err
            })?;
        Ok(ReportResponse { data })
    }

    /// Runs the pipeline for a textual identifier.
    pub fn handle(&self, id: &str, raw: &RawInput) -> Result<ReportResponse> {
        let kind = resolve(id)?;
        self.run(kind, raw)
    }
}
