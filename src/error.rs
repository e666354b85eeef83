use thiserror::Error;

use crate::executor::DataAccessError;
use crate::query::{ComposeError, ValidationError};

/// Result alias for the request path.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Everything that can abort a report request.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Malformed, out-of-range or unknown-enum input.
    #[error("invalid parameters: {0}")]
    Validation(#[from] ValidationError),
    /// The report identifier does not exist.
    #[error("report not found")]
    NotFound,
    /// Composition invariant violated.
    #[error(transparent)]
    Compose(#[from] ComposeError),
    /// The executor failed.
    #[error(transparent)]
    DataAccess(#[from] DataAccessError),
}

impl ReportError {
    /// HTTP-equivalent status code.
    pub fn status(&self) -> u16 {
        match self {
            ReportError::Validation(_) => 400,
            ReportError::NotFound => 404,
            ReportError::Compose(_) | ReportError::DataAccess(_) => 500,
        }
    }

    /// Generic message safe to show to clients.
    pub fn public_message(&self) -> &'static str {
        match self {
            ReportError::Validation(_) => "Parámetros inválidos",
            ReportError::NotFound => "Reporte no encontrado",
            ReportError::Compose(_) | ReportError::DataAccess(_) => "Error interno del servidor",
        }
    }
}
