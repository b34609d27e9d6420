//! Error types for solver operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Newton did not converge in {iterations} iterations (residual {residual_norm:e})")]
    DidNotConverge {
        iterations: usize,
        residual_norm: f64,
    },

    #[error("Singular Newton matrix at iteration {iteration} (residual {residual_norm:e})")]
    SingularJacobian {
        iteration: usize,
        residual_norm: f64,
    },

    /// `residual_norm` is the last finite residual norm seen, NaN if none was.
    #[error("Non-finite {what} at iteration {iteration} (last residual {residual_norm:e})")]
    NonFinite {
        what: &'static str,
        iteration: usize,
        residual_norm: f64,
    },

    #[error("Dimension mismatch: residual has {residual} entries, unknowns {unknowns}")]
    Dimension { residual: usize, unknowns: usize },

    #[error("Evaluation failed: {what}")]
    Evaluation { what: String },
}

impl SolverError {
    /// Residual norm at the point of failure, for iteration errors.
    pub fn residual_norm(&self) -> Option<f64> {
        match self {
            SolverError::DidNotConverge { residual_norm, .. }
            | SolverError::SingularJacobian { residual_norm, .. }
            | SolverError::NonFinite { residual_norm, .. } => Some(*residual_norm),
            SolverError::Dimension { .. } | SolverError::Evaluation { .. } => None,
        }
    }
}

pub type SolverResult<T> = Result<T, SolverError>;
