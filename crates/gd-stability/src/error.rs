//! Error types for stability analysis.

use gd_linear::LinearError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StabilityError {
    #[error("Schur decomposition did not converge within {max_iterations} iterations")]
    EigenDecompositionFailed { max_iterations: usize },

    #[error("Inverse iteration found no eigenvector for mode {mode}")]
    EigenvectorFailed { mode: usize },

    #[error("Left eigenvectors unavailable: {0}")]
    LeftEigenvectors(&'static str),

    #[error("State matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("State matrix contains non-finite entries")]
    NonFinite,

    #[error(transparent)]
    Linear(#[from] LinearError),
}

pub type StabilityResult<T> = Result<T, StabilityError>;
