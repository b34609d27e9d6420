//! Error types for linearization.

use gd_core::VarId;
use gd_dae::DaeError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinearError {
    #[error("Singular algebraic Jacobian gy (pivot ratio {pivot_ratio:e})")]
    SingularAlgebraicJacobian { pivot_ratio: f64 },

    #[error("Time constant of state '{state}' is {value}, not invertible")]
    NonInvertibleTimeConstant { state: String, value: f64 },

    #[error("'{0}' is not a parameter and cannot be an input")]
    UnknownInput(VarId),

    #[error("'{0}' is not a state or algebraic variable and cannot be an output")]
    UnknownOutput(VarId),

    #[error(transparent)]
    Dae(#[from] DaeError),
}

pub type LinearResult<T> = Result<T, LinearError>;
