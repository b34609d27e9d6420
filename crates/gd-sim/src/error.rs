//! Error types for simulation operations.

use gd_core::VarId;
use gd_dae::DaeError;
use gd_solver::SolverError;
use thiserror::Error;

/// Errors encountered during transient simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid step configuration: {what}")]
    InvalidStep { what: &'static str },

    #[error("Invalid event on '{target}': {what}")]
    InvalidEvent { target: VarId, what: &'static str },

    #[error("Newton diverged at step {step} (t = {time}), residual {residual_norm:e}: {source}")]
    DivergedNewton {
        step: usize,
        time: f64,
        residual_norm: f64,
        source: SolverError,
    },

    #[error("Unknown integration method '{0}'")]
    UnknownMethod(String),

    #[error(transparent)]
    Dae(#[from] DaeError),

    #[error(transparent)]
    Solver(#[from] SolverError),
}

pub type SimResult<T> = Result<T, SimError>;
