//! Error types for the gd-app service layer.

use std::path::PathBuf;

/// Application error type wrapping the backend crates' errors for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Case error: {0}")]
    Case(String),

    #[error("Failed to read case file: {path}")]
    CaseFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Model error: {0}")]
    Model(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Stability analysis error: {0}")]
    Stability(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for gd-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<gd_project::ProjectError> for AppError {
    fn from(err: gd_project::ProjectError) -> Self {
        match err {
            gd_project::ProjectError::Dae(e) => e.into(),
            other => AppError::Case(other.to_string()),
        }
    }
}

impl From<gd_dae::DaeError> for AppError {
    fn from(err: gd_dae::DaeError) -> Self {
        AppError::Model(err.to_string())
    }
}

impl From<gd_sim::SimError> for AppError {
    fn from(err: gd_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

impl From<gd_stability::StabilityError> for AppError {
    fn from(err: gd_stability::StabilityError) -> Self {
        AppError::Stability(err.to_string())
    }
}
