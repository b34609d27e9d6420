//! Device modelling errors.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeviceError {
    #[error("Invalid parameter for {device}: {what}")]
    InvalidParameter { device: String, what: &'static str },

    #[error("Unknown bus '{0}'")]
    UnknownBus(String),

    #[error("Duplicate device name '{0}'")]
    DuplicateName(String),

    #[error("Bus '{bus}' has no voltage in the operating point")]
    MissingVoltage { bus: String },

    #[error("Bus '{bus}' is unbalanced without a generator (P = {p:e}, Q = {q:e})")]
    BusMismatch { bus: String, p: f64, q: f64 },

    #[error("Bus '{bus}' has {count} generators; injections cannot be apportioned")]
    MultipleGenerators { bus: String, count: usize },
}

pub type DeviceResult<T> = Result<T, DeviceError>;
