//! Shared application service layer for gridyn.
//!
//! Front ends go through this crate to load cases, run RMS simulations and
//! small-signal assessments, and render result tables.

pub mod batch;
pub mod case_service;
pub mod error;
pub mod rms;
pub mod small_signal;
pub mod tables;
pub mod timing;

pub use batch::{Scenario, run_batch};
pub use case_service::{CaseSummary, load_case, prepare_case, summarize_case};
pub use error::{AppError, AppResult};
pub use rms::{RmsOptions, RmsResponse, RmsSimulationDriver};
pub use small_signal::{SmallSignalDriver, SmallSignalOptions, SmallSignalResponse};
pub use tables::{modes_table, participation_table, trajectory_csv, write_trajectory_csv};
pub use timing::RunTiming;
