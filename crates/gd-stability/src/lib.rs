//! Small-signal stability analysis.
//!
//! Given a state matrix `A` (usually from `gd-linear`), computes eigenvalues
//! with right and left eigenvectors, classifies stability and relates every
//! state variable to every mode through normalized participation factors.
//!
//! Conventions:
//! - modes are sorted by descending `|λ|`, then descending real part, then
//!   descending imaginary part
//! - `PF[k, i] = |W[i, k] · V[k, i]|` with every mode column summing to 1
//! - a real part within `zero_tolerance` of 0 counts as zero for the verdict
//! - a defective state matrix still gets eigenvalues and a verdict; its left
//!   eigenvectors are the pseudo-inverse of the right ones

pub mod analysis;
pub mod eigen;
pub mod error;
pub mod modes;
pub mod participation;
pub mod plot;
pub mod verdict;

pub use analysis::{
    ModalAnalysis, SmallSignalResult, StabilityOptions, analyze_state_matrix,
    run_small_signal_stability, run_small_signal_stability_with,
};
pub use eigen::{EigenDecomposition, Eigenbasis, eigen_decompose, eigenvalues};
pub use error::{StabilityError, StabilityResult};
pub use modes::{Mode, mode_table};
pub use participation::participation_factors;
pub use plot::{LogSink, PlotPoint, PlotSink, SDomainPlot};
pub use verdict::{Verdict, classify};
