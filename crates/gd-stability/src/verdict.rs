//! Stability verdict from eigenvalue real parts.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Every real part strictly negative.
    AsymptoticallyStable,
    /// No positive real part, at least one zero.
    MarginallyStable,
    /// At least one positive real part.
    Unstable,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::AsymptoticallyStable => "asymptotically stable",
            Verdict::MarginallyStable => "marginally stable",
            Verdict::Unstable => "unstable",
        })
    }
}

/// Classify with `|re| ≤ zero_tolerance` treated as zero.
pub fn classify(eigenvalues: &[Complex64], zero_tolerance: f64) -> Verdict {
    if eigenvalues.iter().any(|l| l.re > zero_tolerance) {
        Verdict::Unstable
    } else if eigenvalues.iter().any(|l| l.re >= -zero_tolerance) {
        Verdict::MarginallyStable
    } else {
        Verdict::AsymptoticallyStable
    }
}
