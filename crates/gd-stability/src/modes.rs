//! Per-mode summaries for reports.

use nalgebra::DMatrix;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mode {
    pub index: usize,
    pub real: f64,
    pub imag: f64,
    /// `ζ = −σ / |λ|`; `None` for λ = 0.
    pub damping_ratio: Option<f64>,
    /// `ω / 2π` in Hz; `None` for real eigenvalues.
    pub frequency_hz: Option<f64>,
    /// Row of the largest participation factor in this mode.
    pub dominant_state: usize,
    pub dominant_participation: f64,
}

impl Mode {
    pub fn eigenvalue(&self) -> Complex64 {
        Complex64::new(self.real, self.imag)
    }

    pub fn is_oscillatory(&self) -> bool {
        self.frequency_hz.is_some()
    }
}

/// One [`Mode`] per eigenvalue, in the eigenvalue order.
pub fn mode_table(
    eigenvalues: &[Complex64],
    participation: &DMatrix<f64>,
    zero_tolerance: f64,
) -> Vec<Mode> {
    eigenvalues
        .iter()
        .enumerate()
        .map(|(i, l)| {
            let magnitude = l.norm();
            let (dominant_state, dominant_participation) = participation
                .column(i)
                .iter()
                .copied()
                .enumerate()
                .fold((0, f64::NEG_INFINITY), |best, (k, p)| {
                    if p > best.1 { (k, p) } else { best }
                });
            Mode {
                index: i,
                real: l.re,
                imag: l.im,
                damping_ratio: (magnitude > 0.0).then(|| -l.re / magnitude),
                frequency_hz: (l.im.abs() > zero_tolerance).then(|| l.im / TAU),
                dominant_state,
                dominant_participation,
            }
        })
        .collect()
}
