//! Small-signal stability assessment of an assembled system.

use crate::eigen::{Eigenbasis, eigen_decompose};
use crate::error::StabilityResult;
use crate::modes::{Mode, mode_table};
use crate::participation::participation_factors;
use crate::plot::{LogSink, PlotSink, SDomainPlot};
use crate::verdict::{Verdict, classify};
use gd_dae::DaeSystem;
use gd_linear::{LinearizeOptions, linearize_at};
use nalgebra::DMatrix;
use num_complex::Complex64;
use tracing::info;

/// Options for stability analysis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StabilityOptions {
    /// Real parts within this distance of 0 count as zero.
    pub zero_tolerance: f64,
    /// Iteration cap of the Schur decomposition.
    pub max_schur_iterations: usize,
    /// Largest accepted eigen-pair residual `‖A·v − λ·v‖ / max(1, max|a_ij|)`,
    /// also the reciprocal condition of `V` below which the eigenbasis counts
    /// as defective.
    pub defect_tolerance: f64,
    /// Damping ratio of the plot guide line.
    pub plot_damping_ratio: f64,
    pub linearize: LinearizeOptions,
}

impl Default for StabilityOptions {
    fn default() -> Self {
        Self {
            zero_tolerance: 1e-8,
            max_schur_iterations: 10_000,
            defect_tolerance: 1e-6,
            plot_damping_ratio: 0.05,
            linearize: LinearizeOptions::default(),
        }
    }
}

impl StabilityOptions {
    pub fn with_zero_tolerance(mut self, tol: f64) -> Self {
        self.zero_tolerance = tol;
        self
    }

    pub fn with_linearize(mut self, linearize: LinearizeOptions) -> Self {
        self.linearize = linearize;
        self
    }
}

/// Modal analysis of one state matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct ModalAnalysis {
    pub verdict: Verdict,
    pub eigenvalues: Vec<Complex64>,
    /// Rows are states, columns are modes.
    pub participation: DMatrix<f64>,
    pub right: DMatrix<Complex64>,
    pub left: DMatrix<Complex64>,
    /// With [`Eigenbasis::Defective`] the participation factors come from the
    /// pseudo-inverse of `V`; eigenvalues and verdict are unaffected.
    pub basis: Eigenbasis,
    pub modes: Vec<Mode>,
}

pub fn analyze_state_matrix(
    a: &DMatrix<f64>,
    options: &StabilityOptions,
) -> StabilityResult<ModalAnalysis> {
    let eig = eigen_decompose(a, options.max_schur_iterations, options.defect_tolerance)?;
    let participation = participation_factors(&eig.right, &eig.left);
    let verdict = classify(&eig.values, options.zero_tolerance);
    let modes = mode_table(&eig.values, &participation, options.zero_tolerance);
    Ok(ModalAnalysis {
        verdict,
        eigenvalues: eig.values,
        participation,
        right: eig.right,
        left: eig.left,
        basis: eig.basis,
        modes,
    })
}

/// Result of [`run_small_signal_stability`].
#[derive(Clone, Debug, PartialEq)]
pub struct SmallSignalResult {
    pub verdict: Verdict,
    pub eigenvalues: Vec<Complex64>,
    pub participation: DMatrix<f64>,
    pub basis: Eigenbasis,
    pub modes: Vec<Mode>,
    /// `block.variable` names of the participation rows.
    pub state_names: Vec<String>,
    pub a: DMatrix<f64>,
}

/// Linearize at `(z, params)` and analyze. With `plot`, the eigenvalues are
/// also handed to the logging sink.
pub fn run_small_signal_stability(
    system: &DaeSystem,
    z: &[f64],
    params: &[f64],
    plot: bool,
) -> StabilityResult<SmallSignalResult> {
    let mut log = LogSink;
    let sink: Option<&mut dyn PlotSink> = if plot { Some(&mut log) } else { None };
    run_small_signal_stability_with(system, z, params, &StabilityOptions::default(), sink)
}

pub fn run_small_signal_stability_with(
    system: &DaeSystem,
    z: &[f64],
    params: &[f64],
    options: &StabilityOptions,
    plot: Option<&mut dyn PlotSink>,
) -> StabilityResult<SmallSignalResult> {
    let lin = linearize_at(system, z, params, &options.linearize)?;
    let modal = analyze_state_matrix(&lin.a, options)?;

    let state_names = (0..system.n_x())
        .map(|i| system.registry().qualified_name(i).unwrap_or_default())
        .collect();

    info!(
        verdict = %modal.verdict,
        modes = modal.eigenvalues.len(),
        basis = ?modal.basis,
        "small-signal stability assessed"
    );
    if let Some(sink) = plot {
        sink.render(&SDomainPlot::new(&modal.eigenvalues, options.plot_damping_ratio));
    }

    Ok(SmallSignalResult {
        verdict: modal.verdict,
        eigenvalues: modal.eigenvalues,
        participation: modal.participation,
        basis: modal.basis,
        modes: modal.modes,
        state_names,
        a: lin.a,
    })
}
