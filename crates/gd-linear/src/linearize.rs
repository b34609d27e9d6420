//! Jacobian evaluation and algebraic elimination.

use crate::error::{LinearError, LinearResult};
use gd_dae::DaeSystem;
use nalgebra::{DMatrix, DVector, LU, Dyn};
use tracing::{debug, warn};

/// Options for linearization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearizeOptions {
    /// `gy` is singular when `min|u_ii| ≤ singular_threshold · max|u_ii|` in its LU.
    pub singular_threshold: f64,
    /// Pivot ratios below this (but above the singular threshold) are logged.
    pub warn_threshold: f64,
}

impl Default for LinearizeOptions {
    fn default() -> Self {
        Self {
            singular_threshold: 1e-12,
            warn_threshold: 1e-8,
        }
    }
}

impl LinearizeOptions {
    pub fn with_singular_threshold(mut self, threshold: f64) -> Self {
        self.singular_threshold = threshold;
        self
    }
}

/// State matrix plus the Jacobian blocks it was reduced from.
#[derive(Clone, Debug, PartialEq)]
pub struct Linearization {
    pub a: DMatrix<f64>,
    pub fx: DMatrix<f64>,
    pub fy: DMatrix<f64>,
    pub gx: DMatrix<f64>,
    pub gy: DMatrix<f64>,
    /// Diagonal of `T`.
    pub t: DVector<f64>,
}

/// Linearize at `(x, y, params)` with default options.
pub fn linearize(
    system: &DaeSystem,
    x: &[f64],
    y: &[f64],
    params: &[f64],
) -> LinearResult<Linearization> {
    let z = system.join(x, y)?;
    linearize_at(system, z.as_slice(), params, &LinearizeOptions::default())
}

/// Linearize at a combined point `z = [x; y]`.
pub fn linearize_at(
    system: &DaeSystem,
    z: &[f64],
    params: &[f64],
    options: &LinearizeOptions,
) -> LinearResult<Linearization> {
    let t = time_constants(system, params)?;
    let j = system.jacobians(z, params)?;

    let reduced = if system.n_y() == 0 {
        j.fx.clone()
    } else {
        let lu = factor_gy(&j.gy, options)?;
        let gy_inv_gx = lu
            .solve(&j.gx)
            .ok_or(LinearError::SingularAlgebraicJacobian { pivot_ratio: 0.0 })?;
        &j.fx - &j.fy * gy_inv_gx
    };
    let a = scale_rows_by_inverse(reduced, &t);

    debug!(n_x = system.n_x(), n_y = system.n_y(), "linearized");
    Ok(Linearization {
        a,
        fx: j.fx,
        fy: j.fy,
        gx: j.gx,
        gy: j.gy,
        t,
    })
}

/// `T` diagonal, rejecting zero or non-finite entries.
pub(crate) fn time_constants(system: &DaeSystem, params: &[f64]) -> LinearResult<DVector<f64>> {
    let t = system.eval_t(params)?;
    for (i, &value) in t.iter().enumerate() {
        if value == 0.0 || !value.is_finite() {
            let state = system
                .state_vars()
                .get(i)
                .map(|v| v.name.clone())
                .unwrap_or_default();
            return Err(LinearError::NonInvertibleTimeConstant { state, value });
        }
    }
    Ok(t)
}

/// LU of `gy` with a relative pivot test.
pub(crate) fn factor_gy(
    gy: &DMatrix<f64>,
    options: &LinearizeOptions,
) -> LinearResult<LU<f64, Dyn, Dyn>> {
    let lu = gy.clone().lu();
    let pivots = lu.u().diagonal().map(f64::abs);
    let max = pivots.max();
    let min = pivots.min();
    let pivot_ratio = if max > 0.0 { min / max } else { 0.0 };
    if !pivot_ratio.is_finite() || min <= options.singular_threshold * max || min == 0.0 {
        return Err(LinearError::SingularAlgebraicJacobian { pivot_ratio });
    }
    if pivot_ratio < options.warn_threshold {
        warn!(pivot_ratio, "algebraic Jacobian is nearly singular");
    }
    Ok(lu)
}

pub(crate) fn scale_rows_by_inverse(mut m: DMatrix<f64>, t: &DVector<f64>) -> DMatrix<f64> {
    for (i, mut row) in m.row_iter_mut().enumerate() {
        row /= t[i];
    }
    m
}
