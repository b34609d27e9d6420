//! Eigen-decomposition of real nonsymmetric matrices.
//!
//! Eigenvalues come from the real Schur form and are always returned. Right
//! eigenvectors are found by complex inverse iteration on `A − (λ + δ)·I`;
//! start vectors are made orthogonal to eigenvectors already found for
//! numerically equal eigenvalues, which separates repeated eigenvalues of
//! diagonalizable matrices.
//!
//! Left eigenvectors are `W = V⁺` (SVD pseudo-inverse). With a complete basis
//! this is `V⁻¹` and `W·V = I`. A defective matrix (Jordan blocks, e.g. a
//! rigid-body double zero) has a rank-deficient `V`; the pseudo-inverse then
//! drops the collapsed directions and the result is marked
//! [`Eigenbasis::Defective`].

use crate::error::{StabilityError, StabilityResult};
use nalgebra::{DMatrix, DVector, Schur};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::warn;

/// Relative shift off the eigenvalue for inverse iteration.
const SHIFT: f64 = 1e-10;
/// Relative distance under which two eigenvalues count as repeated.
const REPEAT: f64 = 1e-8;
const INVERSE_ITERATIONS: usize = 3;

/// Whether the right eigenvectors span the state space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Eigenbasis {
    /// `W = V⁻¹`, `W·V = I`.
    Complete,
    /// `V` is rank deficient and `W` is its pseudo-inverse.
    Defective,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EigenDecomposition {
    /// Sorted eigenvalues.
    pub values: Vec<Complex64>,
    /// Right eigenvectors as columns, unit 2-norm, same order as `values`.
    pub right: DMatrix<Complex64>,
    /// Left eigenvectors as rows, `left = right⁺`.
    pub left: DMatrix<Complex64>,
    pub basis: Eigenbasis,
}

/// Descending `|λ|`, then descending real part, then descending imaginary part.
pub fn mode_order(a: &Complex64, b: &Complex64) -> Ordering {
    b.norm()
        .total_cmp(&a.norm())
        .then(b.re.total_cmp(&a.re))
        .then(b.im.total_cmp(&a.im))
}

fn check_matrix(a: &DMatrix<f64>) -> StabilityResult<()> {
    if !a.is_square() {
        return Err(StabilityError::NotSquare {
            rows: a.nrows(),
            cols: a.ncols(),
        });
    }
    if a.iter().any(|v| !v.is_finite()) {
        return Err(StabilityError::NonFinite);
    }
    Ok(())
}

/// Eigenvalues of `a` in mode order.
pub fn eigenvalues(a: &DMatrix<f64>, max_iterations: usize) -> StabilityResult<Vec<Complex64>> {
    check_matrix(a)?;
    if a.nrows() == 0 {
        return Ok(Vec::new());
    }
    let schur = Schur::try_new(a.clone(), f64::EPSILON, max_iterations)
        .ok_or(StabilityError::EigenDecompositionFailed { max_iterations })?;
    let mut values: Vec<Complex64> = schur.complex_eigenvalues().iter().copied().collect();
    values.sort_by(mode_order);
    Ok(values)
}

/// Eigenvalues with right and left eigenvectors.
///
/// `defect_tolerance` bounds the eigen-pair residual
/// `‖A·v − λ·v‖ / max(1, max|a_ij|)` and the reciprocal condition of `V`
/// below which the basis counts as defective.
pub fn eigen_decompose(
    a: &DMatrix<f64>,
    max_iterations: usize,
    defect_tolerance: f64,
) -> StabilityResult<EigenDecomposition> {
    let values = eigenvalues(a, max_iterations)?;
    let n = a.nrows();
    if n == 0 {
        return Ok(EigenDecomposition {
            values,
            right: DMatrix::zeros(0, 0),
            left: DMatrix::zeros(0, 0),
            basis: Eigenbasis::Complete,
        });
    }

    let scale = a.amax().max(1.0);
    let a_c: DMatrix<Complex64> = a.map(|v| Complex64::new(v, 0.0));
    let residual_of =
        |v: &DVector<Complex64>, lambda: Complex64| (&a_c * v - v * lambda).norm() / scale;

    let mut right: DMatrix<Complex64> = DMatrix::zeros(n, n);
    let mut found: Vec<(Complex64, DVector<Complex64>)> = Vec::with_capacity(n);
    for (k, &lambda) in values.iter().enumerate() {
        let same: Vec<&DVector<Complex64>> = found
            .iter()
            .filter(|(mu, _)| (mu - lambda).norm() <= REPEAT * scale)
            .map(|(_, v)| v)
            .collect();
        // A Jordan block has fewer independent eigenvectors than its
        // multiplicity: orthogonalizing then leaves a non-eigenvector, so the
        // plain iterate (parallel to one already found) is kept instead.
        let v = match inverse_iteration(&a_c, lambda, &same, scale, k) {
            Some(v) if residual_of(&v, lambda) <= defect_tolerance => v,
            _ => inverse_iteration(&a_c, lambda, &[], scale, k)
                .ok_or(StabilityError::EigenvectorFailed { mode: k })?,
        };
        right.set_column(k, &v);
        found.push((lambda, v));
    }

    let svd = right.clone().svd(true, true);
    let sigma_max = svd.singular_values.max();
    let sigma_min = svd.singular_values.min();
    let basis = if sigma_max > 0.0 && sigma_min / sigma_max > defect_tolerance {
        Eigenbasis::Complete
    } else {
        warn!(
            reciprocal_condition = sigma_min / sigma_max,
            "state matrix is defective; left eigenvectors from the pseudo-inverse"
        );
        Eigenbasis::Defective
    };
    let left = svd
        .pseudo_inverse(sigma_max * defect_tolerance)
        .map_err(StabilityError::LeftEigenvectors)?;

    Ok(EigenDecomposition {
        values,
        right,
        left,
        basis,
    })
}

fn start_vector(n: usize, k: usize) -> DVector<Complex64> {
    DVector::from_fn(n, |j, _| {
        let t = (j + 1) as f64;
        let s = (k + 1) as f64;
        Complex64::new(1.0 + 0.37 * (t * s).sin(), 0.23 * (t + s).cos())
    })
}

fn orthogonalize(v: &mut DVector<Complex64>, against: &[&DVector<Complex64>]) {
    for u in against {
        let proj = u.dotc(v);
        *v -= *u * proj;
    }
}

fn inverse_iteration(
    a: &DMatrix<Complex64>,
    lambda: Complex64,
    same: &[&DVector<Complex64>],
    scale: f64,
    k: usize,
) -> Option<DVector<Complex64>> {
    let n = a.nrows();
    let mut shift = SHIFT * scale;
    for _attempt in 0..4 {
        let mut m = a.clone();
        for i in 0..n {
            m[(i, i)] -= lambda + shift;
        }
        let lu = m.lu();
        let mut v = start_vector(n, k);
        orthogonalize(&mut v, same);
        let mut ok = v.norm() > 0.0;
        for _ in 0..INVERSE_ITERATIONS {
            if !ok {
                break;
            }
            match lu.solve(&v) {
                Some(next) if next.iter().all(|c| c.re.is_finite() && c.im.is_finite()) => {
                    v = next;
                    orthogonalize(&mut v, same);
                    let norm = v.norm();
                    ok = norm > 0.0 && norm.is_finite();
                    if ok {
                        v.unscale_mut(norm);
                    }
                }
                _ => ok = false,
            }
        }
        if ok {
            return Some(v);
        }
        shift *= 100.0;
    }
    None
}
