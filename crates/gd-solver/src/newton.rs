//! Newton iteration on square nonlinear systems.

use crate::error::{SolverError, SolverResult};
use gd_core::inf_norm;
use nalgebra::{DMatrix, DVector};
use tracing::trace;

/// Newton solver configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NewtonConfig {
    /// Maximum number of Newton updates.
    pub max_iterations: usize,
    /// Convergence threshold on the residual infinity norm (per unit).
    pub tolerance: f64,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 25,
            tolerance: 1e-6,
        }
    }
}

impl NewtonConfig {
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Newton iteration result.
#[derive(Clone, Debug, PartialEq)]
pub struct NewtonResult {
    /// Solution vector
    pub x: DVector<f64>,
    /// Final residual infinity norm
    pub residual_norm: f64,
    /// Number of Newton updates applied (0 if the guess already converged)
    pub iterations: usize,
}

/// Solve `r(x) = 0` from `x0` by full Newton steps `J·dx = −r`.
///
/// Stops as soon as `‖r‖∞ ≤ tolerance`. An affine residual with exact
/// Jacobian converges after one update.
pub fn newton_solve<F, J>(
    x0: DVector<f64>,
    residual_fn: F,
    jacobian_fn: J,
    config: &NewtonConfig,
) -> SolverResult<NewtonResult>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
    J: Fn(&DVector<f64>) -> SolverResult<DMatrix<f64>>,
{
    let mut x = x0;
    let mut r = residual_fn(&x)?;
    if r.len() != x.len() {
        return Err(SolverError::Dimension {
            residual: r.len(),
            unknowns: x.len(),
        });
    }

    let mut iteration = 0;
    let mut last_finite = f64::NAN;
    loop {
        let r_norm = inf_norm(r.as_slice());
        if r_norm.is_nan() {
            return Err(SolverError::NonFinite {
                what: "residual",
                iteration,
                residual_norm: last_finite,
            });
        }
        if r_norm.is_finite() {
            last_finite = r_norm;
        }
        trace!(iteration, residual = r_norm, "newton");
        if r_norm <= config.tolerance {
            return Ok(NewtonResult {
                x,
                residual_norm: r_norm,
                iterations: iteration,
            });
        }
        if iteration == config.max_iterations {
            return Err(SolverError::DidNotConverge {
                iterations: iteration,
                residual_norm: r_norm,
            });
        }

        let jac = jacobian_fn(&x)?;
        let dx = jac
            .lu()
            .solve(&(-&r))
            .ok_or(SolverError::SingularJacobian {
                iteration,
                residual_norm: last_finite,
            })?;
        if dx.iter().any(|v| !v.is_finite()) {
            return Err(SolverError::NonFinite {
                what: "Newton update",
                iteration,
                residual_norm: last_finite,
            });
        }

        x += dx;
        r = residual_fn(&x)?;
        iteration += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_quadratic() {
        // Solve x^2 - 4 = 0 from x = 3
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] - 4.0))
        };
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 2.0 * x[0]))
        };

        let x0 = DVector::from_element(1, 3.0);
        let result = newton_solve(x0, residual, jacobian, &NewtonConfig::default()).unwrap();

        assert!((result.x[0] - 2.0).abs() < 1e-6);
        assert!(result.residual_norm <= 1e-6);
        assert!(result.iterations > 1);
    }

    #[test]
    fn affine_system_takes_one_step() {
        // [2 1; 1 3] x = [3; 5]
        let a = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);
        let b = DVector::from_column_slice(&[3.0, 5.0]);
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> { Ok(&a * x - &b) };
        let jacobian = |_: &DVector<f64>| -> SolverResult<DMatrix<f64>> { Ok(a.clone()) };

        let result = newton_solve(
            DVector::zeros(2),
            residual,
            jacobian,
            &NewtonConfig::default().with_tolerance(1e-12),
        )
        .unwrap();
        assert_eq!(result.iterations, 1);
        assert!((result.x[0] - 0.8).abs() < 1e-12);
        assert!((result.x[1] - 1.4).abs() < 1e-12);
    }

    #[test]
    fn converged_guess_takes_no_step() {
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> { Ok(x.clone()) };
        let jacobian = |_: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            panic!("Jacobian must not be evaluated")
        };
        let result =
            newton_solve(DVector::zeros(3), residual, jacobian, &NewtonConfig::default()).unwrap();
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn singular_matrix_is_reported() {
        let residual = |_: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(2, 1.0))
        };
        let jacobian =
            |_: &DVector<f64>| -> SolverResult<DMatrix<f64>> { Ok(DMatrix::zeros(2, 2)) };
        let err = newton_solve(DVector::zeros(2), residual, jacobian, &NewtonConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            SolverError::SingularJacobian {
                iteration: 0,
                residual_norm: 1.0
            }
        );
        assert_eq!(err.residual_norm(), Some(1.0));
    }

    #[test]
    fn non_finite_residual_keeps_the_last_finite_norm() {
        // Finite only at the start point.
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            let r = if x[0] == 0.0 { 2.0 } else { f64::NAN };
            Ok(DVector::from_element(1, r))
        };
        let jacobian =
            |_: &DVector<f64>| -> SolverResult<DMatrix<f64>> { Ok(DMatrix::identity(1, 1)) };
        let err = newton_solve(DVector::zeros(1), residual, jacobian, &NewtonConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            SolverError::NonFinite {
                what: "residual",
                iteration: 1,
                residual_norm: 2.0
            }
        );
    }

    #[test]
    fn iteration_cap_is_reported_with_residual() {
        // x^2 + 1 has no real root.
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] + 1.0))
        };
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 2.0 * x[0]))
        };
        let err = newton_solve(
            DVector::from_element(1, 0.5),
            residual,
            jacobian,
            &NewtonConfig::default().with_max_iterations(5),
        )
        .unwrap_err();
        match err {
            SolverError::DidNotConverge {
                iterations,
                residual_norm,
            } => {
                assert_eq!(iterations, 5);
                assert!(residual_norm >= 1.0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
