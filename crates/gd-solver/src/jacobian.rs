//! Finite-difference Jacobians.
//!
//! Used as an independent oracle for the exact symbolic Jacobians and for
//! callers that only have a residual function.

use crate::error::SolverResult;
use nalgebra::{DMatrix, DVector};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Difference {
    /// `(f(x+h) − f(x)) / h`, one extra evaluation per column.
    Forward,
    /// `(f(x+h) − f(x−h)) / 2h`, second order, two evaluations per column.
    #[default]
    Central,
}

/// Jacobian of `f` at `x`, column by column.
///
/// The step for column `j` is `epsilon · max(|x_j|, 1)`.
pub fn finite_difference_jacobian<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
    scheme: Difference,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let f_x = f(x)?;
    let mut jac = DMatrix::zeros(f_x.len(), x.len());
    let mut probe = x.clone();

    for j in 0..x.len() {
        let step = epsilon * x[j].abs().max(1.0);
        probe[j] = x[j] + step;
        let upper = f(&probe)?;
        let column = match scheme {
            Difference::Forward => (upper - &f_x) / step,
            Difference::Central => {
                probe[j] = x[j] - step;
                let lower = f(&probe)?;
                (upper - lower) / (2.0 * step)
            }
        };
        probe[j] = x[j];
        jac.set_column(j, &column);
    }

    Ok(jac)
}
