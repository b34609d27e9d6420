//! Normalized participation factors.

use nalgebra::DMatrix;
use num_complex::Complex64;

/// `PF[k, i] = |W[i, k] · V[k, i]|`, each mode column scaled to sum to 1.
///
/// Rows are state variables, columns are modes. With `W·V = I` every unscaled
/// column sums to at least 1 in magnitude. With a defective basis `W = V⁺`
/// and a column whose unscaled sum is zero is left at zero.
pub fn participation_factors(
    right: &DMatrix<Complex64>,
    left: &DMatrix<Complex64>,
) -> DMatrix<f64> {
    let n = right.nrows();
    let mut pf = DMatrix::from_fn(n, n, |k, i| (left[(i, k)] * right[(k, i)]).norm());
    for mut column in pf.column_iter_mut() {
        let sum = column.sum();
        if sum > 0.0 {
            column /= sum;
        }
    }
    pf
}
