//! Sparse symbolic Jacobians.

use gd_symbolic::Compiled;
use nalgebra::DMatrix;

/// Structurally non-zero partial derivatives as `(row, col, d)` triplets.
#[derive(Clone, Debug, PartialEq)]
pub struct SparseJacobian {
    nrows: usize,
    ncols: usize,
    entries: Vec<(usize, usize, Compiled)>,
}

impl SparseJacobian {
    pub(crate) fn new(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            entries: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, row: usize, col: usize, d: Compiled) {
        self.entries.push((row, col, d));
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Structural pattern (row, col) in insertion order.
    pub fn pattern(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.entries.iter().map(|(r, c, _)| (*r, *c))
    }

    /// Evaluate into a dense matrix at `(vars, params)`.
    pub fn eval(&self, vars: &[f64], params: &[f64]) -> DMatrix<f64> {
        let mut m = DMatrix::zeros(self.nrows, self.ncols);
        for (r, c, d) in &self.entries {
            m[(*r, *c)] = d.eval(vars, params);
        }
        m
    }
}

/// The four Jacobian blocks of `(f, g)` with respect to `(x, y)` at one point.
#[derive(Clone, Debug, PartialEq)]
pub struct JacobianBlocks {
    pub fx: DMatrix<f64>,
    pub fy: DMatrix<f64>,
    pub gx: DMatrix<f64>,
    pub gy: DMatrix<f64>,
}
