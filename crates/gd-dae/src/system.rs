//! The assembled global DAE system.

use crate::error::DaeResult;
use crate::jacobian::{JacobianBlocks, SparseJacobian};
use crate::registry::IndexRegistry;
use gd_core::{VarId, ensure_len};
use gd_symbolic::{Compiled, Expr, Var};
use nalgebra::{DMatrix, DVector};

/// `T·ẋ = f(x, y, p)`, `0 = g(x, y, p)` over a fixed slot ordering.
///
/// Immutable after assembly and safe to share between concurrent runs.
/// Variable vectors passed in are the combined `z = [x; y]`.
#[derive(Clone, Debug)]
pub struct DaeSystem {
    pub(crate) registry: IndexRegistry,
    pub(crate) f: Vec<Expr>,
    pub(crate) g: Vec<Expr>,
    pub(crate) f_c: Vec<Compiled>,
    pub(crate) g_c: Vec<Compiled>,
    /// Per-state time constant, parameter-only.
    pub(crate) t_c: Vec<Compiled>,
    /// Per-slot initial guess over `[x; y]`, parameter-only.
    pub(crate) init_c: Vec<Option<Compiled>>,
    pub(crate) param_defaults: Vec<Option<f64>>,
    pub(crate) fx: SparseJacobian,
    pub(crate) fy: SparseJacobian,
    pub(crate) gx: SparseJacobian,
    pub(crate) gy: SparseJacobian,
    pub(crate) fp: SparseJacobian,
    pub(crate) gp: SparseJacobian,
}

impl DaeSystem {
    pub fn registry(&self) -> &IndexRegistry {
        &self.registry
    }

    pub fn n_x(&self) -> usize {
        self.registry.n_x()
    }

    pub fn n_y(&self) -> usize {
        self.registry.n_y()
    }

    pub fn n_p(&self) -> usize {
        self.registry.n_p()
    }

    pub fn n_vars(&self) -> usize {
        self.registry.n_vars()
    }

    pub fn state_vars(&self) -> &[Var] {
        self.registry.states()
    }

    pub fn algebraic_vars(&self) -> &[Var] {
        self.registry.algebraics()
    }

    pub fn parameters(&self) -> &[Var] {
        self.registry.params()
    }

    pub fn index_of(&self, id: &VarId) -> Option<usize> {
        self.registry.index_of(id)
    }

    pub fn var_owner(&self, id: &VarId) -> Option<&str> {
        self.registry.var_owner(id)
    }

    /// Summed differential equations, one per state.
    pub fn f_exprs(&self) -> &[Expr] {
        &self.f
    }

    /// Summed algebraic constraints, one per algebraic variable.
    pub fn g_exprs(&self) -> &[Expr] {
        &self.g
    }

    pub fn param_defaults(&self) -> &[Option<f64>] {
        &self.param_defaults
    }

    pub fn check_point(&self, z: &[f64], p: &[f64]) -> DaeResult<()> {
        ensure_len(z, self.n_vars(), "variable vector")?;
        self.check_params(p)
    }

    pub fn check_params(&self, p: &[f64]) -> DaeResult<()> {
        ensure_len(p, self.n_p(), "parameter vector")?;
        Ok(())
    }

    /// Split a combined vector into `(x, y)`.
    pub fn split(&self, z: &[f64]) -> DaeResult<(DVector<f64>, DVector<f64>)> {
        ensure_len(z, self.n_vars(), "variable vector")?;
        let (x, y) = z.split_at(self.n_x());
        Ok((DVector::from_column_slice(x), DVector::from_column_slice(y)))
    }

    /// Join `(x, y)` into the combined vector.
    pub fn join(&self, x: &[f64], y: &[f64]) -> DaeResult<DVector<f64>> {
        ensure_len(x, self.n_x(), "state vector")?;
        ensure_len(y, self.n_y(), "algebraic vector")?;
        Ok(DVector::from_iterator(
            self.n_vars(),
            x.iter().chain(y.iter()).copied(),
        ))
    }

    pub fn eval_f(&self, z: &[f64], p: &[f64]) -> DaeResult<DVector<f64>> {
        self.check_point(z, p)?;
        Ok(DVector::from_iterator(
            self.f_c.len(),
            self.f_c.iter().map(|e| e.eval(z, p)),
        ))
    }

    pub fn eval_g(&self, z: &[f64], p: &[f64]) -> DaeResult<DVector<f64>> {
        self.check_point(z, p)?;
        Ok(DVector::from_iterator(
            self.g_c.len(),
            self.g_c.iter().map(|e| e.eval(z, p)),
        ))
    }

    /// Diagonal of `T` for the given parameters.
    pub fn eval_t(&self, p: &[f64]) -> DaeResult<DVector<f64>> {
        self.check_params(p)?;
        Ok(DVector::from_iterator(
            self.t_c.len(),
            self.t_c.iter().map(|e| e.eval(&[], p)),
        ))
    }

    pub fn fx(&self, z: &[f64], p: &[f64]) -> DaeResult<DMatrix<f64>> {
        self.check_point(z, p)?;
        Ok(self.fx.eval(z, p))
    }

    pub fn fy(&self, z: &[f64], p: &[f64]) -> DaeResult<DMatrix<f64>> {
        self.check_point(z, p)?;
        Ok(self.fy.eval(z, p))
    }

    pub fn gx(&self, z: &[f64], p: &[f64]) -> DaeResult<DMatrix<f64>> {
        self.check_point(z, p)?;
        Ok(self.gx.eval(z, p))
    }

    pub fn gy(&self, z: &[f64], p: &[f64]) -> DaeResult<DMatrix<f64>> {
        self.check_point(z, p)?;
        Ok(self.gy.eval(z, p))
    }

    /// All four Jacobian blocks at one point.
    pub fn jacobians(&self, z: &[f64], p: &[f64]) -> DaeResult<JacobianBlocks> {
        self.check_point(z, p)?;
        Ok(JacobianBlocks {
            fx: self.fx.eval(z, p),
            fy: self.fy.eval(z, p),
            gx: self.gx.eval(z, p),
            gy: self.gy.eval(z, p),
        })
    }

    /// Parameter sensitivities `(∂f/∂p, ∂g/∂p)` at one point.
    pub fn param_jacobians(&self, z: &[f64], p: &[f64]) -> DaeResult<(DMatrix<f64>, DMatrix<f64>)> {
        self.check_point(z, p)?;
        Ok((self.fp.eval(z, p), self.gp.eval(z, p)))
    }

    /// Symbolic sparsity of the four blocks, `(fx, fy, gx, gy)`.
    pub fn jacobian_patterns(
        &self,
    ) -> (&SparseJacobian, &SparseJacobian, &SparseJacobian, &SparseJacobian) {
        (&self.fx, &self.fy, &self.gx, &self.gy)
    }

    /// `‖g(x, y, p)‖∞`, the consistency measure of an operating point.
    pub fn algebraic_residual_norm(&self, z: &[f64], p: &[f64]) -> DaeResult<f64> {
        let g = self.eval_g(z, p)?;
        Ok(gd_core::inf_norm(g.as_slice()))
    }

    /// Value of the variable `id` in a combined vector.
    pub fn value_of(&self, z: &[f64], id: &VarId) -> Option<f64> {
        self.registry.var_index(id).and_then(|i| z.get(i).copied())
    }
}
