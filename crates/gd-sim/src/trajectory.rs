//! Integration results.

use gd_core::VarId;
use nalgebra::DVector;

/// One trajectory point.
#[derive(Clone, Copy, Debug)]
pub struct Sample<'a> {
    pub time: f64,
    /// Combined `[x; y]`.
    pub vars: &'a DVector<f64>,
    /// Parameters active at `time`.
    pub params: &'a DVector<f64>,
}

/// Fixed-step samples from `t0` to `t_end`, plus Newton statistics per step.
#[derive(Clone, Debug)]
pub struct Trajectory {
    pub(crate) t0: f64,
    pub(crate) h: f64,
    pub(crate) n_x: usize,
    pub(crate) var_ids: Vec<VarId>,
    pub(crate) param_ids: Vec<VarId>,
    pub(crate) times: Vec<f64>,
    pub(crate) vars: Vec<DVector<f64>>,
    pub(crate) params: Vec<DVector<f64>>,
    pub(crate) iterations: Vec<usize>,
    pub(crate) residuals: Vec<f64>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn step_size(&self) -> f64 {
        self.h
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn sample(&self, i: usize) -> Option<Sample<'_>> {
        Some(Sample {
            time: *self.times.get(i)?,
            vars: self.vars.get(i)?,
            params: self.params.get(i)?,
        })
    }

    pub fn last(&self) -> Option<Sample<'_>> {
        self.sample(self.len().checked_sub(1)?)
    }

    pub fn vars_at(&self, i: usize) -> Option<&DVector<f64>> {
        self.vars.get(i)
    }

    pub fn params_at(&self, i: usize) -> Option<&DVector<f64>> {
        self.params.get(i)
    }

    pub fn states_at(&self, i: usize) -> Option<&[f64]> {
        self.vars.get(i).map(|z| &z.as_slice()[..self.n_x])
    }

    pub fn algebraics_at(&self, i: usize) -> Option<&[f64]> {
        self.vars.get(i).map(|z| &z.as_slice()[self.n_x..])
    }

    /// Sample index nearest to `t`: `round((t − t0) / h)`.
    pub fn index_at(&self, t: f64) -> Option<usize> {
        let k = ((t - self.t0) / self.h).round();
        if !k.is_finite() || k < 0.0 {
            return None;
        }
        let k = k as usize;
        (k < self.len()).then_some(k)
    }

    /// One variable over all samples.
    pub fn series(&self, id: &VarId) -> Option<Vec<f64>> {
        let slot = self.var_ids.iter().position(|v| v == id)?;
        Some(self.vars.iter().map(|z| z[slot]).collect())
    }

    /// One parameter over all samples.
    pub fn param_series(&self, id: &VarId) -> Option<Vec<f64>> {
        let slot = self.param_ids.iter().position(|v| v == id)?;
        Some(self.params.iter().map(|p| p[slot]).collect())
    }

    /// Newton iterations for each step (one entry per sample after the first).
    pub fn newton_iterations(&self) -> &[usize] {
        &self.iterations
    }

    pub fn max_newton_iterations(&self) -> usize {
        self.iterations.iter().copied().max().unwrap_or(0)
    }

    /// Final Newton residual norm of each step.
    pub fn step_residuals(&self) -> &[f64] {
        &self.residuals
    }

    pub fn max_residual(&self) -> f64 {
        self.residuals.iter().copied().fold(0.0, f64::max)
    }
}
