//! Simulation runner.

use crate::error::{SimError, SimResult};
use crate::events::EventSchedule;
use crate::integrator::Method;
use crate::trajectory::Trajectory;
use gd_dae::{DaeError, DaeSystem};
use gd_solver::{NewtonConfig, SolverError, SolverResult, newton_solve};
use nalgebra::{DMatrix, DVector};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Relative guard against round-off in step counts and event triggers.
const TIME_GUARD: f64 = 1e-9;
/// Largest number of steps a single run may take.
pub const MAX_STEPS: usize = 10_000_000;
/// Samples reserved up front; longer runs grow their buffers.
const RESERVE: usize = 65_536;

/// Options for simulation runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimOptions {
    /// Newton residual tolerance (infinity norm, per unit)
    pub tolerance: f64,
    /// Newton iteration cap per step
    pub max_newton_iterations: usize,
    /// Integration method
    pub method: Method,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_newton_iterations: 25,
            method: Method::default(),
        }
    }
}

impl SimOptions {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_newton_iterations(mut self, n: usize) -> Self {
        self.max_newton_iterations = n;
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn newton_config(&self) -> NewtonConfig {
        NewtonConfig::default()
            .with_tolerance(self.tolerance)
            .with_max_iterations(self.max_newton_iterations)
    }
}

/// Integrate without events using default Newton settings.
pub fn simulate(
    system: &DaeSystem,
    t0: f64,
    t_end: f64,
    h: f64,
    z0: &DVector<f64>,
    params0: &DVector<f64>,
    method: Method,
) -> SimResult<Trajectory> {
    simulate_with(
        system,
        t0,
        t_end,
        h,
        z0,
        params0,
        &EventSchedule::empty(),
        &SimOptions::default().with_method(method),
    )
}

/// Number of fixed steps covering `[t0, t_end]`.
fn step_count(t0: f64, t_end: f64, h: f64) -> SimResult<usize> {
    let ratio = (t_end - t0) / h;
    let steps = (ratio - TIME_GUARD * ratio.max(1.0)).ceil().max(0.0);
    if !steps.is_finite() || steps > MAX_STEPS as f64 {
        return Err(SimError::InvalidStep {
            what: "step size too small for the time window",
        });
    }
    Ok(steps as usize)
}

/// Integrate `system` from `t0` to `t_end` with fixed step `h`.
///
/// `z0` is the combined initial vector `[x0; y0]`. Either a complete trajectory
/// is returned or the run fails; there are no partial results.
#[allow(clippy::too_many_arguments)]
pub fn simulate_with(
    system: &DaeSystem,
    t0: f64,
    t_end: f64,
    h: f64,
    z0: &DVector<f64>,
    params0: &DVector<f64>,
    events: &EventSchedule,
    options: &SimOptions,
) -> SimResult<Trajectory> {
    if !h.is_finite() || h <= 0.0 {
        return Err(SimError::InvalidStep {
            what: "step size must be positive and finite",
        });
    }
    if !t0.is_finite() || !t_end.is_finite() {
        return Err(SimError::InvalidStep {
            what: "start and end times must be finite",
        });
    }
    if t_end < t0 {
        return Err(SimError::InvalidStep {
            what: "end time is before start time",
        });
    }
    let n_steps = step_count(t0, t_end, h)?;
    system.check_point(z0.as_slice(), params0.as_slice())?;

    let started = Instant::now();
    let guard = TIME_GUARD * h;
    let config = options.newton_config();
    let integrator = options.method.integrator();

    info!(
        method = %options.method,
        t0,
        t_end,
        h,
        steps = n_steps,
        n_x = system.n_x(),
        n_y = system.n_y(),
        "starting simulation"
    );

    let mut p = events.params_at(params0, t0, guard);
    let g0 = system.algebraic_residual_norm(z0.as_slice(), p.as_slice())?;
    if g0 > options.tolerance {
        warn!(
            residual = g0,
            tolerance = options.tolerance,
            "initial point does not satisfy the algebraic equations"
        );
    }

    let reserve = n_steps.min(RESERVE);
    let mut times = Vec::with_capacity(reserve + 1);
    let mut vars = Vec::with_capacity(reserve + 1);
    let mut params = Vec::with_capacity(reserve + 1);
    let mut iterations = Vec::with_capacity(reserve);
    let mut residuals = Vec::with_capacity(reserve);

    times.push(t0);
    vars.push(z0.clone());
    params.push(p.clone());

    let mut z = z0.clone();
    let mut t_prev = t0;
    for k in 1..=n_steps {
        let t = if k == n_steps {
            t_end
        } else {
            t0 + k as f64 * h
        };
        let p_next = events.params_at(params0, t, guard);
        let triggers = events.triggers_between(t_prev, t, guard);
        if !triggers.is_empty() {
            debug!(step = k, time = t, ?triggers, "parameter events applied");
        }

        let result = integrator
            .step(system, &z, &p, &p_next, t - t_prev, &config)
            .map_err(|source| SimError::DivergedNewton {
                step: k,
                time: t,
                residual_norm: source.residual_norm().unwrap_or(f64::NAN),
                source,
            })?;
        debug!(
            step = k,
            time = t,
            iterations = result.iterations,
            residual = result.residual_norm,
            "step converged"
        );

        z = result.x;
        times.push(t);
        vars.push(z.clone());
        params.push(p_next.clone());
        iterations.push(result.iterations);
        residuals.push(result.residual_norm);
        p = p_next;
        t_prev = t;
    }

    let trajectory = Trajectory {
        t0,
        h,
        n_x: system.n_x(),
        var_ids: system
            .state_vars()
            .iter()
            .chain(system.algebraic_vars())
            .map(|v| v.id.clone())
            .collect(),
        param_ids: system.parameters().iter().map(|v| v.id.clone()).collect(),
        times,
        vars,
        params,
        iterations,
        residuals,
    };
    info!(
        samples = trajectory.len(),
        max_newton_iterations = trajectory.max_newton_iterations(),
        elapsed_s = started.elapsed().as_secs_f64(),
        "simulation finished"
    );
    Ok(trajectory)
}

/// Solve `g(x, y, p) = 0` for `y` with `x` held fixed, starting from `z`.
///
/// Returns the completed combined vector.
pub fn solve_algebraic(
    system: &DaeSystem,
    z: &DVector<f64>,
    params: &DVector<f64>,
    config: &NewtonConfig,
) -> SimResult<DVector<f64>> {
    system.check_point(z.as_slice(), params.as_slice())?;
    let n_x = system.n_x();
    let n_y = system.n_y();
    if n_y == 0 {
        return Ok(z.clone());
    }
    let x = z.rows(0, n_x).into_owned();
    let p = params.as_slice();
    let eval_err = |e: DaeError| SolverError::Evaluation {
        what: e.to_string(),
    };
    let join = |y: &DVector<f64>| -> DVector<f64> {
        DVector::from_iterator(n_x + n_y, x.iter().chain(y.iter()).copied())
    };

    let residual = |y: &DVector<f64>| -> SolverResult<DVector<f64>> {
        system.eval_g(join(y).as_slice(), p).map_err(eval_err)
    };
    let jacobian = |y: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
        system.gy(join(y).as_slice(), p).map_err(eval_err)
    };

    let y0 = z.rows(n_x, n_y).into_owned();
    let result = newton_solve(y0, residual, jacobian, config)?;
    debug!(
        iterations = result.iterations,
        residual = result.residual_norm,
        "algebraic equilibrium solved"
    );
    Ok(join(&result.x))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_count_is_round_off_safe() {
        assert_eq!(step_count(0.0, 5.0, 0.01).unwrap(), 500);
        assert_eq!(step_count(0.0, 0.3, 0.1).unwrap(), 3);
        assert_eq!(step_count(1.0, 1.0, 0.1).unwrap(), 0);
        assert_eq!(step_count(0.0, 0.25, 0.1).unwrap(), 3);
    }

    #[test]
    fn step_count_is_bounded() {
        assert_eq!(step_count(0.0, 1.0, 1e-7).unwrap(), MAX_STEPS);
        for h in [1e-8, f64::MIN_POSITIVE, 5e-324] {
            assert!(matches!(
                step_count(0.0, 1.0, h),
                Err(SimError::InvalidStep { .. })
            ));
        }
    }

    #[test]
    fn options_defaults() {
        let opts = SimOptions::default();
        assert_eq!(opts.tolerance, 1e-6);
        assert_eq!(opts.max_newton_iterations, 25);
        assert_eq!(opts.method, Method::ImplicitEuler);
        let cfg = opts.with_tolerance(1e-9).newton_config();
        assert_eq!(cfg.tolerance, 1e-9);
    }
}
