//! RMS (phasor-domain) time simulation driver.

use gd_core::VarId;
use gd_core::timing::Timer;
use gd_dae::DaeSystem;
use gd_project::RunDef;
use gd_sim::{Event, EventSchedule, Method, SimOptions, Trajectory, simulate_with, solve_algebraic};
use nalgebra::DVector;
use std::collections::HashMap;
use tracing::info;

use crate::error::AppResult;
use crate::timing::RunTiming;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RmsOptions {
    pub t_end: f64,
    pub h: f64,
    pub method: Method,
    pub tolerance: f64,
    pub max_newton_iterations: usize,
    /// Re-solve `g = 0` for the algebraic variables before integrating.
    pub equilibrate: bool,
}

impl Default for RmsOptions {
    fn default() -> Self {
        Self::from(&RunDef::default())
    }
}

impl From<&RunDef> for RmsOptions {
    fn from(run: &RunDef) -> Self {
        Self {
            t_end: run.t_end,
            h: run.h,
            method: run.method,
            tolerance: run.tolerance,
            max_newton_iterations: run.max_newton_iterations,
            equilibrate: run.equilibrate,
        }
    }
}

impl RmsOptions {
    pub fn with_t_end(mut self, t_end: f64) -> Self {
        self.t_end = t_end;
        self
    }

    pub fn with_h(mut self, h: f64) -> Self {
        self.h = h;
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_equilibrate(mut self, equilibrate: bool) -> Self {
        self.equilibrate = equilibrate;
        self
    }

    pub fn sim_options(&self) -> SimOptions {
        SimOptions::default()
            .with_method(self.method)
            .with_tolerance(self.tolerance)
            .with_max_newton_iterations(self.max_newton_iterations)
    }
}

/// Simulation output with names for every slot.
#[derive(Debug, Clone)]
pub struct RmsResponse {
    pub trajectory: Trajectory,
    /// `block.variable` for each `[x; y]` slot.
    pub var_names: Vec<String>,
    /// `block.parameter` for each parameter slot.
    pub param_names: Vec<String>,
    pub timing: RunTiming,
}

pub(crate) fn var_names(system: &DaeSystem) -> Vec<String> {
    (0..system.n_vars())
        .map(|slot| system.registry().qualified_name(slot).unwrap_or_default())
        .collect()
}

pub(crate) fn param_names(system: &DaeSystem) -> Vec<String> {
    system
        .parameters()
        .iter()
        .map(|p| match system.var_owner(&p.id) {
            Some(owner) => format!("{owner}.{}", p.name),
            None => p.name.clone(),
        })
        .collect()
}

/// Dense initial `(z, p)` from id mappings, optionally equilibrated.
pub(crate) fn initial_vectors(
    system: &DaeSystem,
    vars: &HashMap<VarId, f64>,
    params: &HashMap<VarId, f64>,
    equilibrate: bool,
    sim: &SimOptions,
) -> AppResult<(DVector<f64>, DVector<f64>)> {
    let p = system.build_init_params_vector(params)?;
    let mut z = system.build_init_vars_vector_from_uid(vars, p.as_slice())?;
    if equilibrate && system.n_y() > 0 {
        z = solve_algebraic(system, &z, &p, &sim.newton_config())?;
    }
    Ok((z, p))
}

pub struct RmsSimulationDriver<'a> {
    system: &'a DaeSystem,
    options: RmsOptions,
}

impl<'a> RmsSimulationDriver<'a> {
    pub fn new(system: &'a DaeSystem, options: RmsOptions) -> Self {
        Self { system, options }
    }

    pub fn options(&self) -> &RmsOptions {
        &self.options
    }

    /// Integrate from `t = 0` to `t_end`.
    pub fn run(
        &self,
        vars: &HashMap<VarId, f64>,
        params: &HashMap<VarId, f64>,
        events: &[Event],
    ) -> AppResult<RmsResponse> {
        let total = Timer::start("total");
        let sim = self.options.sim_options();

        let init = Timer::start("init");
        let (z0, p0) = initial_vectors(self.system, vars, params, self.options.equilibrate, &sim)?;
        let schedule = EventSchedule::new(self.system, events)?;
        let init_time_s = init.stop();

        let solve = Timer::start("solve");
        let trajectory = simulate_with(
            self.system,
            0.0,
            self.options.t_end,
            self.options.h,
            &z0,
            &p0,
            &schedule,
            &sim,
        )?;
        let solve_time_s = solve.stop();

        info!(
            samples = trajectory.len(),
            max_newton_iterations = trajectory.max_newton_iterations(),
            solve_time_s,
            "RMS simulation finished"
        );

        Ok(RmsResponse {
            trajectory,
            var_names: var_names(self.system),
            param_names: param_names(self.system),
            timing: RunTiming {
                init_time_s,
                solve_time_s,
                total_time_s: total.stop(),
                ..RunTiming::default()
            },
        })
    }
}
