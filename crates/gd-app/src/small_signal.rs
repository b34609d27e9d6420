//! Small-signal stability driver.

use gd_core::VarId;
use gd_core::timing::Timer;
use gd_dae::DaeSystem;
use gd_project::RunDef;
use gd_sim::{Event, EventSchedule, Method, SimOptions, simulate_with};
use gd_stability::{
    LogSink, PlotSink, SmallSignalResult, StabilityOptions, run_small_signal_stability_with,
};
use std::collections::HashMap;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::rms::initial_vectors;
use crate::timing::RunTiming;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmallSignalOptions {
    pub h: f64,
    /// Time of the operating point to analyze. With zero the initial point is
    /// analyzed without integrating.
    pub t_assess: f64,
    pub method: Method,
    pub tolerance: f64,
    pub max_newton_iterations: usize,
    pub equilibrate: bool,
    /// Hand the eigenvalues to the logging plot sink.
    pub plot: bool,
    pub stability: StabilityOptions,
}

impl Default for SmallSignalOptions {
    fn default() -> Self {
        Self::from(&RunDef::default())
    }
}

impl From<&RunDef> for SmallSignalOptions {
    fn from(run: &RunDef) -> Self {
        Self {
            h: run.h,
            t_assess: run.t_assess,
            method: run.method,
            tolerance: run.tolerance,
            max_newton_iterations: run.max_newton_iterations,
            equilibrate: run.equilibrate,
            plot: false,
            stability: StabilityOptions::default(),
        }
    }
}

impl SmallSignalOptions {
    pub fn with_t_assess(mut self, t_assess: f64) -> Self {
        self.t_assess = t_assess;
        self
    }

    pub fn with_h(mut self, h: f64) -> Self {
        self.h = h;
        self
    }

    pub fn with_plot(mut self, plot: bool) -> Self {
        self.plot = plot;
        self
    }

    pub fn with_stability(mut self, stability: StabilityOptions) -> Self {
        self.stability = stability;
        self
    }

    fn sim_options(&self) -> SimOptions {
        SimOptions::default()
            .with_method(self.method)
            .with_tolerance(self.tolerance)
            .with_max_newton_iterations(self.max_newton_iterations)
    }
}

#[derive(Debug, Clone)]
pub struct SmallSignalResponse {
    pub result: SmallSignalResult,
    /// Time of the analyzed sample.
    pub t_assess: f64,
    pub sample_index: usize,
    pub timing: RunTiming,
}

pub struct SmallSignalDriver<'a> {
    system: &'a DaeSystem,
    options: SmallSignalOptions,
}

impl<'a> SmallSignalDriver<'a> {
    pub fn new(system: &'a DaeSystem, options: SmallSignalOptions) -> Self {
        Self { system, options }
    }

    /// Analyze the operating point at `t_assess`, integrating up to it first
    /// when it is later than the start.
    pub fn run(
        &self,
        vars: &HashMap<VarId, f64>,
        params: &HashMap<VarId, f64>,
        events: &[Event],
    ) -> AppResult<SmallSignalResponse> {
        let total = Timer::start("total");
        let opts = &self.options;
        if !opts.t_assess.is_finite() || opts.t_assess < 0.0 {
            return Err(AppError::InvalidInput(format!(
                "assessment time must be non-negative, got {}",
                opts.t_assess
            )));
        }
        let sim = opts.sim_options();

        let init = Timer::start("init");
        let (z0, p0) = initial_vectors(self.system, vars, params, opts.equilibrate, &sim)?;
        let schedule = EventSchedule::new(self.system, events)?;
        let init_time_s = init.stop();

        let solve = Timer::start("solve");
        let (z, p, t, index) = if opts.t_assess > 0.0 {
            let traj = simulate_with(
                self.system,
                0.0,
                opts.t_assess,
                opts.h,
                &z0,
                &p0,
                &schedule,
                &sim,
            )?;
            let index = traj.index_at(opts.t_assess).ok_or_else(|| {
                AppError::InvalidInput(format!("no sample at t = {}", opts.t_assess))
            })?;
            let sample = traj
                .sample(index)
                .ok_or_else(|| AppError::InvalidInput(format!("sample {index} out of range")))?;
            (sample.vars.clone(), sample.params.clone(), sample.time, index)
        } else {
            (z0, p0, 0.0, 0)
        };
        let solve_time_s = solve.stop();

        let analysis = Timer::start("analysis");
        let mut log = LogSink;
        let sink: Option<&mut dyn PlotSink> = if opts.plot { Some(&mut log) } else { None };
        let result = run_small_signal_stability_with(
            self.system,
            z.as_slice(),
            p.as_slice(),
            &opts.stability,
            sink,
        )?;
        let analysis_time_s = analysis.stop();

        info!(
            verdict = %result.verdict,
            t_assess = t,
            sample = index,
            "Small-signal assessment finished"
        );

        Ok(SmallSignalResponse {
            result,
            t_assess: t,
            sample_index: index,
            timing: RunTiming {
                init_time_s,
                solve_time_s,
                analysis_time_s,
                total_time_s: total.stop(),
                ..RunTiming::default()
            },
        })
    }
}
