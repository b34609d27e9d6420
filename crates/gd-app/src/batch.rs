//! Parallel execution of independent scenario variants.

use gd_core::VarId;
use gd_dae::DaeSystem;
use gd_sim::Event;
use rayon::prelude::*;
use std::collections::HashMap;

use crate::error::AppResult;
use crate::rms::{RmsOptions, RmsResponse, RmsSimulationDriver};

/// A variant of a base case: parameter overrides on top of the base values
/// and its own event list.
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    pub name: String,
    pub param_overrides: HashMap<VarId, f64>,
    pub events: Vec<Event>,
}

/// Run every scenario against one shared system. Results are in input order.
pub fn run_batch(
    system: &DaeSystem,
    vars: &HashMap<VarId, f64>,
    params: &HashMap<VarId, f64>,
    scenarios: &[Scenario],
    options: &RmsOptions,
) -> Vec<AppResult<RmsResponse>> {
    let driver = RmsSimulationDriver::new(system, *options);
    scenarios
        .par_iter()
        .map(|scenario| {
            let mut p = params.clone();
            p.extend(scenario.param_overrides.iter().map(|(k, v)| (k.clone(), *v)));
            tracing::debug!(scenario = %scenario.name, "Running scenario");
            driver.run(vars, &p, &scenario.events)
        })
        .collect()
}
