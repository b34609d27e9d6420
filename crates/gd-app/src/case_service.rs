//! Case loading and introspection.

use gd_core::timing::Timer;
use gd_project::{BuiltCase, Case, ProjectError, build_case};
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Summary of a case for listing and validation output.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseSummary {
    pub name: String,
    pub version: u32,
    pub blocks: usize,
    pub buses: usize,
    pub generators: usize,
    pub lines: usize,
    pub loads: usize,
    pub events: usize,
    pub n_x: usize,
    pub n_y: usize,
    pub n_p: usize,
}

/// Load, migrate and validate a YAML or JSON case file.
pub fn load_case(path: &Path) -> AppResult<Case> {
    gd_project::load_case(path).map_err(|e| match e {
        ProjectError::Io(source) => AppError::CaseFileRead {
            path: path.to_path_buf(),
            source,
        },
        other => other.into(),
    })
}

/// Build the case's system and initial values; returns the build time too.
pub fn prepare_case(case: &Case) -> AppResult<(BuiltCase, f64)> {
    let timer = Timer::start("compile");
    let built = build_case(case)?;
    Ok((built, timer.stop()))
}

/// Assemble the case and report its dimensions.
pub fn summarize_case(case: &Case) -> AppResult<CaseSummary> {
    let (built, _) = prepare_case(case)?;
    let network = case.network.as_ref();
    Ok(CaseSummary {
        name: case.name.clone(),
        version: case.version,
        blocks: case.blocks.len(),
        buses: network.map_or(0, |n| n.buses.len()),
        generators: network.map_or(0, |n| n.generators.len()),
        lines: network.map_or(0, |n| n.lines.len()),
        loads: network.map_or(0, |n| n.loads.len()),
        events: case.events.len(),
        n_x: built.system.n_x(),
        n_y: built.system.n_y(),
        n_p: built.system.n_p(),
    })
}
