//! Case file schema.

use gd_core::VarId;
use gd_dae::Block;
use gd_devices::{GeneratorParams, LineParams, LoadParams};
use gd_sim::{Event, Method};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Case {
    pub version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkDef>,
    /// Free-form equation blocks, appended after the network's blocks.
    #[serde(default)]
    pub blocks: Vec<Block>,
    /// Initial values and parameter overrides by variable id. These take
    /// precedence over values computed from the network's operating point.
    #[serde(default)]
    pub initial_values: BTreeMap<VarId, f64>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub run: RunDef,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NetworkDef {
    #[serde(default)]
    pub buses: Vec<BusDef>,
    #[serde(default)]
    pub generators: Vec<GeneratorDef>,
    #[serde(default)]
    pub lines: Vec<LineDef>,
    #[serde(default)]
    pub loads: Vec<LoadDef>,
}

/// Bus with its solved voltage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusDef {
    pub name: String,
    #[serde(default = "default_voltage")]
    pub v: f64,
    /// Angle in radians.
    #[serde(default)]
    pub theta: f64,
}

fn default_voltage() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratorDef {
    pub name: String,
    pub bus: String,
    #[serde(flatten)]
    pub params: GeneratorParams,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineDef {
    pub name: String,
    pub from: String,
    pub to: String,
    #[serde(flatten)]
    pub params: LineParams,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoadDef {
    pub name: String,
    pub bus: String,
    #[serde(flatten)]
    pub params: LoadParams,
}

/// Run settings shared by the RMS and small-signal drivers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunDef {
    pub t_end: f64,
    pub h: f64,
    pub method: Method,
    pub tolerance: f64,
    pub max_newton_iterations: usize,
    /// Small-signal assessment time; zero analyzes the initial point.
    pub t_assess: f64,
    /// Re-solve `g = 0` for the algebraic variables before integrating.
    pub equilibrate: bool,
}

impl Default for RunDef {
    fn default() -> Self {
        Self {
            t_end: 5.0,
            h: 0.01,
            method: Method::ImplicitEuler,
            tolerance: 1e-6,
            max_newton_iterations: 25,
            t_assess: 0.0,
            equilibrate: false,
        }
    }
}
