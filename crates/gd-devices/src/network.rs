//! A collection of buses and devices, and its steady-state initialization.

use crate::bus::Bus;
use crate::error::{DeviceError, DeviceResult};
use crate::generator::{ClassicalGenerator, GeneratorParams};
use crate::line::{Line, LineParams};
use crate::load::{ConstantPowerLoad, LoadParams};
use gd_core::VarId;
use gd_dae::Block;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Solved bus voltage, typically taken from a power flow.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BusVoltage {
    pub v: f64,
    #[serde(default)]
    pub theta: f64,
}

impl BusVoltage {
    pub fn new(v: f64, theta: f64) -> Self {
        Self { v, theta }
    }
}

/// Steady-state values for an assembled network, split by role so they can be
/// handed to the system's initial-vector builders.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OperatingPoint {
    /// States and algebraic variables.
    pub vars: HashMap<VarId, f64>,
    /// Parameters without a declared default.
    pub params: HashMap<VarId, f64>,
}

#[derive(Clone, Debug, Default)]
pub struct Network {
    pub buses: Vec<Bus>,
    pub generators: Vec<ClassicalGenerator>,
    pub lines: Vec<Line>,
    pub loads: Vec<ConstantPowerLoad>,
    names: HashSet<String>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    fn claim(&mut self, name: &str) -> DeviceResult<()> {
        if !self.names.insert(name.to_string()) {
            return Err(DeviceError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    pub fn bus(&self, name: &str) -> DeviceResult<&Bus> {
        self.buses
            .iter()
            .find(|b| b.name == name)
            .ok_or_else(|| DeviceError::UnknownBus(name.to_string()))
    }

    pub fn add_bus(&mut self, name: &str) -> DeviceResult<&Bus> {
        self.claim(name)?;
        self.buses.push(Bus::new(name));
        let idx = self.buses.len() - 1;
        Ok(&self.buses[idx])
    }

    pub fn add_generator(
        &mut self,
        name: &str,
        bus: &str,
        params: GeneratorParams,
    ) -> DeviceResult<&ClassicalGenerator> {
        let generator = ClassicalGenerator::new(name, self.bus(bus)?, params)?;
        self.claim(name)?;
        self.generators.push(generator);
        let idx = self.generators.len() - 1;
        Ok(&self.generators[idx])
    }

    pub fn add_line(
        &mut self,
        name: &str,
        from: &str,
        to: &str,
        params: LineParams,
    ) -> DeviceResult<&Line> {
        let line = Line::new(name, self.bus(from)?, self.bus(to)?, params)?;
        self.claim(name)?;
        self.lines.push(line);
        let idx = self.lines.len() - 1;
        Ok(&self.lines[idx])
    }

    pub fn add_load(
        &mut self,
        name: &str,
        bus: &str,
        params: LoadParams,
    ) -> DeviceResult<&ConstantPowerLoad> {
        let load = ConstantPowerLoad::new(name, self.bus(bus)?, params)?;
        self.claim(name)?;
        self.loads.push(load);
        let idx = self.loads.len() - 1;
        Ok(&self.loads[idx])
    }

    /// Equation blocks in declaration order: buses, generators, lines, loads.
    pub fn blocks(&self) -> Vec<Block> {
        let mut blocks = Vec::with_capacity(
            self.buses.len() + self.generators.len() + self.lines.len() + self.loads.len(),
        );
        blocks.extend(self.buses.iter().map(Bus::block));
        blocks.extend(self.generators.iter().map(ClassicalGenerator::block));
        blocks.extend(self.lines.iter().map(Line::block));
        blocks.extend(self.loads.iter().map(ConstantPowerLoad::block));
        blocks
    }

    /// Equilibrium values for every variable and free parameter.
    ///
    /// Each bus's generation is whatever its loads and lines draw at the given
    /// voltages; a bus with net demand must host exactly one generator.
    pub fn initialize(
        &self,
        voltages: &HashMap<String, BusVoltage>,
    ) -> DeviceResult<OperatingPoint> {
        let voltage = |bus: &Bus| {
            voltages
                .get(&bus.name)
                .copied()
                .ok_or_else(|| DeviceError::MissingVoltage {
                    bus: bus.name.clone(),
                })
        };

        let mut demand: HashMap<&str, (f64, f64)> = HashMap::new();
        for load in &self.loads {
            let entry = demand.entry(load.bus.name.as_str()).or_default();
            entry.0 += load.params.p;
            entry.1 += load.params.q;
        }
        for line in &self.lines {
            let (vf, vt) = (voltage(&line.from)?, voltage(&line.to)?);
            let flows = line.params.flows(vf.v, vf.theta, vt.v, vt.theta);
            let from = demand.entry(line.from.name.as_str()).or_default();
            from.0 += flows.p_from;
            from.1 += flows.q_from;
            let to = demand.entry(line.to.name.as_str()).or_default();
            to.0 += flows.p_to;
            to.1 += flows.q_to;
        }

        let mut point = OperatingPoint::default();
        for bus in &self.buses {
            let bv = voltage(bus)?;
            point.vars.insert(bus.theta.id.clone(), bv.theta);
            point.vars.insert(bus.v.id.clone(), bv.v);

            let (p, q) = demand.get(bus.name.as_str()).copied().unwrap_or_default();
            let hosted: Vec<&ClassicalGenerator> = self
                .generators
                .iter()
                .filter(|g| g.bus.name == bus.name)
                .collect();
            match hosted.as_slice() {
                [] => {
                    if p.abs() > 1e-9 || q.abs() > 1e-9 {
                        return Err(DeviceError::BusMismatch {
                            bus: bus.name.clone(),
                            p,
                            q,
                        });
                    }
                }
                [generator] => {
                    let init = generator.initialize(bv.v, bv.theta, p, q)?;
                    debug!(
                        generator = %generator.name,
                        p, q,
                        delta = init.delta,
                        e = init.e,
                        "Initialized generator"
                    );
                    point.vars.extend(generator.state_values(&init));
                    point.params.extend(generator.param_values(&init));
                }
                many => {
                    return Err(DeviceError::MultipleGenerators {
                        bus: bus.name.clone(),
                        count: many.len(),
                    });
                }
            }
        }
        Ok(point)
    }
}
