//! Classical synchronous machine: constant EMF behind transient reactance.
//!
//! ```text
//!       δ' = ωb (ω − 1)
//!     M ω' = pm − pe − D (ω − 1)
//!       pe = E V sin(δ − θ) / xd
//!       qe = (E V cos(δ − θ) − V²) / xd
//! ```

use crate::bus::Bus;
use crate::error::{DeviceError, DeviceResult};
use gd_core::VarId;
use gd_dae::{Block, ParamDecl, StateDecl};
use gd_symbolic::{Expr, Var, cos, sin};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorParams {
    /// Transient reactance.
    pub xd: f64,
    /// Inertia constant `2H` on the system base.
    pub m: f64,
    pub d: f64,
    /// Nominal frequency in Hz.
    pub fn_hz: f64,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            xd: 0.3,
            m: 13.0,
            d: 10.0,
            fn_hz: 60.0,
        }
    }
}

impl GeneratorParams {
    fn validate(&self, device: &str) -> DeviceResult<()> {
        let invalid = |what| DeviceError::InvalidParameter {
            device: device.to_string(),
            what,
        };
        if !(self.xd.is_finite() && self.xd > 0.0) {
            return Err(invalid("xd must be positive"));
        }
        if !(self.m.is_finite() && self.m > 0.0) {
            return Err(invalid("inertia must be positive"));
        }
        if !(self.d.is_finite() && self.d >= 0.0) {
            return Err(invalid("damping must be non-negative"));
        }
        if !(self.fn_hz.is_finite() && self.fn_hz > 0.0) {
            return Err(invalid("nominal frequency must be positive"));
        }
        Ok(())
    }
}

/// Steady-state quantities of a machine delivering a given injection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeneratorInit {
    pub delta: f64,
    pub e: f64,
    pub pm: f64,
}

#[derive(Clone, Debug)]
pub struct ClassicalGenerator {
    pub name: String,
    pub bus: Bus,
    pub params: GeneratorParams,
    pub delta: Var,
    pub omega: Var,
    pub e: Var,
    pub pm: Var,
    pub xd: Var,
    pub m: Var,
    pub d: Var,
    pub wb: Var,
}

impl ClassicalGenerator {
    pub fn new(name: impl Into<String>, bus: &Bus, params: GeneratorParams) -> DeviceResult<Self> {
        let name = name.into();
        params.validate(&name)?;
        let v = |local: &str| Var::with_id(format!("{name}.{local}"), local);
        Ok(Self {
            delta: v("delta"),
            omega: v("omega"),
            e: v("E"),
            pm: v("pm"),
            xd: v("xd"),
            m: v("M"),
            d: v("D"),
            wb: v("wb"),
            bus: bus.clone(),
            params,
            name,
        })
    }

    /// Electrical active power delivered to the bus.
    pub fn pe(&self) -> Expr {
        &self.e * &self.bus.v * sin(&self.delta - &self.bus.theta) / &self.xd
    }

    /// Electrical reactive power delivered to the bus.
    pub fn qe(&self) -> Expr {
        (&self.e * &self.bus.v * cos(&self.delta - &self.bus.theta) - &self.bus.v * &self.bus.v)
            / &self.xd
    }

    pub fn block(&self) -> Block {
        let slip = &self.omega - 1.0;
        let swing = &self.pm - self.pe() - &self.d * &slip;
        let block = Block::new(&self.name)
            .state(StateDecl::new(&self.delta, &self.wb * &slip))
            .state(
                StateDecl::new(&self.omega, swing)
                    .with_time_constant(&self.m)
                    .with_init(1.0),
            )
            .param(ParamDecl::new(&self.xd).with_value(self.params.xd))
            .param(ParamDecl::new(&self.m).with_value(self.params.m))
            .param(ParamDecl::new(&self.d).with_value(self.params.d))
            .param(ParamDecl::new(&self.wb).with_value(2.0 * PI * self.params.fn_hz))
            .param(ParamDecl::new(&self.e))
            .param(ParamDecl::new(&self.pm));
        self.bus.injection(block, self.pe(), self.qe())
    }

    /// Rotor angle, internal EMF and mechanical power that hold the machine
    /// in equilibrium at bus voltage `v∠theta` while injecting `p + jq`.
    pub fn initialize(&self, v: f64, theta: f64, p: f64, q: f64) -> DeviceResult<GeneratorInit> {
        if !(v.is_finite() && v > 0.0) {
            return Err(DeviceError::InvalidParameter {
                device: self.name.clone(),
                what: "terminal voltage must be positive",
            });
        }
        let vt = Complex64::from_polar(v, theta);
        let current = (Complex64::new(p, q) / vt).conj();
        let emf = vt + Complex64::new(0.0, self.params.xd) * current;
        Ok(GeneratorInit {
            delta: emf.arg(),
            e: emf.norm(),
            pm: p,
        })
    }

    /// Initial values of the machine's states.
    pub fn state_values(&self, init: &GeneratorInit) -> [(VarId, f64); 2] {
        [(self.delta.id.clone(), init.delta), (self.omega.id.clone(), 1.0)]
    }

    /// Values of the parameters left free by [`ClassicalGenerator::block`].
    pub fn param_values(&self, init: &GeneratorInit) -> [(VarId, f64); 2] {
        [(self.e.id.clone(), init.e), (self.pm.id.clone(), init.pm)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> ClassicalGenerator {
        ClassicalGenerator::new("g1", &Bus::new("b1"), GeneratorParams::default()).unwrap()
    }

    #[test]
    fn initialization_reproduces_injection() {
        let g = machine();
        let (v, theta, p, q) = (1.02, -0.1, 0.8, 0.25);
        let init = g.initialize(v, theta, p, q).unwrap();
        let xd = g.params.xd;
        let pe = init.e * v * (init.delta - theta).sin() / xd;
        let qe = (init.e * v * (init.delta - theta).cos() - v * v) / xd;
        assert!((pe - p).abs() < 1e-12);
        assert!((qe - q).abs() < 1e-12);
        assert_eq!(init.pm, p);
    }

    #[test]
    fn rejects_nonpositive_reactance() {
        let params = GeneratorParams {
            xd: 0.0,
            ..GeneratorParams::default()
        };
        let err = ClassicalGenerator::new("g", &Bus::new("b"), params).unwrap_err();
        assert!(matches!(err, DeviceError::InvalidParameter { .. }));
    }

    #[test]
    fn block_contributes_to_bus_balances() {
        let g = machine();
        let block = g.block();
        assert_eq!(block.states.len(), 2);
        assert_eq!(block.algebraics.len(), 2);
        assert_eq!(block.algebraics[0].var, g.bus.theta);
        assert_eq!(block.algebraics[1].var, g.bus.v);
    }
}
