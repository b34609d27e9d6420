//! Constant-power load.

use crate::bus::Bus;
use crate::error::{DeviceError, DeviceResult};
use gd_dae::{Block, ParamDecl};
use gd_symbolic::{Expr, Var};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadParams {
    pub p: f64,
    pub q: f64,
}

/// Draws `P_L + jQ_L` regardless of voltage. `P_L` and `Q_L` are parameters so
/// load steps can be scheduled as events.
#[derive(Clone, Debug)]
pub struct ConstantPowerLoad {
    pub name: String,
    pub bus: Bus,
    pub params: LoadParams,
    pub p: Var,
    pub q: Var,
}

impl ConstantPowerLoad {
    pub fn new(name: impl Into<String>, bus: &Bus, params: LoadParams) -> DeviceResult<Self> {
        let name = name.into();
        if !(params.p.is_finite() && params.q.is_finite()) {
            return Err(DeviceError::InvalidParameter {
                device: name,
                what: "load power must be finite",
            });
        }
        Ok(Self {
            p: Var::with_id(format!("{name}.P_L"), "P_L"),
            q: Var::with_id(format!("{name}.Q_L"), "Q_L"),
            bus: bus.clone(),
            params,
            name,
        })
    }

    pub fn block(&self) -> Block {
        let block = Block::new(&self.name)
            .param(ParamDecl::new(&self.p).with_value(self.params.p))
            .param(ParamDecl::new(&self.q).with_value(self.params.q));
        self.bus
            .injection(block, -Expr::from(&self.p), -Expr::from(&self.q))
    }
}
