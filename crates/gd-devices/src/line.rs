//! π-equivalent transmission line.

use crate::bus::Bus;
use crate::error::{DeviceError, DeviceResult};
use gd_dae::{Block, ParamDecl};
use gd_symbolic::{Expr, Var, cos, sin};
use serde::{Deserialize, Serialize};

/// Series impedance `r + jx` and total shunt susceptance `b`, split evenly
/// between both ends.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineParams {
    pub r: f64,
    pub x: f64,
    pub b: f64,
}

impl Default for LineParams {
    fn default() -> Self {
        Self {
            r: 0.0,
            x: 0.1,
            b: 0.0,
        }
    }
}

/// Power leaving each end of a line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineFlows {
    pub p_from: f64,
    pub q_from: f64,
    pub p_to: f64,
    pub q_to: f64,
}

impl LineParams {
    fn series_admittance(&self) -> (f64, f64) {
        let z2 = self.r * self.r + self.x * self.x;
        (self.r / z2, -self.x / z2)
    }

    /// Numeric flows for given end voltages.
    pub fn flows(&self, v_from: f64, theta_from: f64, v_to: f64, theta_to: f64) -> LineFlows {
        let (g, bs) = self.series_admittance();
        let half = self.b / 2.0;
        let end = |vi: f64, vj: f64, tij: f64| {
            let p = vi * vi * g - vi * vj * (g * tij.cos() + bs * tij.sin());
            let q = -vi * vi * (bs + half) - vi * vj * (g * tij.sin() - bs * tij.cos());
            (p, q)
        };
        let (p_from, q_from) = end(v_from, v_to, theta_from - theta_to);
        let (p_to, q_to) = end(v_to, v_from, theta_to - theta_from);
        LineFlows {
            p_from,
            q_from,
            p_to,
            q_to,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Line {
    pub name: String,
    pub from: Bus,
    pub to: Bus,
    pub params: LineParams,
    pub r: Var,
    pub x: Var,
    pub b: Var,
}

impl Line {
    pub fn new(
        name: impl Into<String>,
        from: &Bus,
        to: &Bus,
        params: LineParams,
    ) -> DeviceResult<Self> {
        let name = name.into();
        let invalid = |what| DeviceError::InvalidParameter {
            device: name.clone(),
            what,
        };
        if from.name == to.name {
            return Err(invalid("both ends on the same bus"));
        }
        if !(params.r.is_finite() && params.x.is_finite() && params.b.is_finite()) {
            return Err(invalid("impedance must be finite"));
        }
        if params.r < 0.0 {
            return Err(invalid("resistance must be non-negative"));
        }
        if params.r == 0.0 && params.x == 0.0 {
            return Err(invalid("series impedance must be nonzero"));
        }
        let v = |local: &str| Var::with_id(format!("{name}.{local}"), local);
        Ok(Self {
            r: v("r"),
            x: v("x"),
            b: v("b"),
            from: from.clone(),
            to: to.clone(),
            params,
            name,
        })
    }

    /// Symbolic `(p, q)` leaving bus `i` towards bus `j`.
    fn flow_exprs(&self, i: &Bus, j: &Bus) -> (Expr, Expr) {
        let z2 = &self.r * &self.r + &self.x * &self.x;
        let g = &self.r / &z2;
        let bs = -(&self.x / &z2);
        let tij = &i.theta - &j.theta;
        let vivj = &i.v * &j.v;
        let vi2 = &i.v * &i.v;
        let p = &vi2 * &g - &vivj * (&g * cos(&tij) + &bs * sin(&tij));
        let q = -(&vi2 * (&bs + &self.b / 2.0)) - vivj * (&g * sin(&tij) - &bs * cos(&tij));
        (p, q)
    }

    pub fn block(&self) -> Block {
        let block = Block::new(&self.name)
            .param(ParamDecl::new(&self.r).with_value(self.params.r))
            .param(ParamDecl::new(&self.x).with_value(self.params.x))
            .param(ParamDecl::new(&self.b).with_value(self.params.b));
        let (p_ij, q_ij) = self.flow_exprs(&self.from, &self.to);
        let (p_ji, q_ji) = self.flow_exprs(&self.to, &self.from);
        let block = self.from.injection(block, -p_ij, -q_ij);
        self.to.injection(block, -p_ji, -q_ji)
    }
}
