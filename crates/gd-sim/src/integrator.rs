//! Implicit theta-method integrators.
//!
//! One step from `(zₙ, pₙ)` to `(z₊, p₊)` solves
//!
//! ```text
//! T·(x₊ − xₙ) − h·θ·f(z₊, p₊) − h·(1−θ)·f(zₙ, pₙ) = 0
//!                                     g(z₊, p₊) = 0
//! ```
//!
//! for `z₊ = [x₊; y₊]` by Newton, with Jacobian
//! `[[T − hθ·fx, −hθ·fy], [gx, gy]]`.

use crate::error::{SimError, SimResult};
use gd_dae::{DaeError, DaeSystem};
use gd_solver::{NewtonConfig, NewtonResult, SolverError, SolverResult, newton_solve};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trait for implicit time integrators.
pub trait Integrator {
    /// Weight of the end-of-step derivative.
    fn theta(&self) -> f64;

    /// Advance one step of length `h`.
    fn step(
        &self,
        system: &DaeSystem,
        z_n: &DVector<f64>,
        p_n: &DVector<f64>,
        p_next: &DVector<f64>,
        h: f64,
        config: &NewtonConfig,
    ) -> SolverResult<NewtonResult> {
        theta_step(self.theta(), system, z_n, p_n, p_next, h, config)
    }
}

/// Backward Euler, first order, `f` at the step end only.
#[derive(Clone, Copy, Debug)]
pub struct ImplicitEuler;

impl Integrator for ImplicitEuler {
    fn theta(&self) -> f64 {
        1.0
    }
}

/// Trapezoidal rule, second order, averages `f` over the step.
#[derive(Clone, Copy, Debug)]
pub struct Trapezoidal;

impl Integrator for Trapezoidal {
    fn theta(&self) -> f64 {
        0.5
    }
}

/// Integrator selection for simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    #[default]
    #[serde(alias = "backward_euler")]
    ImplicitEuler,
    Trapezoidal,
}

impl Method {
    pub fn integrator(self) -> &'static dyn Integrator {
        match self {
            Method::ImplicitEuler => &ImplicitEuler,
            Method::Trapezoidal => &Trapezoidal,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::ImplicitEuler => "implicit-euler",
            Method::Trapezoidal => "trapezoidal",
        })
    }
}

impl FromStr for Method {
    type Err = SimError;

    fn from_str(s: &str) -> SimResult<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "implicit-euler" | "backward-euler" | "backeuler" | "euler" => {
                Ok(Method::ImplicitEuler)
            }
            "trapezoidal" | "trapezoid" => Ok(Method::Trapezoidal),
            _ => Err(SimError::UnknownMethod(s.to_string())),
        }
    }
}

fn eval_err(e: DaeError) -> SolverError {
    SolverError::Evaluation {
        what: e.to_string(),
    }
}

fn theta_step(
    theta: f64,
    system: &DaeSystem,
    z_n: &DVector<f64>,
    p_n: &DVector<f64>,
    p_next: &DVector<f64>,
    h: f64,
    config: &NewtonConfig,
) -> SolverResult<NewtonResult> {
    let n_x = system.n_x();
    let n_y = system.n_y();
    let t_diag = system.eval_t(p_next.as_slice()).map_err(eval_err)?;

    // Explicit part of the step, fixed during the Newton solve.
    let carried = if theta < 1.0 {
        let f_n = system
            .eval_f(z_n.as_slice(), p_n.as_slice())
            .map_err(eval_err)?;
        f_n * (h * (1.0 - theta))
    } else {
        DVector::zeros(n_x)
    };
    let x_n = z_n.rows(0, n_x).into_owned();

    let residual = |z: &DVector<f64>| -> SolverResult<DVector<f64>> {
        let f = system
            .eval_f(z.as_slice(), p_next.as_slice())
            .map_err(eval_err)?;
        let g = system
            .eval_g(z.as_slice(), p_next.as_slice())
            .map_err(eval_err)?;
        let mut r = DVector::zeros(n_x + n_y);
        for i in 0..n_x {
            r[i] = t_diag[i] * (z[i] - x_n[i]) - h * theta * f[i] - carried[i];
        }
        r.rows_mut(n_x, n_y).copy_from(&g);
        Ok(r)
    };

    let jacobian = |z: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
        let j = system
            .jacobians(z.as_slice(), p_next.as_slice())
            .map_err(eval_err)?;
        let mut m = DMatrix::zeros(n_x + n_y, n_x + n_y);
        m.view_mut((0, 0), (n_x, n_x)).copy_from(&(j.fx * (-h * theta)));
        for i in 0..n_x {
            m[(i, i)] += t_diag[i];
        }
        m.view_mut((0, n_x), (n_x, n_y)).copy_from(&(j.fy * (-h * theta)));
        m.view_mut((n_x, 0), (n_y, n_x)).copy_from(&j.gx);
        m.view_mut((n_x, n_x), (n_y, n_y)).copy_from(&j.gy);
        Ok(m)
    };

    newton_solve(z_n.clone(), residual, jacobian, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parsing() {
        assert_eq!("implicit-euler".parse::<Method>().unwrap(), Method::ImplicitEuler);
        assert_eq!("BackEuler".parse::<Method>().unwrap(), Method::ImplicitEuler);
        assert_eq!("trapezoidal".parse::<Method>().unwrap(), Method::Trapezoidal);
        assert!("rk4".parse::<Method>().is_err());
        assert_eq!(Method::default(), Method::ImplicitEuler);
    }

    #[test]
    fn theta_weights() {
        assert_eq!(Method::ImplicitEuler.integrator().theta(), 1.0);
        assert_eq!(Method::Trapezoidal.integrator().theta(), 0.5);
    }
}
