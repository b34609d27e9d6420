//! Full state-space models with parameter inputs and variable outputs.

use crate::error::{LinearError, LinearResult};
use crate::linearize::{LinearizeOptions, factor_gy, scale_rows_by_inverse, time_constants};
use gd_core::VarId;
use gd_dae::{DaeSystem, Role};
use nalgebra::DMatrix;

/// `Δẋ = A·Δx + B·Δu`, `Δo = C·Δx + D·Δu` at one operating point.
///
/// Inputs `u` are parameters; outputs `o` are state or algebraic variables,
/// with algebraic outputs expressed through the eliminated `Δy`.
#[derive(Clone, Debug, PartialEq)]
pub struct StateSpace {
    pub a: DMatrix<f64>,
    pub b: DMatrix<f64>,
    pub c: DMatrix<f64>,
    pub d: DMatrix<f64>,
    pub inputs: Vec<VarId>,
    pub outputs: Vec<VarId>,
}

pub fn linearize_state_space(
    system: &DaeSystem,
    z: &[f64],
    params: &[f64],
    inputs: &[VarId],
    outputs: &[VarId],
    options: &LinearizeOptions,
) -> LinearResult<StateSpace> {
    let registry = system.registry();
    let input_cols = inputs
        .iter()
        .map(|id| registry.param_index(id).ok_or_else(|| LinearError::UnknownInput(id.clone())))
        .collect::<LinearResult<Vec<_>>>()?;

    let n_x = system.n_x();
    let n_y = system.n_y();
    let n_u = inputs.len();

    let t = time_constants(system, params)?;
    let j = system.jacobians(z, params)?;
    let (fp, gp) = system.param_jacobians(z, params)?;
    let fu = fp.select_columns(&input_cols);
    let gu = gp.select_columns(&input_cols);

    // Δy = −gy⁻¹·(gx·Δx + gu·Δu)
    let (y_from_x, y_from_u) = if n_y == 0 {
        (DMatrix::zeros(0, n_x), DMatrix::zeros(0, n_u))
    } else {
        let lu = factor_gy(&j.gy, options)?;
        let singular = || LinearError::SingularAlgebraicJacobian { pivot_ratio: 0.0 };
        let sx = lu.solve(&j.gx).ok_or_else(singular)?;
        let su = lu.solve(&gu).ok_or_else(singular)?;
        (-sx, -su)
    };

    let a = scale_rows_by_inverse(&j.fx + &j.fy * &y_from_x, &t);
    let b = scale_rows_by_inverse(&fu + &j.fy * &y_from_u, &t);

    let mut c = DMatrix::zeros(outputs.len(), n_x);
    let mut d = DMatrix::zeros(outputs.len(), n_u);
    for (row, id) in outputs.iter().enumerate() {
        let index = registry.index_of(id);
        match (registry.role_of(id), index) {
            (Some(Role::State), Some(i)) => c[(row, i)] = 1.0,
            (Some(Role::Algebraic), Some(k)) => {
                c.set_row(row, &y_from_x.row(k));
                d.set_row(row, &y_from_u.row(k));
            }
            _ => return Err(LinearError::UnknownOutput(id.clone())),
        }
    }

    Ok(StateSpace {
        a,
        b,
        c,
        d,
        inputs: inputs.to_vec(),
        outputs: outputs.to_vec(),
    })
}
