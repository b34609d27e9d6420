//! Dense initial vectors from sparse id -> value mappings.

use crate::error::{DaeError, DaeResult};
use crate::registry::Role;
use crate::system::DaeSystem;
use gd_core::VarId;
use nalgebra::DVector;
use std::collections::HashMap;

impl DaeSystem {
    /// Parameter vector in slot order.
    ///
    /// Mapping entries override declared defaults. Every parameter needs one
    /// or the other.
    pub fn build_init_params_vector(
        &self,
        mapping: &HashMap<VarId, f64>,
    ) -> DaeResult<DVector<f64>> {
        self.reject_unknown(mapping, &[Role::Parameter], Role::Parameter)?;
        let mut p = DVector::zeros(self.n_p());
        for (i, var) in self.parameters().iter().enumerate() {
            p[i] = match mapping.get(&var.id).copied().or(self.param_defaults[i]) {
                Some(v) => v,
                None => {
                    return Err(DaeError::UnresolvedInitialValue {
                        id: var.id.clone(),
                        name: var.name.clone(),
                        role: Role::Parameter,
                    });
                }
            };
        }
        Ok(p)
    }

    /// Combined `[x; y]` vector in slot order.
    ///
    /// Mapping entries override the blocks' initial-guess expressions, which
    /// are evaluated over `params`.
    pub fn build_init_vars_vector_from_uid(
        &self,
        mapping: &HashMap<VarId, f64>,
        params: &[f64],
    ) -> DaeResult<DVector<f64>> {
        self.check_params(params)?;
        self.reject_unknown(mapping, &[Role::State, Role::Algebraic], Role::State)?;
        let n_x = self.n_x();
        let mut z = DVector::zeros(self.n_vars());
        for slot in 0..self.n_vars() {
            let Some(var) = self.registry.var_at(slot) else {
                continue;
            };
            let value = match mapping.get(&var.id) {
                Some(v) => Some(*v),
                None => self.init_c[slot].as_ref().map(|c| c.eval(&[], params)),
            };
            z[slot] = value.ok_or_else(|| DaeError::UnresolvedInitialValue {
                id: var.id.clone(),
                name: var.name.clone(),
                role: if slot < n_x { Role::State } else { Role::Algebraic },
            })?;
        }
        Ok(z)
    }

    fn reject_unknown(
        &self,
        mapping: &HashMap<VarId, f64>,
        accepted: &[Role],
        expected: Role,
    ) -> DaeResult<()> {
        // Sorted so the reported key does not depend on hash order.
        let mut unknown: Vec<&VarId> = mapping
            .keys()
            .filter(|id| {
                self.registry
                    .role_of(id)
                    .is_none_or(|role| !accepted.contains(&role))
            })
            .collect();
        unknown.sort();
        match unknown.first() {
            Some(id) => Err(DaeError::UnknownVariable {
                id: (*id).clone(),
                expected,
            }),
            None => Ok(()),
        }
    }
}
