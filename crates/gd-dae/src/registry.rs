//! Stable id -> slot mapping built once at assembly.

use gd_core::VarId;
use gd_symbolic::{Slot, SymbolTable, Var};
use std::collections::HashMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    State,
    Algebraic,
    Parameter,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::State => "state",
            Role::Algebraic => "algebraic variable",
            Role::Parameter => "parameter",
        })
    }
}

#[derive(Clone, Debug)]
struct Entry {
    role: Role,
    index: usize,
    owner: usize,
}

/// Registry of every declared variable and parameter.
///
/// Each (id, role) pair owns exactly one slot. States take indices `0..n_x`,
/// algebraic variables `0..n_y` (or `n_x..n_x+n_y` in the combined vector),
/// parameters `0..n_p`. Indices follow first declaration order.
#[derive(Clone, Debug, Default)]
pub struct IndexRegistry {
    states: Vec<Var>,
    algebraics: Vec<Var>,
    params: Vec<Var>,
    entries: HashMap<VarId, Entry>,
    block_names: Vec<String>,
}

impl IndexRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_block(&mut self, name: &str) -> usize {
        self.block_names.push(name.to_string());
        self.block_names.len() - 1
    }

    /// Register a declaration. Returns `Ok(index)` within the role, or the
    /// role already held by the id if it differs.
    pub(crate) fn declare(&mut self, var: &Var, role: Role, owner: usize) -> Result<usize, Role> {
        if let Some(entry) = self.entries.get(&var.id) {
            return if entry.role == role {
                Ok(entry.index)
            } else {
                Err(entry.role)
            };
        }
        let list = match role {
            Role::State => &mut self.states,
            Role::Algebraic => &mut self.algebraics,
            Role::Parameter => &mut self.params,
        };
        let index = list.len();
        list.push(var.clone());
        self.entries.insert(var.id.clone(), Entry { role, index, owner });
        Ok(index)
    }

    pub fn n_x(&self) -> usize {
        self.states.len()
    }

    pub fn n_y(&self) -> usize {
        self.algebraics.len()
    }

    pub fn n_p(&self) -> usize {
        self.params.len()
    }

    /// Length of the combined variable vector `[x; y]`.
    pub fn n_vars(&self) -> usize {
        self.n_x() + self.n_y()
    }

    pub fn states(&self) -> &[Var] {
        &self.states
    }

    pub fn algebraics(&self) -> &[Var] {
        &self.algebraics
    }

    pub fn params(&self) -> &[Var] {
        &self.params
    }

    /// Variable at a combined-vector slot.
    pub fn var_at(&self, slot: usize) -> Option<&Var> {
        if slot < self.n_x() {
            self.states.get(slot)
        } else {
            self.algebraics.get(slot - self.n_x())
        }
    }

    pub fn role_of(&self, id: &VarId) -> Option<Role> {
        self.entries.get(id).map(|e| e.role)
    }

    /// Index within the id's own role vector (x, y or p).
    pub fn index_of(&self, id: &VarId) -> Option<usize> {
        self.entries.get(id).map(|e| e.index)
    }

    /// Index into the combined vector `[x; y]`; `None` for parameters.
    pub fn var_index(&self, id: &VarId) -> Option<usize> {
        let e = self.entries.get(id)?;
        match e.role {
            Role::State => Some(e.index),
            Role::Algebraic => Some(self.n_x() + e.index),
            Role::Parameter => None,
        }
    }

    pub fn param_index(&self, id: &VarId) -> Option<usize> {
        let e = self.entries.get(id)?;
        (e.role == Role::Parameter).then_some(e.index)
    }

    /// Name of the block that first declared `id`.
    pub fn var_owner(&self, id: &VarId) -> Option<&str> {
        let e = self.entries.get(id)?;
        self.block_names.get(e.owner).map(String::as_str)
    }

    /// Names of all assembled blocks in visit order.
    pub fn block_names(&self) -> &[String] {
        &self.block_names
    }

    /// `block.name` for the variable at a combined slot, for reports.
    pub fn qualified_name(&self, slot: usize) -> Option<String> {
        let var = self.var_at(slot)?;
        Some(match self.var_owner(&var.id) {
            Some(owner) => format!("{owner}.{}", var.name),
            None => var.name.clone(),
        })
    }
}

impl SymbolTable for IndexRegistry {
    fn resolve(&self, id: &VarId) -> Option<Slot> {
        let e = self.entries.get(id)?;
        Some(match e.role {
            Role::State => Slot::Var(e.index),
            Role::Algebraic => Slot::Var(self.n_x() + e.index),
            Role::Parameter => Slot::Param(e.index),
        })
    }
}
