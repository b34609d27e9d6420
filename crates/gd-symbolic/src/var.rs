//! Symbolic variable references.

use gd_core::VarId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named reference to a numeric slot.
///
/// Identity is carried by `id` only; `name` is for humans. The role of the
/// variable (state, algebraic, parameter) is decided by the block that declares it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Var {
    pub id: VarId,
    pub name: String,
}

impl Var {
    /// New variable with a fresh unique id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: VarId::fresh(),
            name: name.into(),
        }
    }

    /// Variable with an explicit id, for models that must be reproducible.
    pub fn with_id(id: impl Into<VarId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Variable whose id equals its name.
    pub fn named(name: &str) -> Self {
        Self::with_id(name, name)
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
