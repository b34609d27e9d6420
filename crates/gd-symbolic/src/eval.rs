//! Evaluation against an id -> value assignment.

use crate::error::{SymbolicError, SymbolicResult};
use crate::expr::Expr;
use gd_core::VarId;
use std::collections::{BTreeMap, HashMap};

/// Source of variable values for [`Expr::eval`].
pub trait Assignment {
    fn value_of(&self, id: &VarId) -> Option<f64>;
}

impl Assignment for HashMap<VarId, f64> {
    fn value_of(&self, id: &VarId) -> Option<f64> {
        self.get(id).copied()
    }
}

impl Assignment for BTreeMap<VarId, f64> {
    fn value_of(&self, id: &VarId) -> Option<f64> {
        self.get(id).copied()
    }
}

impl Expr {
    /// Evaluate the tree. Fails on the first referenced id missing from `assignment`.
    pub fn eval<A: Assignment + ?Sized>(&self, assignment: &A) -> SymbolicResult<f64> {
        match self {
            Expr::Const { value } => Ok(*value),
            Expr::Var(v) => {
                assignment
                    .value_of(&v.id)
                    .ok_or_else(|| SymbolicError::UnboundVariable {
                        id: v.id.clone(),
                        name: v.name.clone(),
                    })
            }
            Expr::Unary { op, arg } => Ok(op.apply(arg.eval(assignment)?)),
            Expr::Binary { op, lhs, rhs } => {
                let a = lhs.eval(assignment)?;
                let b = rhs.eval(assignment)?;
                Ok(op.apply(a, b))
            }
        }
    }
}
