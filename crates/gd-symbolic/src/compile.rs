//! Slot-indexed expressions for hot evaluation loops.
//!
//! An [`Expr`] refers to variables by id. Once a system is assembled, every id
//! maps to a fixed slot, either in the combined variable vector `[x; y]` or in
//! the parameter vector `p`. Compiling resolves the ids once so Newton iterations
//! evaluate against plain slices with no lookups.

use crate::error::{SymbolicError, SymbolicResult};
use crate::expr::{BinaryOp, Expr, UnaryOp};
use gd_core::VarId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Index into the combined variable vector `[x; y]`.
    Var(usize),
    /// Index into the parameter vector.
    Param(usize),
}

/// Resolves variable ids to slots. Implemented by the assembler's index registry.
pub trait SymbolTable {
    fn resolve(&self, id: &VarId) -> Option<Slot>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum Compiled {
    Const(f64),
    Var(usize),
    Param(usize),
    Unary(UnaryOp, Box<Compiled>),
    Binary(BinaryOp, Box<Compiled>, Box<Compiled>),
}

impl Compiled {
    /// Evaluate against dense vectors.
    ///
    /// Slot indices come from the same table the slices are laid out by, so
    /// indexing is in bounds whenever the slices have the assembled lengths.
    pub fn eval(&self, vars: &[f64], params: &[f64]) -> f64 {
        match self {
            Compiled::Const(c) => *c,
            Compiled::Var(i) => vars[*i],
            Compiled::Param(j) => params[*j],
            Compiled::Unary(op, arg) => op.apply(arg.eval(vars, params)),
            Compiled::Binary(op, a, b) => op.apply(a.eval(vars, params), b.eval(vars, params)),
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Compiled::Const(c) if *c == 0.0)
    }

    /// True if the expression reads no variable slot (parameters and constants only).
    pub fn is_var_free(&self) -> bool {
        match self {
            Compiled::Const(_) | Compiled::Param(_) => true,
            Compiled::Var(_) => false,
            Compiled::Unary(_, a) => a.is_var_free(),
            Compiled::Binary(_, a, b) => a.is_var_free() && b.is_var_free(),
        }
    }
}

impl Expr {
    pub fn compile<T: SymbolTable + ?Sized>(&self, table: &T) -> SymbolicResult<Compiled> {
        Ok(match self {
            Expr::Const { value } => Compiled::Const(*value),
            Expr::Var(v) => match table.resolve(&v.id) {
                Some(Slot::Var(i)) => Compiled::Var(i),
                Some(Slot::Param(j)) => Compiled::Param(j),
                None => {
                    return Err(SymbolicError::UnresolvedSymbol {
                        id: v.id.clone(),
                        name: v.name.clone(),
                    });
                }
            },
            Expr::Unary { op, arg } => Compiled::Unary(*op, Box::new(arg.compile(table)?)),
            Expr::Binary { op, lhs, rhs } => Compiled::Binary(
                *op,
                Box::new(lhs.compile(table)?),
                Box::new(rhs.compile(table)?),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::exp;
    use crate::var::Var;
    use std::collections::HashMap;

    struct Table(HashMap<VarId, Slot>);

    impl SymbolTable for Table {
        fn resolve(&self, id: &VarId) -> Option<Slot> {
            self.0.get(id).copied()
        }
    }

    #[test]
    fn compiled_matches_tree_evaluation() {
        let x = Var::named("x");
        let k = Var::named("k");
        let e = &k * exp(&x) - 2.0 * &x;
        let table = Table(HashMap::from([
            (x.id.clone(), Slot::Var(1)),
            (k.id.clone(), Slot::Param(0)),
        ]));
        let c = e.compile(&table).unwrap();

        let assignment = HashMap::from([(x.id.clone(), 0.5), (k.id.clone(), 3.0)]);
        let expected = e.eval(&assignment).unwrap();
        assert_eq!(c.eval(&[9.0, 0.5], &[3.0]), expected);
        assert!(!c.is_var_free());
    }

    #[test]
    fn unknown_id_is_unresolved() {
        let x = Var::named("x");
        let table = Table(HashMap::new());
        let err = (&x + 1.0).compile(&table).unwrap_err();
        assert!(matches!(err, SymbolicError::UnresolvedSymbol { .. }));
    }
}
