//! Buses and their power-balance variables.

use gd_dae::{AlgebraicDecl, Block};
use gd_symbolic::{Expr, Var};

/// A network node with angle `θ` and magnitude `V`.
///
/// The bus block declares both variables with a zero contribution; the
/// balances are the sums of device injections (generation positive).
#[derive(Clone, Debug, PartialEq)]
pub struct Bus {
    pub name: String,
    pub theta: Var,
    pub v: Var,
}

impl Bus {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            theta: Var::with_id(format!("{name}.theta"), "theta"),
            v: Var::with_id(format!("{name}.v"), "v"),
            name,
        }
    }

    pub fn block(&self) -> Block {
        Block::new(&self.name)
            .algebraic(AlgebraicDecl::new(&self.theta, Expr::zero()))
            .algebraic(AlgebraicDecl::new(&self.v, Expr::zero()))
    }

    /// Contribution `(p, q)` injected into this bus by a device block.
    pub(crate) fn injection(&self, block: Block, p: Expr, q: Expr) -> Block {
        block
            .algebraic(AlgebraicDecl::new(&self.theta, p))
            .algebraic(AlgebraicDecl::new(&self.v, q))
    }
}
