//! Exact partial differentiation by structural recursion.

use crate::expr::{BinaryOp, Expr, UnaryOp};
use gd_core::VarId;

impl Expr {
    /// Partial derivative with respect to `wrt`.
    ///
    /// Total: every operator has a rule. Subtrees that do not reference `wrt`
    /// differentiate to the constant zero without being visited.
    pub fn diff(&self, wrt: &VarId) -> Expr {
        if !self.depends_on(wrt) {
            return Expr::zero();
        }
        match self {
            Expr::Const { .. } => Expr::zero(),
            Expr::Var(_) => Expr::one(),
            Expr::Unary { op, arg } => {
                let u = arg.as_ref().clone();
                let du = arg.diff(wrt);
                let outer = match op {
                    UnaryOp::Neg => return Expr::neg(du),
                    UnaryOp::Sin => Expr::unary(UnaryOp::Cos, u),
                    UnaryOp::Cos => Expr::neg(Expr::unary(UnaryOp::Sin, u)),
                    UnaryOp::Tan => Expr::div(
                        Expr::one(),
                        Expr::pow(Expr::unary(UnaryOp::Cos, u), Expr::constant(2.0)),
                    ),
                    UnaryOp::Exp => Expr::unary(UnaryOp::Exp, u),
                    UnaryOp::Ln => return Expr::div(du, u),
                    UnaryOp::Sqrt => Expr::div(
                        Expr::one(),
                        Expr::mul(Expr::constant(2.0), Expr::unary(UnaryOp::Sqrt, u)),
                    ),
                    UnaryOp::Abs => Expr::unary(UnaryOp::Sign, u),
                    // Piecewise constant; derivative zero away from the jump.
                    UnaryOp::Sign => return Expr::zero(),
                };
                Expr::mul(outer, du)
            }
            Expr::Binary { op, lhs, rhs } => {
                let da = lhs.diff(wrt);
                let db = rhs.diff(wrt);
                let a = lhs.as_ref().clone();
                let b = rhs.as_ref().clone();
                match op {
                    BinaryOp::Add => Expr::add(da, db),
                    BinaryOp::Sub => Expr::sub(da, db),
                    BinaryOp::Mul => Expr::add(Expr::mul(da, b), Expr::mul(a, db)),
                    BinaryOp::Div => Expr::div(
                        Expr::sub(Expr::mul(da, b.clone()), Expr::mul(a, db)),
                        Expr::pow(b, Expr::constant(2.0)),
                    ),
                    BinaryOp::Pow => {
                        if db.is_zero() {
                            // d(a^c) = c * a^(c-1) * a'
                            let reduced = Expr::sub(b.clone(), Expr::one());
                            Expr::mul(Expr::mul(b, Expr::pow(a, reduced)), da)
                        } else {
                            // d(a^b) = a^b * (b' ln a + b a' / a)
                            let pow = Expr::pow(a.clone(), b.clone());
                            let term1 = Expr::mul(db, Expr::unary(UnaryOp::Ln, a.clone()));
                            let term2 = Expr::div(Expr::mul(b, da), a);
                            Expr::mul(pow, Expr::add(term1, term2))
                        }
                    }
                }
            }
        }
    }
}
