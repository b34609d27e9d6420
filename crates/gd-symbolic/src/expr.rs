//! Expression tree and smart constructors.

use crate::var::Var;
use gd_core::VarId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Neg,
    Sin,
    Cos,
    Tan,
    Exp,
    Ln,
    Sqrt,
    Abs,
    /// Sign function, -1/0/+1. Appears in derivatives of `abs`.
    Sign,
}

impl UnaryOp {
    pub fn apply(self, x: f64) -> f64 {
        match self {
            UnaryOp::Neg => -x,
            UnaryOp::Sin => x.sin(),
            UnaryOp::Cos => x.cos(),
            UnaryOp::Tan => x.tan(),
            UnaryOp::Exp => x.exp(),
            UnaryOp::Ln => x.ln(),
            UnaryOp::Sqrt => x.sqrt(),
            UnaryOp::Abs => x.abs(),
            UnaryOp::Sign => {
                if x > 0.0 {
                    1.0
                } else if x < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Sin => "sin",
            UnaryOp::Cos => "cos",
            UnaryOp::Tan => "tan",
            UnaryOp::Exp => "exp",
            UnaryOp::Ln => "ln",
            UnaryOp::Sqrt => "sqrt",
            UnaryOp::Abs => "abs",
            UnaryOp::Sign => "sign",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Pow => a.powf(b),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
        }
    }
}

/// Immutable scalar expression.
///
/// Build trees through the smart constructors (`Expr::add`, `Expr::mul`, ...)
/// or the operator overloads; both fold constants and drop additive/multiplicative
/// identities, so structural zeros stay detectable with [`Expr::is_zero`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    Const {
        value: f64,
    },
    Var(Var),
    Unary {
        op: UnaryOp,
        arg: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn constant(value: f64) -> Self {
        Expr::Const { value }
    }

    pub fn zero() -> Self {
        Self::constant(0.0)
    }

    pub fn one() -> Self {
        Self::constant(1.0)
    }

    pub fn var(v: &Var) -> Self {
        Expr::Var(v.clone())
    }

    pub fn as_const(&self) -> Option<f64> {
        match self {
            Expr::Const { value } => Some(*value),
            _ => None,
        }
    }

    pub fn is_const(&self) -> bool {
        matches!(self, Expr::Const { .. })
    }

    /// Structural zero (the constant 0).
    pub fn is_zero(&self) -> bool {
        self.as_const() == Some(0.0)
    }

    pub fn is_one(&self) -> bool {
        self.as_const() == Some(1.0)
    }

    pub fn unary(op: UnaryOp, arg: Expr) -> Self {
        if let Some(c) = arg.as_const() {
            return Self::constant(op.apply(c));
        }
        if op == UnaryOp::Neg {
            if let Expr::Unary {
                op: UnaryOp::Neg,
                arg: inner,
            } = arg
            {
                return *inner;
            }
        }
        Expr::Unary {
            op,
            arg: Box::new(arg),
        }
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        match op {
            BinaryOp::Add => Self::add(lhs, rhs),
            BinaryOp::Sub => Self::sub(lhs, rhs),
            BinaryOp::Mul => Self::mul(lhs, rhs),
            BinaryOp::Div => Self::div(lhs, rhs),
            BinaryOp::Pow => Self::pow(lhs, rhs),
        }
    }

    fn raw(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn add(lhs: Expr, rhs: Expr) -> Self {
        match (lhs.as_const(), rhs.as_const()) {
            (Some(a), Some(b)) => Self::constant(a + b),
            (Some(a), _) if a == 0.0 => rhs,
            (_, Some(b)) if b == 0.0 => lhs,
            _ => Self::raw(BinaryOp::Add, lhs, rhs),
        }
    }

    pub fn sub(lhs: Expr, rhs: Expr) -> Self {
        match (lhs.as_const(), rhs.as_const()) {
            (Some(a), Some(b)) => Self::constant(a - b),
            (_, Some(b)) if b == 0.0 => lhs,
            (Some(a), _) if a == 0.0 => Self::neg(rhs),
            _ => Self::raw(BinaryOp::Sub, lhs, rhs),
        }
    }

    pub fn mul(lhs: Expr, rhs: Expr) -> Self {
        match (lhs.as_const(), rhs.as_const()) {
            (Some(a), Some(b)) => Self::constant(a * b),
            (Some(a), _) if a == 0.0 => Self::zero(),
            (_, Some(b)) if b == 0.0 => Self::zero(),
            (Some(a), _) if a == 1.0 => rhs,
            (_, Some(b)) if b == 1.0 => lhs,
            (Some(a), _) if a == -1.0 => Self::neg(rhs),
            (_, Some(b)) if b == -1.0 => Self::neg(lhs),
            _ => Self::raw(BinaryOp::Mul, lhs, rhs),
        }
    }

    pub fn div(lhs: Expr, rhs: Expr) -> Self {
        match (lhs.as_const(), rhs.as_const()) {
            (Some(a), Some(b)) => Self::constant(a / b),
            (Some(a), _) if a == 0.0 => Self::zero(),
            (_, Some(b)) if b == 1.0 => lhs,
            _ => Self::raw(BinaryOp::Div, lhs, rhs),
        }
    }

    pub fn pow(base: Expr, exponent: Expr) -> Self {
        match (base.as_const(), exponent.as_const()) {
            (Some(a), Some(b)) => Self::constant(a.powf(b)),
            (_, Some(b)) if b == 0.0 => Self::one(),
            (_, Some(b)) if b == 1.0 => base,
            _ => Self::raw(BinaryOp::Pow, base, exponent),
        }
    }

    pub fn neg(arg: Expr) -> Self {
        Self::unary(UnaryOp::Neg, arg)
    }

    /// True if `id` appears anywhere in the tree.
    pub fn depends_on(&self, id: &VarId) -> bool {
        match self {
            Expr::Const { .. } => false,
            Expr::Var(v) => &v.id == id,
            Expr::Unary { arg, .. } => arg.depends_on(id),
            Expr::Binary { lhs, rhs, .. } => lhs.depends_on(id) || rhs.depends_on(id),
        }
    }

    /// Referenced variables, each once, in first-seen (left to right) order.
    pub fn free_vars(&self) -> Vec<Var> {
        let mut out: Vec<Var> = Vec::new();
        self.collect_vars(&mut out);
        out
    }

    fn collect_vars(&self, out: &mut Vec<Var>) {
        match self {
            Expr::Const { .. } => {}
            Expr::Var(v) => {
                if !out.iter().any(|seen| seen.id == v.id) {
                    out.push(v.clone());
                }
            }
            Expr::Unary { arg, .. } => arg.collect_vars(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_vars(out);
                rhs.collect_vars(out);
            }
        }
    }

    /// Replace every reference to `id` by `with`, re-simplifying on the way up.
    pub fn substitute(&self, id: &VarId, with: &Expr) -> Expr {
        match self {
            Expr::Const { .. } => self.clone(),
            Expr::Var(v) => {
                if &v.id == id {
                    with.clone()
                } else {
                    self.clone()
                }
            }
            Expr::Unary { op, arg } => Expr::unary(*op, arg.substitute(id, with)),
            Expr::Binary { op, lhs, rhs } => {
                Expr::binary(*op, lhs.substitute(id, with), rhs.substitute(id, with))
            }
        }
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        match self {
            Expr::Const { .. } | Expr::Var(_) => 1,
            Expr::Unary { arg, .. } => 1 + arg.size(),
            Expr::Binary { lhs, rhs, .. } => 1 + lhs.size() + rhs.size(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const { value } => write!(f, "{value}"),
            Expr::Var(v) => write!(f, "{v}"),
            Expr::Unary {
                op: UnaryOp::Neg,
                arg,
            } => write!(f, "-({arg})"),
            Expr::Unary { op, arg } => write!(f, "{}({arg})", op.name()),
            Expr::Binary { op, lhs, rhs } => write!(f, "({lhs} {} {rhs})", op.symbol()),
        }
    }
}
