//! Operator overloads and free functions so models read like equations.

use crate::expr::{BinaryOp, Expr, UnaryOp};
use crate::var::Var;
use std::ops::{Add, Div, Mul, Neg, Sub};

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::constant(value)
    }
}

impl From<&Expr> for Expr {
    fn from(e: &Expr) -> Self {
        e.clone()
    }
}

impl From<Var> for Expr {
    fn from(v: Var) -> Self {
        Expr::Var(v)
    }
}

impl From<&Var> for Expr {
    fn from(v: &Var) -> Self {
        Expr::Var(v.clone())
    }
}

macro_rules! binary_ops {
    ($($trait:ident, $method:ident, $op:expr);* $(;)?) => {$(
        impl<R: Into<Expr>> $trait<R> for Expr {
            type Output = Expr;
            fn $method(self, rhs: R) -> Expr {
                Expr::binary($op, self, rhs.into())
            }
        }

        impl<R: Into<Expr>> $trait<R> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: R) -> Expr {
                Expr::binary($op, self.clone(), rhs.into())
            }
        }

        impl<R: Into<Expr>> $trait<R> for &Var {
            type Output = Expr;
            fn $method(self, rhs: R) -> Expr {
                Expr::binary($op, Expr::from(self), rhs.into())
            }
        }

        impl $trait<Expr> for f64 {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary($op, Expr::constant(self), rhs)
            }
        }

        impl $trait<&Expr> for f64 {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                Expr::binary($op, Expr::constant(self), rhs.clone())
            }
        }

        impl $trait<&Var> for f64 {
            type Output = Expr;
            fn $method(self, rhs: &Var) -> Expr {
                Expr::binary($op, Expr::constant(self), Expr::from(rhs))
            }
        }
    )*};
}

binary_ops! {
    Add, add, BinaryOp::Add;
    Sub, sub, BinaryOp::Sub;
    Mul, mul, BinaryOp::Mul;
    Div, div, BinaryOp::Div;
}

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::neg(self)
    }
}

impl Neg for &Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::neg(self.clone())
    }
}

impl Neg for &Var {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::neg(Expr::from(self))
    }
}

pub fn sin(e: impl Into<Expr>) -> Expr {
    Expr::unary(UnaryOp::Sin, e.into())
}

pub fn cos(e: impl Into<Expr>) -> Expr {
    Expr::unary(UnaryOp::Cos, e.into())
}

pub fn tan(e: impl Into<Expr>) -> Expr {
    Expr::unary(UnaryOp::Tan, e.into())
}

pub fn exp(e: impl Into<Expr>) -> Expr {
    Expr::unary(UnaryOp::Exp, e.into())
}

pub fn ln(e: impl Into<Expr>) -> Expr {
    Expr::unary(UnaryOp::Ln, e.into())
}

pub fn sqrt(e: impl Into<Expr>) -> Expr {
    Expr::unary(UnaryOp::Sqrt, e.into())
}

pub fn abs(e: impl Into<Expr>) -> Expr {
    Expr::unary(UnaryOp::Abs, e.into())
}

pub fn sign(e: impl Into<Expr>) -> Expr {
    Expr::unary(UnaryOp::Sign, e.into())
}

pub fn pow(base: impl Into<Expr>, exponent: impl Into<Expr>) -> Expr {
    Expr::pow(base.into(), exponent.into())
}
