//! Symbolic scalar expressions for DAE models.
//!
//! Expressions are immutable trees over constants, variable references and
//! arithmetic/transcendental operators. They support:
//! - exact partial differentiation (a new tree, never a numeric estimate)
//! - evaluation against an id -> value assignment
//! - compilation into slot-indexed form through an explicit symbol table,
//!   which is what the assembled system evaluates inside Newton loops

pub mod compile;
pub mod error;
pub mod eval;
pub mod expr;
pub mod ops;
pub mod var;

mod diff;

pub use compile::{Compiled, Slot, SymbolTable};
pub use error::{SymbolicError, SymbolicResult};
pub use eval::Assignment;
pub use expr::{BinaryOp, Expr, UnaryOp};
pub use ops::{abs, cos, exp, ln, pow, sign, sin, sqrt, tan};
pub use var::Var;
