//! Nonlinear root finding for implicit time steps and equilibrium solves.
//!
//! [`newton_solve`] is a pure function of an initial guess, a residual
//! function, a Jacobian function and a [`NewtonConfig`]; it knows nothing
//! about time stepping. [`jacobian`] provides finite-difference Jacobians,
//! used to cross-check symbolic ones.

pub mod error;
pub mod jacobian;
pub mod newton;

pub use error::{SolverError, SolverResult};
pub use jacobian::{Difference, finite_difference_jacobian};
pub use newton::{NewtonConfig, NewtonResult, newton_solve};
