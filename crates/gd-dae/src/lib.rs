//! gd-dae: blocks and the assembled global DAE system.
//!
//! A [`Block`] bundles state variables (with their derivative expressions),
//! algebraic variables (with their constraints) and parameters. [`assemble`]
//! merges a list of blocks into one [`DaeSystem`]:
//!
//! ```text
//! T · ẋ = f(x, y, p)
//!     0 = g(x, y, p)
//! ```
//!
//! with a fixed slot ordering recorded in an [`IndexRegistry`]. All vectors
//! handed to the system (initial points, parameter values, trajectory samples)
//! are indexed by that ordering; ids are only used at the boundary.

pub mod assemble;
pub mod block;
pub mod error;
pub mod init;
pub mod jacobian;
pub mod registry;
pub mod system;

pub use assemble::assemble;
pub use block::{AlgebraicDecl, Block, ParamDecl, StateDecl};
pub use error::{DaeError, DaeResult};
pub use jacobian::{JacobianBlocks, SparseJacobian};
pub use registry::{IndexRegistry, Role};
pub use system::DaeSystem;
