//! Linearization of assembled DAE systems around an operating point.
//!
//! The algebraic variables are eliminated through the Schur complement
//!
//! ```text
//! A = T⁻¹ · (fx − fy · gy⁻¹ · gx)
//! ```
//!
//! which is only valid locally: recompute whenever the point changes.

pub mod error;
pub mod linearize;
pub mod state_space;

pub use error::{LinearError, LinearResult};
pub use linearize::{LinearizeOptions, Linearization, linearize, linearize_at};
pub use state_space::{StateSpace, linearize_state_space};
