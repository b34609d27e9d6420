//! Fixed-step implicit time integration of assembled DAE systems.
//!
//! Provides:
//! - theta-method integrators (implicit Euler, trapezoidal) with a Newton
//!   solve of the combined differential/algebraic residual at every step
//! - scheduled parameter events
//! - trajectories with per-step Newton statistics
//! - an algebraic equilibrium solve for completing initial points

pub mod error;
pub mod events;
pub mod integrator;
pub mod sim;
pub mod trajectory;

pub use error::{SimError, SimResult};
pub use events::{Event, EventSchedule};
pub use integrator::{ImplicitEuler, Integrator, Method, Trapezoidal};
pub use sim::{MAX_STEPS, SimOptions, simulate, simulate_with, solve_algebraic};
pub use trajectory::{Sample, Trajectory};
