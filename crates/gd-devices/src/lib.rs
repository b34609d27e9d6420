//! Device library: equation blocks for a phasor-domain (RMS) grid model.
//!
//! Each bus owns two algebraic variables, voltage angle `θ` and magnitude `V`,
//! whose equations are the active and reactive power balances. Devices add
//! their injections to those balances by redeclaring the bus variables with a
//! contribution; the assembler sums contributions per slot.
//!
//! Everything is in per unit on the system base.

pub mod bus;
pub mod error;
pub mod generator;
pub mod line;
pub mod load;
pub mod network;

pub use bus::Bus;
pub use error::{DeviceError, DeviceResult};
pub use generator::{ClassicalGenerator, GeneratorInit, GeneratorParams};
pub use line::{Line, LineFlows, LineParams};
pub use load::{ConstantPowerLoad, LoadParams};
pub use network::{BusVoltage, Network, OperatingPoint};
