//! gd-core: stable foundation for gridyn.
//!
//! Contains:
//! - ids (stable unique variable identifiers shared across blocks)
//! - numeric (norms and length checks)
//! - timing (wall-clock stopwatches for run summaries)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod timing;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use numeric::*;
