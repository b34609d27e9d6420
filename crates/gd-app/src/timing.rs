//! Wall-clock breakdown of a driver call.

/// Seconds spent per phase. Phases a call does not perform stay at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunTiming {
    /// Case construction and assembly.
    pub compile_time_s: f64,
    /// Initial vectors and optional algebraic equilibration.
    pub init_time_s: f64,
    pub solve_time_s: f64,
    pub analysis_time_s: f64,
    pub total_time_s: f64,
}
