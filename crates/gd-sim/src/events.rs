//! Scheduled parameter events.

use crate::error::{SimError, SimResult};
use gd_core::VarId;
use gd_dae::{DaeSystem, Role};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Piecewise-constant schedule for one parameter.
///
/// For `times[k] ≤ t < times[k+1]` the parameter holds `values[k]`; before the
/// first trigger it keeps its initial value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub target: VarId,
    pub times: Vec<f64>,
    pub values: Vec<f64>,
}

impl Event {
    pub fn new(target: impl Into<VarId>, times: Vec<f64>, values: Vec<f64>) -> Self {
        Self {
            target: target.into(),
            times,
            values,
        }
    }

    /// Single step change at `time`.
    pub fn step(target: impl Into<VarId>, time: f64, value: f64) -> Self {
        Self::new(target, vec![time], vec![value])
    }

    fn validate(&self) -> SimResult<()> {
        let invalid = |what| SimError::InvalidEvent {
            target: self.target.clone(),
            what,
        };
        if self.times.is_empty() {
            return Err(invalid("no trigger times"));
        }
        if self.times.len() != self.values.len() {
            return Err(invalid("trigger times and values differ in length"));
        }
        if self.times.iter().chain(&self.values).any(|v| !v.is_finite()) {
            return Err(invalid("non-finite trigger time or value"));
        }
        if self.times.windows(2).any(|w| w[1] <= w[0]) {
            return Err(invalid("trigger times must be strictly increasing"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
struct Scheduled {
    param: usize,
    times: Vec<f64>,
    values: Vec<f64>,
}

/// Events validated and resolved against one system's parameter slots.
#[derive(Clone, Debug, Default)]
pub struct EventSchedule {
    entries: Vec<Scheduled>,
}

impl EventSchedule {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(system: &DaeSystem, events: &[Event]) -> SimResult<Self> {
        let mut entries = Vec::with_capacity(events.len());
        for event in events {
            event.validate()?;
            let registry = system.registry();
            let param = match (
                registry.role_of(&event.target),
                registry.param_index(&event.target),
            ) {
                (Some(Role::Parameter), Some(j)) => j,
                (Some(_), _) => {
                    return Err(SimError::InvalidEvent {
                        target: event.target.clone(),
                        what: "target is not a parameter",
                    });
                }
                (None, _) => {
                    return Err(SimError::InvalidEvent {
                        target: event.target.clone(),
                        what: "target is not declared",
                    });
                }
            };
            entries.push(Scheduled {
                param,
                times: event.times.clone(),
                values: event.values.clone(),
            });
        }
        Ok(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Parameter vector active at time `t`.
    ///
    /// A trigger fires once `trigger ≤ t + guard`. When several events drive
    /// the same parameter the most recently triggered value wins.
    pub fn params_at(&self, base: &DVector<f64>, t: f64, guard: f64) -> DVector<f64> {
        let mut p = base.clone();
        let mut fired_at = vec![f64::NEG_INFINITY; p.len()];
        for entry in &self.entries {
            let fired = entry.times.partition_point(|&trigger| trigger <= t + guard);
            if fired == 0 {
                continue;
            }
            let trigger = entry.times[fired - 1];
            if trigger >= fired_at[entry.param] {
                fired_at[entry.param] = trigger;
                p[entry.param] = entry.values[fired - 1];
            }
        }
        p
    }

    /// All trigger times in `(t_from, t_to]` (shifted by `guard`), sorted.
    /// A step ending at `t_to` uses the values of exactly these triggers.
    pub fn triggers_between(&self, t_from: f64, t_to: f64, guard: f64) -> Vec<f64> {
        let mut out: Vec<f64> = self
            .entries
            .iter()
            .flat_map(|e| e.times.iter().copied())
            .filter(|&t| t > t_from + guard && t <= t_to + guard)
            .collect();
        out.sort_by(f64::total_cmp);
        out
    }
}
