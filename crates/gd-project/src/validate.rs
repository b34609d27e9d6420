//! Case validation logic.
//!
//! Checks that need no assembly: identifiers, references, run settings and
//! event ordering. Model-level problems (role conflicts, unresolved symbols)
//! surface when the case is built.

use crate::schema::{Case, NetworkDef, RunDef};
use gd_sim::Event;
use std::collections::HashSet;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_case(case: &Case) -> Result<(), ValidationError> {
    if case.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: case.version,
        });
    }

    let mut names = HashSet::new();
    if let Some(network) = &case.network {
        validate_network(network, &mut names)?;
    }
    for block in &case.blocks {
        if !names.insert(block.name.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: block.name.clone(),
                context: "blocks".to_string(),
            });
        }
    }

    for (id, value) in &case.initial_values {
        if !value.is_finite() {
            return Err(ValidationError::InvalidValue {
                field: format!("initial_values '{}'", id),
                value: value.to_string(),
                reason: "must be finite".to_string(),
            });
        }
    }

    for event in &case.events {
        validate_event(event)?;
    }

    validate_run(&case.run)
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be positive and finite".to_string(),
        });
    }
    Ok(())
}

fn validate_network<'a>(
    network: &'a NetworkDef,
    names: &mut HashSet<&'a str>,
) -> Result<(), ValidationError> {
    let mut claim = |name: &'a str, context: &str| {
        if names.insert(name) {
            Ok(())
        } else {
            Err(ValidationError::DuplicateId {
                id: name.to_string(),
                context: context.to_string(),
            })
        }
    };

    let mut bus_names = HashSet::new();
    for bus in &network.buses {
        claim(&bus.name, "network buses")?;
        bus_names.insert(bus.name.as_str());
        positive(&format!("bus '{}' v", bus.name), bus.v)?;
        if !bus.theta.is_finite() {
            return Err(ValidationError::InvalidValue {
                field: format!("bus '{}' theta", bus.name),
                value: bus.theta.to_string(),
                reason: "must be finite".to_string(),
            });
        }
    }

    let bus_ref = |bus: &str, context: String| {
        if bus_names.contains(bus) {
            Ok(())
        } else {
            Err(ValidationError::MissingReference {
                id: bus.to_string(),
                context,
            })
        }
    };

    for g in &network.generators {
        claim(&g.name, "network generators")?;
        bus_ref(&g.bus, format!("generator '{}' bus", g.name))?;
        positive(&format!("generator '{}' xd", g.name), g.params.xd)?;
        positive(&format!("generator '{}' m", g.name), g.params.m)?;
        positive(&format!("generator '{}' fn_hz", g.name), g.params.fn_hz)?;
    }
    for l in &network.lines {
        claim(&l.name, "network lines")?;
        bus_ref(&l.from, format!("line '{}' from", l.name))?;
        bus_ref(&l.to, format!("line '{}' to", l.name))?;
        if l.from == l.to {
            return Err(ValidationError::InvalidValue {
                field: format!("line '{}' to", l.name),
                value: l.to.clone(),
                reason: "line ends must differ".to_string(),
            });
        }
    }
    for l in &network.loads {
        claim(&l.name, "network loads")?;
        bus_ref(&l.bus, format!("load '{}' bus", l.name))?;
    }
    Ok(())
}

fn validate_event(event: &Event) -> Result<(), ValidationError> {
    let field = format!("event '{}'", event.target);
    let invalid = |reason: &str, value: String| ValidationError::InvalidValue {
        field: field.clone(),
        value,
        reason: reason.to_string(),
    };
    if event.times.is_empty() || event.times.len() != event.values.len() {
        return Err(invalid(
            "times and values must be non-empty and of equal length",
            format!("{} times, {} values", event.times.len(), event.values.len()),
        ));
    }
    if event.times.windows(2).any(|w| w[1] <= w[0]) {
        return Err(invalid(
            "trigger times must be strictly increasing",
            format!("{:?}", event.times),
        ));
    }
    if event.times.iter().chain(&event.values).any(|v| !v.is_finite()) {
        return Err(invalid("must be finite", format!("{:?}", event.values)));
    }
    Ok(())
}

fn validate_run(run: &RunDef) -> Result<(), ValidationError> {
    positive("run h", run.h)?;
    positive("run tolerance", run.tolerance)?;
    if !run.t_end.is_finite() || run.t_end < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: "run t_end".to_string(),
            value: run.t_end.to_string(),
            reason: "must be non-negative and finite".to_string(),
        });
    }
    if !run.t_assess.is_finite() || run.t_assess < 0.0 || run.t_assess > run.t_end {
        return Err(ValidationError::InvalidValue {
            field: "run t_assess".to_string(),
            value: run.t_assess.to_string(),
            reason: "must lie within [0, t_end]".to_string(),
        });
    }
    if run.max_newton_iterations == 0 {
        return Err(ValidationError::InvalidValue {
            field: "run max_newton_iterations".to_string(),
            value: "0".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BusDef, LoadDef};
    use gd_devices::LoadParams;

    fn empty() -> Case {
        Case {
            version: crate::LATEST_VERSION,
            name: "c".to_string(),
            network: None,
            blocks: vec![],
            initial_values: Default::default(),
            events: vec![],
            run: RunDef::default(),
        }
    }

    fn bus(name: &str) -> BusDef {
        BusDef {
            name: name.to_string(),
            v: 1.0,
            theta: 0.0,
        }
    }

    #[test]
    fn empty_case_is_valid() {
        validate_case(&empty()).unwrap();
    }

    #[test]
    fn future_version_is_rejected() {
        let mut case = empty();
        case.version = crate::LATEST_VERSION + 1;
        assert!(matches!(
            validate_case(&case),
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn load_on_unknown_bus_is_rejected() {
        let mut case = empty();
        case.network = Some(NetworkDef {
            buses: vec![bus("b1")],
            loads: vec![LoadDef {
                name: "ld".to_string(),
                bus: "b9".to_string(),
                params: LoadParams::default(),
            }],
            ..NetworkDef::default()
        });
        let err = validate_case(&case).unwrap_err();
        assert!(matches!(err, ValidationError::MissingReference { ref id, .. } if id == "b9"));
    }

    #[test]
    fn duplicate_bus_is_rejected() {
        let mut case = empty();
        case.network = Some(NetworkDef {
            buses: vec![bus("b1"), bus("b1")],
            ..NetworkDef::default()
        });
        assert!(matches!(
            validate_case(&case),
            Err(ValidationError::DuplicateId { .. })
        ));
    }

    #[test]
    fn unordered_event_times_are_rejected() {
        let mut case = empty();
        case.events = vec![Event::new("ld.P_L", vec![2.0, 1.0], vec![1.0, 2.0])];
        assert!(matches!(
            validate_case(&case),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn assessment_after_end_is_rejected() {
        let mut case = empty();
        case.run.t_assess = case.run.t_end + 1.0;
        assert!(validate_case(&case).is_err());
    }
}
