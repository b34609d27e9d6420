//! Schema migration framework.

use crate::ProjectError;
use crate::schema::Case;

pub const LATEST_VERSION: u32 = 1;

pub fn migrate_to_latest(mut case: Case) -> Result<Case, ProjectError> {
    while case.version < LATEST_VERSION {
        case = migrate_one_version(case)?;
    }
    Ok(case)
}

fn migrate_one_version(case: Case) -> Result<Case, ProjectError> {
    match case.version {
        0 => migrate_v0_to_v1(case),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

/// Version 0 marks unversioned drafts with the same layout.
fn migrate_v0_to_v1(mut case: Case) -> Result<Case, ProjectError> {
    case.version = 1;
    Ok(case)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RunDef;

    fn case(version: u32) -> Case {
        Case {
            version,
            name: "test".to_string(),
            network: None,
            blocks: vec![],
            initial_values: Default::default(),
            events: vec![],
            run: RunDef::default(),
        }
    }

    #[test]
    fn migrate_latest_is_noop() {
        let c = case(LATEST_VERSION);
        let migrated = migrate_to_latest(c.clone()).unwrap();
        assert_eq!(migrated, c);
    }

    #[test]
    fn migrate_v0_only_bumps_version() {
        let migrated = migrate_to_latest(case(0)).unwrap();
        assert_eq!(migrated, case(LATEST_VERSION));
    }
}
