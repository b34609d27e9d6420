//! Model-construction and evaluation errors.

use crate::registry::Role;
use gd_core::{CoreError, VarId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DaeError {
    #[error("Variable '{name}' ({id}) declared as {first} and as {second}")]
    VariableRoleConflict {
        id: VarId,
        name: String,
        first: Role,
        second: Role,
    },

    #[error("Duplicate {what} for '{name}' ({id})")]
    DuplicateDefinition {
        id: VarId,
        name: String,
        what: &'static str,
    },

    #[error("Unresolved symbol '{name}' ({id}) referenced in {context}")]
    UnresolvedSymbol {
        id: VarId,
        name: String,
        context: String,
    },

    #[error("No initial value for {role} '{name}' ({id})")]
    UnresolvedInitialValue { id: VarId, name: String, role: Role },

    #[error("Unknown {expected} '{id}' in initial mapping")]
    UnknownVariable { id: VarId, expected: Role },

    #[error("{what} of '{name}' ({id}) must depend on parameters only")]
    NotParameterOnly {
        id: VarId,
        name: String,
        what: &'static str,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type DaeResult<T> = Result<T, DaeError>;
