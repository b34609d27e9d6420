//! Error types for symbolic operations.

use gd_core::VarId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SymbolicError {
    #[error("Unbound variable '{name}' ({id}) during evaluation")]
    UnboundVariable { id: VarId, name: String },

    #[error("Unresolved symbol '{name}' ({id}): not declared in the symbol table")]
    UnresolvedSymbol { id: VarId, name: String },
}

pub type SymbolicResult<T> = Result<T, SymbolicError>;
