//! Modular equation blocks.

use gd_symbolic::{Expr, Var};
use serde::{Deserialize, Serialize};

/// A state variable with its derivative expression.
///
/// The block contributes `rhs` to `f` for this state. An optional time constant
/// (parameter-only expression, default 1) scales the derivative: `T·ẋ = f`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateDecl {
    pub var: Var,
    pub rhs: Expr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_constant: Option<Expr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<Expr>,
}

impl StateDecl {
    pub fn new(var: &Var, rhs: impl Into<Expr>) -> Self {
        Self {
            var: var.clone(),
            rhs: rhs.into(),
            time_constant: None,
            init: None,
        }
    }

    pub fn with_time_constant(mut self, t: impl Into<Expr>) -> Self {
        self.time_constant = Some(t.into());
        self
    }

    pub fn with_init(mut self, init: impl Into<Expr>) -> Self {
        self.init = Some(init.into());
        self
    }
}

/// An algebraic variable with its constraint contribution (`eq = 0`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlgebraicDecl {
    pub var: Var,
    pub eq: Expr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<Expr>,
}

impl AlgebraicDecl {
    pub fn new(var: &Var, eq: impl Into<Expr>) -> Self {
        Self {
            var: var.clone(),
            eq: eq.into(),
            init: None,
        }
    }

    pub fn with_init(mut self, init: impl Into<Expr>) -> Self {
        self.init = Some(init.into());
        self
    }
}

/// A named symbolic constant with an optional default value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub var: Var,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl ParamDecl {
    pub fn new(var: &Var) -> Self {
        Self {
            var: var.clone(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }
}

/// A reusable unit of equations, typically one device or controller instance.
///
/// Blocks may nest; the assembler visits a block before its children.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub name: String,
    #[serde(default)]
    pub states: Vec<StateDecl>,
    #[serde(default)]
    pub algebraics: Vec<AlgebraicDecl>,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    #[serde(default)]
    pub children: Vec<Block>,
}

impl Block {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn state(mut self, decl: StateDecl) -> Self {
        self.states.push(decl);
        self
    }

    pub fn algebraic(mut self, decl: AlgebraicDecl) -> Self {
        self.algebraics.push(decl);
        self
    }

    pub fn param(mut self, decl: ParamDecl) -> Self {
        self.params.push(decl);
        self
    }

    pub fn child(mut self, block: Block) -> Self {
        self.children.push(block);
        self
    }

    pub fn add_child(&mut self, block: Block) {
        self.children.push(block);
    }

    /// This block and all descendants, depth-first, parent before children.
    pub fn all_blocks(&self) -> Vec<&Block> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a Block>) {
        out.push(self);
        for child in &self.children {
            child.collect(out);
        }
    }
}
