use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::symbol::Symbol;
use crate::syntax::token::TokenKind;

/// Relation between the left side and the bound.
#[derive(PartialEq, Eq, Debug, Hash, Copy, Clone, Serialize)]
pub enum EquationKind {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "<=")]
    Leq,
    #[serde(rename = ">=")]
    Geq,
}

impl EquationKind {
    pub fn from_token(kind: TokenKind) -> Option<EquationKind> {
        match kind {
            TokenKind::Eq => Some(EquationKind::Eq),
            TokenKind::Leq => Some(EquationKind::Leq),
            TokenKind::Geq => Some(EquationKind::Geq),
            _ => None,
        }
    }
}

impl fmt::Display for EquationKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EquationKind::Eq => write!(f, "="),
            EquationKind::Leq => write!(f, "<="),
            EquationKind::Geq => write!(f, ">="),
        }
    }
}

/// `sum(coefficient * variable) <kind> bound`, with every variable term on
/// the left and every constant folded into the bound.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Equation {
    kind: EquationKind,
    variables: HashMap<Symbol, f64>,
    bound: f64,
}

impl Equation {
    pub fn new(kind: EquationKind, variables: HashMap<Symbol, f64>, bound: f64) -> Equation {
        Equation {
            kind,
            variables,
            bound,
        }
    }

    pub fn kind(&self) -> EquationKind {
        self.kind
    }

    pub fn variables(&self) -> &HashMap<Symbol, f64> {
        &self.variables
    }

    pub fn bound(&self) -> f64 {
        self.bound
    }

    pub fn coefficient(&self, name: &str) -> Option<f64> {
        Symbol::lookup(name).and_then(|sym| self.variables.get(&sym).copied())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.coefficient(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Terms as `(name, coefficient)`, sorted by name.
    pub fn terms(&self) -> Vec<(String, f64)> {
        let mut terms = self
            .variables
            .iter()
            .map(|(sym, &c)| (sym.name(), c))
            .collect::<Vec<_>>();
        terms.sort_by(|a, b| a.0.cmp(&b.0));
        terms
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let terms = self.terms();
        if terms.len() == 0 {
            write!(f, "0")?;
        }
        let mut first = true;
        for (name, c) in &terms {
            if first {
                write!(f, "{} {}", c, name)?;
            } else if *c < 0.0 {
                write!(f, " - {} {}", -c, name)?;
            } else {
                write!(f, " + {} {}", c, name)?;
            }
            first = false;
        }
        write!(f, " {} {}", self.kind, self.bound)
    }
}
