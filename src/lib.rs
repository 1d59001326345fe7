//! Front end that turns free-form linear constraints and objective functions,
//! such as `6x_1 + 4x_2 <= 24, Z = 5x_1 + 4x_2`, into normalized
//! [`Equation`]s for a downstream optimizer.
//!
//! Source text goes through three passes: the lexer builds a linked token
//! chain, the linter validates the finished chain, and the parser folds the
//! approved tokens into equations.

#[macro_use]
extern crate lazy_static;

pub mod equation;
pub mod error;
pub mod symbol;
pub mod syntax {
    pub mod chars;
    pub mod lexer;
    pub mod linter;
    pub mod parser;
    pub mod token;

    use tracing::debug;

    use crate::equation::Equation;

    /// Lexes, lints and parses `source` into its equations, in source order.
    pub fn parse(source: &str) -> crate::error::Result<Vec<Equation>> {
        let chain = lexer::lex(source)?;
        linter::lint(&chain, source)?;
        let equations = parser::Parser::new(chain.iter().copied()).collect::<Vec<_>>();
        debug!(count = equations.len(), tokens = chain.len(), "parsed source");
        Ok(equations)
    }
}

pub use equation::{Equation, EquationKind};
pub use error::{ChainError, CompileError, Error, LexError, LintError};
pub use symbol::Symbol;
pub use syntax::lexer::Lexer;
pub use syntax::linter::Linter;
pub use syntax::parser::Parser;
pub use syntax::token::{Location, Token, TokenChain, TokenKind};
