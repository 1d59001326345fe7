//! Grammar validation over a finished token chain.
//!
//! The linter only ever looks at a token and its predecessor, plus two
//! flags: whether the current term already has a variable, and whether the
//! current equation already has a relational operator.

use tracing::{debug, trace};

use crate::error::{ChainError, Error, LintError};
use crate::syntax::token::{Location, Token, TokenChain, TokenKind};

type LintResult = Result<(), LintError>;

pub struct Linter<'s> {
    source: &'s str,
    variable_provided: bool,
    relation_provided: bool,
}

impl<'s> Linter<'s> {
    pub fn new(source: &'s str) -> Linter<'s> {
        Linter {
            source,
            variable_provided: false,
            relation_provided: false,
        }
    }

    /// Checks one token against its neighbours and the grammar state, then
    /// updates the state. Tokens must be fed in chain order.
    pub fn lint_token<'a>(&mut self, chain: &TokenChain<'a>, token: &Token<'a>) -> Result<(), Error> {
        trace!(kind = %token.kind, location = %token.location, "lint");
        self.check_links(chain, token)?;
        let prev = match chain.prev_of(token) {
            Some(prev) => prev,
            // only start-of-input gets past the link check without one
            None => return Ok(()),
        };

        match token.kind {
            TokenKind::Eof => self.lint_eof(token, prev)?,
            TokenKind::Add | TokenKind::Sub => {
                self.lint_binary_operator(token, prev)?;
                self.variable_provided = false;
            }
            TokenKind::Mul => self.lint_multiplication_operator(token, prev)?,
            TokenKind::Eq | TokenKind::Leq | TokenKind::Geq => {
                self.lint_relational_operator(token, prev)?;
                self.variable_provided = false;
                self.relation_provided = true;
            }
            TokenKind::Variable => {
                self.lint_variable(token)?;
                self.variable_provided = true;
            }
            TokenKind::Comma => {
                self.lint_comma(token, prev)?;
                self.variable_provided = false;
                self.relation_provided = false;
            }
            TokenKind::Sof | TokenKind::Coefficient => {}
        }
        Ok(())
    }

    fn fault(&self, location: Location) -> ChainError {
        ChainError::new(
            self.source,
            location,
            "Crude modification of the token chain is detected",
        )
    }

    fn error(&self, token: &Token, message: &str) -> LintError {
        LintError::new(self.source, token.location, message)
    }

    fn check_links(&self, chain: &TokenChain, token: &Token) -> Result<(), ChainError> {
        if chain.get(token.index) != Some(token) {
            return Err(self.fault(token.location));
        }
        let back = match token.prev {
            None => token.kind == TokenKind::Sof,
            Some(_) if token.kind == TokenKind::Sof => false,
            Some(_) => chain.prev_of(token).map_or(false, |p| p.next == Some(token.index)),
        };
        let forward = match token.next {
            None => token.kind == TokenKind::Eof,
            Some(_) if token.kind == TokenKind::Eof => false,
            Some(_) => chain.next_of(token).map_or(false, |n| n.prev == Some(token.index)),
        };
        if back && forward {
            Ok(())
        } else {
            Err(self.fault(token.location))
        }
    }

    fn lint_eof(&self, token: &Token, prev: &Token) -> LintResult {
        if prev.kind == TokenKind::Comma {
            return Err(self.error(token, "Unexpected comma at the end of the equation"));
        }
        if prev.kind != TokenKind::Sof && !self.relation_provided {
            return Err(self.error(token, "Equation must contain a relational operator"));
        }
        if prev.kind.is_binary_operator() {
            return Err(self.error(prev, "Unexpected binary operator at the end of the equation"));
        }
        if prev.kind.is_relational_operator() {
            return Err(self.error(token, "Unexpected EOF, right side of the equation is missed"));
        }
        Ok(())
    }

    fn lint_binary_operator(&self, token: &Token, prev: &Token) -> LintResult {
        if prev.kind.is_binary_operator() {
            return Err(self.error(token, "Unexpected binary operator, term missed"));
        }
        Ok(())
    }

    fn lint_multiplication_operator(&self, token: &Token, prev: &Token) -> LintResult {
        if prev.kind == TokenKind::Mul {
            return Err(self.error(token, "Unexpected multiplication operator, term missed"));
        }
        Ok(())
    }

    fn lint_relational_operator(&self, token: &Token, prev: &Token) -> LintResult {
        if self.relation_provided {
            return Err(self.error(token, "Equation must contain only one relational operator"));
        }
        if prev.kind.is_binary_operator() {
            return Err(self.error(token, "Unexpected binary operator, term missed"));
        }
        if prev.kind == TokenKind::Sof || prev.kind == TokenKind::Comma {
            return Err(self.error(
                token,
                "Unexpected relational operator, left side of the equation is missed",
            ));
        }
        Ok(())
    }

    fn lint_variable(&self, token: &Token) -> LintResult {
        if self.variable_provided {
            return Err(self.error(token, "Term must contain no more than one variable"));
        }
        Ok(())
    }

    fn lint_comma(&self, token: &Token, prev: &Token) -> LintResult {
        if prev.kind == TokenKind::Sof {
            return Err(self.error(token, "Unexpected comma at the beginning of the equation"));
        }
        if prev.kind == TokenKind::Comma {
            return Err(self.error(token, "Unexpected comma, equation missed"));
        }
        if !self.relation_provided {
            return Err(self.error(token, "Equation must contain a relational operator"));
        }
        if prev.kind.is_binary_operator() {
            return Err(self.error(prev, "Unexpected binary operator at the end of the equation"));
        }
        if prev.kind.is_relational_operator() {
            return Err(self.error(token, "Unexpected comma, right side of the equation is missed"));
        }
        Ok(())
    }
}

/// Walks the whole chain from start-of-input to end-of-input and stops at
/// the first violation.
pub fn lint(chain: &TokenChain, source: &str) -> Result<(), Error> {
    let result = lint_chain(chain, source);
    if let Err(ref e) = result {
        debug!(error = %e, "linting failed");
    }
    result
}

fn lint_chain(chain: &TokenChain, source: &str) -> Result<(), Error> {
    let mut linter = Linter::new(source);
    let mut token = match chain.head() {
        Some(head) => head,
        None => return Err(linter.fault(Location::new(1, 1)).into()),
    };
    // following the links must visit every stored token in storage order
    for step in 0..chain.len() {
        if token.index != step {
            return Err(linter.fault(token.location).into());
        }
        linter.lint_token(chain, token)?;
        if token.kind == TokenKind::Eof {
            if step + 1 != chain.len() {
                return Err(linter.fault(token.location).into());
            }
            return Ok(());
        }
        token = match chain.next_of(token) {
            Some(next) => next,
            None => return Err(linter.fault(token.location).into()),
        };
    }
    Err(linter.fault(token.location).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::lexer::lex;

    fn lint_source(source: &str) -> Result<(), Error> {
        let chain = lex(source).unwrap();
        lint(&chain, source)
    }

    fn lint_error(source: &str) -> LintError {
        match lint_source(source) {
            Err(Error::Lint(e)) => e,
            other => panic!("expected a lint error for {:?}, got {:?}", source, other),
        }
    }

    fn message(source: &str) -> String {
        lint_error(source).message
    }

    #[test]
    fn well_formed() {
        lint_source("").unwrap();
        lint_source("5 x_1 + 3x_2 ≤ 19").unwrap();
        lint_source("6x_1 + 4x_2 <= 24, x_1 + 2x_2 <= 6, Z = 5x_1 + 4x_2").unwrap();
        lint_source("-x >= -3 * .5").unwrap();
        lint_source("x <= 1,\n-y == 2").unwrap();
        lint_source("2 3 x = 4 * y").unwrap();
    }

    #[test]
    fn comma_rules() {
        assert_eq!(message(", x_1 <= 3"), "Unexpected comma at the beginning of the equation");
        assert_eq!(message("x <= 1,, y <= 2"), "Unexpected comma, equation missed");
        assert_eq!(message("x + y, z <= 1"), "Equation must contain a relational operator");
        assert_eq!(message("x <= 1 +, y <= 2"), "Unexpected binary operator at the end of the equation");
        assert_eq!(message("x <=, y <= 2"), "Unexpected comma, right side of the equation is missed");
    }

    #[test]
    fn end_rules() {
        assert_eq!(message("x <= 1,"), "Unexpected comma at the end of the equation");
        assert_eq!(message("x + y"), "Equation must contain a relational operator");
        assert_eq!(message("x <= 1 -"), "Unexpected binary operator at the end of the equation");
        assert_eq!(message("x <="), "Unexpected EOF, right side of the equation is missed");
    }

    #[test]
    fn operator_rules() {
        assert_eq!(message("x + - y <= 1"), "Unexpected binary operator, term missed");
        assert_eq!(message("x * * y <= 1"), "Unexpected multiplication operator, term missed");
        assert_eq!(message("x <= y <= 1"), "Equation must contain only one relational operator");
        assert_eq!(message("x + <= 1"), "Unexpected binary operator, term missed");
        assert_eq!(
            message("<= 1"),
            "Unexpected relational operator, left side of the equation is missed"
        );
        assert_eq!(
            message("x = 1, = 2"),
            "Unexpected relational operator, left side of the equation is missed"
        );
    }

    #[test]
    fn variable_rules() {
        assert_eq!(message("x y <= 1"), "Term must contain no more than one variable");
        assert_eq!(message("x <= 2 y z"), "Term must contain no more than one variable");
        lint_source("x + y <= 1").unwrap();
        lint_source("x <= y").unwrap();
        lint_source("x <= 1, x <= 2").unwrap();
    }

    #[test]
    fn error_locations() {
        let e = lint_error("x <= 1 -");
        assert_eq!(e.location, Location::new(1, 8));
        let e = lint_error("x <=\n");
        assert_eq!(e.location, Location::new(2, 1));
        let e = lint_error("x <= 1,\ny y <= 2");
        assert_eq!(e.location, Location::new(2, 3));
        assert_eq!(e.source_text, "x <= 1,\ny y <= 2");
    }

    #[test]
    fn broken_links_are_faults() {
        let source = "x <= 1";
        let chain = lex(source).unwrap();
        let mut tokens = chain.iter().cloned().collect::<Vec<_>>();
        tokens[2].prev = Some(0);
        let broken = TokenChain::from(tokens);
        match lint(&broken, source) {
            Err(e @ Error::Chain(_)) => assert!(!e.is_input_error()),
            other => panic!("expected a chain fault, got {:?}", other),
        }
    }

    #[test]
    fn dangling_forward_link_is_fault() {
        let source = "x = 1";
        let chain = lex(source).unwrap();
        let mut tokens = chain.iter().cloned().collect::<Vec<_>>();
        let last = tokens.len() - 1;
        tokens[last].next = Some(1);
        let broken = TokenChain::from(tokens);
        assert!(matches!(lint(&broken, source), Err(Error::Chain(_))));
    }

    #[test]
    fn unlinked_token_is_fault() {
        let source = "x y <= 1";
        let chain = lex(source).unwrap();
        let mut tokens = chain.iter().cloned().collect::<Vec<_>>();
        // `x` is cut out of the links but still stored
        tokens[0].next = Some(2);
        tokens[2].prev = Some(0);
        let broken = TokenChain::from(tokens);
        assert!(matches!(lint(&broken, source), Err(Error::Chain(_))));
    }

    #[test]
    fn trailing_stored_token_is_fault() {
        let source = "x = 1";
        let chain = lex(source).unwrap();
        let mut tokens = chain.iter().cloned().collect::<Vec<_>>();
        let mut extra = tokens[1];
        extra.index = tokens.len();
        extra.prev = None;
        extra.next = None;
        tokens.push(extra);
        assert!(matches!(lint(&TokenChain::from(tokens), source), Err(Error::Chain(_))));
    }

    #[test]
    fn chain_without_start_is_fault() {
        let source = "x = 1";
        let chain = lex(source).unwrap();
        let tokens = chain.iter().skip(1).cloned().collect::<Vec<_>>();
        assert!(matches!(lint(&TokenChain::from(tokens), source), Err(Error::Chain(_))));
        assert!(matches!(lint(&TokenChain::from(Vec::new()), source), Err(Error::Chain(_))));
    }
}
