//! Folds a lint-approved token stream into normalized [`Equation`]s.
//!
//! Every term is folded to the left side as soon as its operator boundary is
//! reached: terms after the relational operator change sign, and bare
//! numbers go into the bound.

use std::collections::HashMap;
use std::mem;

use tracing::debug;

use crate::equation::{Equation, EquationKind};
use crate::symbol::Symbol;
use crate::syntax::token::{Token, TokenKind};

/// State of the equation currently being parsed.
#[derive(Debug, Default)]
struct EquationAccumulator {
    kind: Option<EquationKind>,
    variables: HashMap<Symbol, f64>,
    bound: f64,

    // pending term
    coefficient: Option<f64>,
    variable: Option<Symbol>,
}

impl EquationAccumulator {
    /// Folds the pending term into the variables or the bound.
    fn extend_variables(&mut self) {
        let coefficient = match self.coefficient {
            Some(c) if c != 0.0 => c,
            _ => return,
        };
        let coefficient = if self.kind.is_some() {
            -coefficient
        } else {
            coefficient
        };
        match self.variable {
            Some(sym) => *self.variables.entry(sym).or_insert(0.0) += coefficient,
            None => self.bound -= coefficient,
        }
    }

    fn start_term(&mut self, coefficient: Option<f64>) {
        self.extend_variables();
        self.coefficient = coefficient;
        self.variable = None;
    }

    fn finish(mut self) -> Option<Equation> {
        self.extend_variables();
        let EquationAccumulator {
            kind,
            variables,
            bound,
            ..
        } = self;
        kind.map(|kind| Equation::new(kind, variables, bound))
    }
}

pub struct Parser<I> {
    tokens: I,
    accumulator: EquationAccumulator,
    last: TokenKind,
}

impl<'a, I> Parser<I>
where
    I: Iterator<Item = Token<'a>>,
{
    /// The tokens must already have passed the linter.
    pub fn new(tokens: I) -> Parser<I> {
        Parser {
            tokens,
            accumulator: EquationAccumulator::default(),
            last: TokenKind::Sof,
        }
    }

    fn derive_equation(&mut self) -> Option<Equation> {
        let accumulator = mem::replace(&mut self.accumulator, EquationAccumulator::default());
        let equation = accumulator.finish();
        if let Some(ref equation) = equation {
            debug!(%equation, "equation");
        }
        equation
    }

    fn parse_relational_operator(&mut self, token: &Token) {
        self.accumulator.start_term(None);
        self.accumulator.kind = EquationKind::from_token(token.kind);
    }

    fn parse_coefficient(&mut self, token: &Token) {
        // the lexer only emits coefficients that convert
        if let Some(value) = token.coefficient() {
            let pending = self.accumulator.coefficient.unwrap_or(1.0);
            self.accumulator.coefficient = Some(pending * value);
        }
    }

    fn parse_variable(&mut self, token: &Token) {
        if self.accumulator.coefficient.is_none() {
            self.accumulator.coefficient = Some(1.0);
        }
        self.accumulator.variable = Some(Symbol::intern(token.value));
    }
}

impl<'a, I> Iterator for Parser<I>
where
    I: Iterator<Item = Token<'a>>,
{
    type Item = Equation;

    fn next(&mut self) -> Option<Equation> {
        while let Some(token) = self.tokens.next() {
            let last = mem::replace(&mut self.last, token.kind);
            match token.kind {
                TokenKind::Sof | TokenKind::Mul => {}
                TokenKind::Eof => {
                    if last == TokenKind::Sof {
                        return None;
                    }
                    return self.derive_equation();
                }
                TokenKind::Add => self.accumulator.start_term(Some(1.0)),
                TokenKind::Sub => self.accumulator.start_term(Some(-1.0)),
                TokenKind::Eq | TokenKind::Leq | TokenKind::Geq => {
                    self.parse_relational_operator(&token)
                }
                TokenKind::Coefficient => self.parse_coefficient(&token),
                TokenKind::Variable => self.parse_variable(&token),
                TokenKind::Comma => {
                    if let Some(equation) = self.derive_equation() {
                        return Some(equation);
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::lexer::lex;
    use crate::syntax::linter::lint;
    use float_cmp::approx_eq;

    fn parse(source: &str) -> Vec<Equation> {
        let chain = lex(source).unwrap();
        lint(&chain, source).unwrap();
        Parser::new(chain.iter().copied()).collect()
    }

    fn parse_one(source: &str) -> Equation {
        let mut equations = parse(source);
        assert_eq!(equations.len(), 1, "{:?}", source);
        equations.remove(0)
    }

    fn assert_coefficient(equation: &Equation, name: &str, expected: f64) {
        match equation.coefficient(name) {
            Some(c) => assert!(approx_eq!(f64, c, expected), "{}: {} != {}", name, c, expected),
            None => panic!("{} missing from {}", name, equation),
        }
    }

    #[test]
    fn constraint() {
        let eq = parse_one("6x_1 + 4x_2 <= 24");
        assert_eq!(eq.kind(), EquationKind::Leq);
        assert_eq!(eq.len(), 2);
        assert_coefficient(&eq, "x_1", 6.0);
        assert_coefficient(&eq, "x_2", 4.0);
        assert!(approx_eq!(f64, eq.bound(), 24.0));
    }

    #[test]
    fn objective_folds_right_side() {
        let eq = parse_one("Z = 5x_1 + 4x_2");
        assert_eq!(eq.kind(), EquationKind::Eq);
        assert_eq!(eq.len(), 3);
        assert_coefficient(&eq, "Z", 1.0);
        assert_coefficient(&eq, "x_1", -5.0);
        assert_coefficient(&eq, "x_2", -4.0);
        assert!(approx_eq!(f64, eq.bound(), 0.0));
    }

    #[test]
    fn like_terms_merge() {
        let eq = parse_one("x_1 - x_1 <= 0");
        assert_eq!(eq.len(), 1);
        assert_coefficient(&eq, "x_1", 0.0);
        assert!(approx_eq!(f64, eq.bound(), 0.0));

        let eq = parse_one("x_1 + x_1 >= 3 - x_1");
        assert_coefficient(&eq, "x_1", 3.0);
        assert!(approx_eq!(f64, eq.bound(), 3.0));
    }

    #[test]
    fn constants_move_to_bound() {
        let eq = parse_one("x + 2 <= 10 - 3");
        assert_coefficient(&eq, "x", 1.0);
        assert!(approx_eq!(f64, eq.bound(), 5.0));

        let eq = parse_one("-4 + y = -1");
        assert_coefficient(&eq, "y", 1.0);
        assert!(approx_eq!(f64, eq.bound(), 3.0));
    }

    #[test]
    fn explicit_and_implicit_multiplication() {
        let a = parse_one("3x_2 - 4 * _y3 <= 1");
        assert_coefficient(&a, "x_2", 3.0);
        assert_coefficient(&a, "_y3", -4.0);

        let b = parse_one("3 * x_2 - 4_y3 <= 1");
        assert_eq!(a, b);

        let c = parse_one("2 3 x = 19 * .5");
        assert_coefficient(&c, "x", 6.0);
        assert!(approx_eq!(f64, c.bound(), 9.5));
    }

    #[test]
    fn right_side_variables() {
        let eq = parse_one("0 >= x - 2y");
        assert_coefficient(&eq, "x", -1.0);
        assert_coefficient(&eq, "y", 2.0);
        assert!(approx_eq!(f64, eq.bound(), 0.0));
    }

    #[test]
    fn zero_coefficient_is_dropped() {
        let eq = parse_one("0x + y <= 1");
        assert!(!eq.contains("x") || eq.coefficient("x") == Some(0.0));
        assert_eq!(eq.len(), 1);
        assert_coefficient(&eq, "y", 1.0);
    }

    #[test]
    fn equations_in_source_order() {
        let equations = parse("6x_1 + 4x_2 <= 24, x_1 + 2x_2 <= 6,\nZ = 5x_1 + 4x_2");
        assert_eq!(equations.len(), 3);
        assert_eq!(equations[0].kind(), EquationKind::Leq);
        assert!(approx_eq!(f64, equations[1].bound(), 6.0));
        assert_coefficient(&equations[1], "x_2", 2.0);
        assert_eq!(equations[2].kind(), EquationKind::Eq);
        assert_coefficient(&equations[2], "Z", 1.0);
    }

    #[test]
    fn empty_source_has_no_equations() {
        assert!(parse("").is_empty());
        assert!(parse(" \n\t").is_empty());
    }

    #[test]
    fn stops_after_end() {
        let chain = lex("x = 1").unwrap();
        let mut parser = Parser::new(chain.iter().copied());
        assert!(parser.next().is_some());
        assert!(parser.next().is_none());
        assert!(parser.next().is_none());
    }
}
