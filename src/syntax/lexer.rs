//! Hand-written lexer for equation lists.
//!
//! The lexer is pull based: every [`Lexer::advance`] lexes one more token and
//! links it into the [`TokenChain`] after the current one. Once the source is
//! exhausted it keeps handing out the same end-of-input token.

use tracing::{debug, trace};

use crate::error::LexError;
use crate::syntax::chars::{
    is_coefficient_start, is_digit, is_variable_continue, is_variable_start, render_char,
};
use crate::syntax::token::{Location, Token, TokenChain, TokenKind};

pub struct Lexer<'a> {
    source: &'a str,
    chain: TokenChain<'a>,
    current: usize,
    line: usize,
    // byte offset of the first character of the current line
    line_start: usize,
    exhausted: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Lexer<'a> {
        let mut chain = TokenChain::new();
        let current = chain.append(Token {
            kind: TokenKind::Sof,
            start: 0,
            end: 0,
            location: Location::new(1, 1),
            value: "",
            index: 0,
            prev: None,
            next: None,
        });
        Lexer {
            source,
            chain,
            current,
            line: 1,
            line_start: 0,
            exhausted: false,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// The most recently lexed token, start-of-input before the first advance.
    pub fn token(&self) -> &Token<'a> {
        &self.chain[self.current]
    }

    pub fn token_chain(&self) -> &TokenChain<'a> {
        &self.chain
    }

    pub fn into_chain(self) -> TokenChain<'a> {
        self.chain
    }

    /// Lexes the next token and links it into the chain. At the end of input
    /// the end-of-input token is returned again without being relinked.
    pub fn advance(&mut self) -> Result<&Token<'a>, LexError> {
        if self.token().kind == TokenKind::Eof {
            return Ok(self.token());
        }
        let (line, line_start) = (self.line, self.line_start);
        let token = match self.next_token() {
            Ok(token) => token,
            Err(e) => {
                // the skipped line breaks are skipped again on the next call
                self.line = line;
                self.line_start = line_start;
                debug!(location = %e.location, message = %e.message, "lexing failed");
                return Err(e);
            }
        };
        self.current = self.chain.append(token);
        let token = self.token();
        trace!(kind = %token.kind, value = token.value, location = %token.location, "token");
        Ok(token)
    }

    fn location(&self, position: usize) -> Location {
        let column = 1 + self.source[self.line_start..position].chars().count();
        Location::new(self.line, column)
    }

    fn error(&self, position: usize, message: String) -> LexError {
        LexError::new(self.source, self.location(position), message)
    }

    fn create_token(&self, kind: TokenKind, start: usize, end: usize) -> Token<'a> {
        Token {
            kind,
            start,
            end,
            location: self.location(start),
            value: &self.source[start..end],
            index: 0,
            prev: None,
            next: None,
        }
    }

    fn single_char(&self, kind: TokenKind, position: usize, ch: char) -> Token<'a> {
        self.create_token(kind, position, position + ch.len_utf8())
    }

    fn peek_at(&self, position: usize) -> Option<char> {
        self.source.get(position..).and_then(|s| s.chars().next())
    }

    fn read_while<F>(&self, start: usize, predicate: F) -> usize
    where
        F: Fn(Option<char>) -> bool,
    {
        let rest = &self.source[start..];
        for (offset, ch) in rest.char_indices() {
            if !predicate(Some(ch)) {
                return start + offset;
            }
        }
        self.source.len()
    }

    fn read_digits(&self, start: usize, first: Option<char>) -> Result<usize, LexError> {
        if !is_digit(first) {
            return Err(self.error(
                start,
                format!(
                    "Unexpected character, expected digit but got: {}",
                    render_char(first)
                ),
            ));
        }
        Ok(self.read_while(start + 1, is_digit))
    }

    fn read_coefficient(&self, start: usize, first: char) -> Result<Token<'a>, LexError> {
        let mut position = start;
        let mut ch = Some(first);

        if first == '0' {
            position += 1;
            ch = self.peek_at(position);
            if is_digit(ch) {
                return Err(self.error(
                    position,
                    format!(
                        "Invalid coefficient, unexpected digit after 0: {}",
                        render_char(ch)
                    ),
                ));
            }
        } else if first != '.' {
            position = self.read_digits(position, ch)?;
            ch = self.peek_at(position);
        }

        if ch == Some('.') {
            position += 1;
            ch = self.peek_at(position);
            position = self.read_digits(position, ch)?;
            ch = self.peek_at(position);
        }

        let mut exponent = false;
        if ch == Some('e') || ch == Some('E') {
            exponent = true;
            position += 1;
            ch = self.peek_at(position);
            if ch == Some('+') || ch == Some('-') {
                position += 1;
                ch = self.peek_at(position);
            }
            position = self.read_digits(position, ch)?;
            ch = self.peek_at(position);
        }

        // a second dot, or an exponent running straight into a name
        if ch == Some('.') || (exponent && is_variable_start(ch)) {
            return Err(self.error(
                position,
                format!(
                    "Invalid coefficient, expected digit but got: {}",
                    render_char(ch)
                ),
            ));
        }

        let token = self.create_token(TokenKind::Coefficient, start, position);
        match token.coefficient() {
            Some(value) if value.is_finite() => Ok(token),
            _ => Err(self.error(
                start,
                format!("Invalid coefficient, value out of range: {}", token.value),
            )),
        }
    }

    fn read_variable(&self, start: usize) -> Token<'a> {
        let end = self.read_while(start + 1, is_variable_continue);
        self.create_token(TokenKind::Variable, start, end)
    }

    fn next_token(&mut self) -> Result<Token<'a>, LexError> {
        let mut position = self.token().end;
        while let Some(ch) = self.peek_at(position) {
            let next = self.peek_at(position + ch.len_utf8());
            match ch {
                '\u{FEFF}' | '\t' | ' ' => {
                    position += ch.len_utf8();
                    continue;
                }
                '\n' => {
                    position += 1;
                    self.line += 1;
                    self.line_start = position;
                    continue;
                }
                '\r' => {
                    position += if next == Some('\n') { 2 } else { 1 };
                    self.line += 1;
                    self.line_start = position;
                    continue;
                }
                '+' => return Ok(self.single_char(TokenKind::Add, position, ch)),
                '-' => return Ok(self.single_char(TokenKind::Sub, position, ch)),
                '*' => return Ok(self.single_char(TokenKind::Mul, position, ch)),
                '≤' => return Ok(self.single_char(TokenKind::Leq, position, ch)),
                '≥' => return Ok(self.single_char(TokenKind::Geq, position, ch)),
                ',' => return Ok(self.single_char(TokenKind::Comma, position, ch)),
                '=' => {
                    // `==` is accepted as a plain equality
                    let end = if next == Some('=') { position + 2 } else { position + 1 };
                    return Ok(self.create_token(TokenKind::Eq, position, end));
                }
                '<' => {
                    return if next == Some('=') {
                        Ok(self.create_token(TokenKind::Leq, position, position + 2))
                    } else {
                        Err(self.error(
                            position,
                            "Unexpected character, less than operator is not allowed".to_string(),
                        ))
                    };
                }
                '>' => {
                    return if next == Some('=') {
                        Ok(self.create_token(TokenKind::Geq, position, position + 2))
                    } else {
                        Err(self.error(
                            position,
                            "Unexpected character, greater than operator is not allowed"
                                .to_string(),
                        ))
                    };
                }
                c if is_coefficient_start(Some(c)) => return self.read_coefficient(position, c),
                c if is_variable_start(Some(c)) => return Ok(self.read_variable(position)),
                c => {
                    return Err(self.error(
                        position,
                        format!("Invalid character: {}", render_char(Some(c))),
                    ));
                }
            }
        }
        Ok(self.create_token(TokenKind::Eof, position, position))
    }
}

/// Yields every real token up to and including end-of-input, then stops.
/// A lexical error is yielded once and also ends the stream.
impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        match self.advance().copied() {
            Ok(token) => {
                self.exhausted = token.kind == TokenKind::Eof;
                Some(Ok(token))
            }
            Err(e) => {
                self.exhausted = true;
                Some(Err(e))
            }
        }
    }
}

/// Lexes the whole source into a finished chain.
pub fn lex(source: &str) -> Result<TokenChain, LexError> {
    let mut lexer = Lexer::new(source);
    while lexer.advance()?.kind != TokenKind::Eof {}
    Ok(lexer.into_chain())
}
