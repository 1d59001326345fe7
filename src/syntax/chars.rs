//! Character classes used by the lexer.
//!
//! Every predicate takes `Option<char>`, where `None` stands for the end of
//! input, and is simply false for it.

use crate::syntax::token::TokenKind;

pub fn is_digit(ch: Option<char>) -> bool {
    match ch {
        Some('0'..='9') => true,
        _ => false,
    }
}

/// A coefficient starts with a digit or with the dot of an elided integer
/// part (`.5`).
pub fn is_coefficient_start(ch: Option<char>) -> bool {
    is_digit(ch) || ch == Some('.')
}

pub fn is_letter(ch: Option<char>) -> bool {
    match ch {
        Some('a'..='z') | Some('A'..='Z') => true,
        _ => false,
    }
}

pub fn is_variable_start(ch: Option<char>) -> bool {
    is_letter(ch) || ch == Some('_')
}

pub fn is_variable_continue(ch: Option<char>) -> bool {
    is_variable_start(ch) || is_digit(ch)
}

pub fn is_printable(ch: Option<char>) -> bool {
    match ch {
        Some(' '..='~') => true,
        _ => false,
    }
}

/// Renders a character for an error message: printable ASCII as is,
/// anything else as `U+XXXX`, end of input as `<EOF>`.
pub fn render_char(ch: Option<char>) -> String {
    match ch {
        None => TokenKind::Eof.spelling().to_string(),
        Some(c) if is_printable(ch) => c.to_string(),
        Some(c) => format!("U+{:04X}", c as u32),
    }
}
