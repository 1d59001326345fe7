use std::io::{self, Write};

use thiserror::Error;

use crate::syntax::token::Location;

/// Anything that can be reported against the source it came from.
pub trait CompileError {
    fn location(&self) -> Location;
    fn message(&self) -> &str;
    fn source_text(&self) -> &str;

    /// Writes the message, the offending line and a caret under the column.
    fn report(&self, out: &mut dyn Write) -> io::Result<()> {
        let location = self.location();
        writeln!(out, "error: {}", self.message())?;
        writeln!(out, "at line {}, column {}", location.line, location.column)?;
        let line = self
            .source_text()
            .lines()
            .nth(location.line.saturating_sub(1))
            .unwrap_or("");
        writeln!(out, " {}", line)?;
        for _ in 0..location.column.max(1) {
            write!(out, " ")?;
        }
        writeln!(out, "^")
    }
}

macro_rules! positioned_error {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Error)]
        #[error("{message} at {location}")]
        pub struct $name {
            pub source_text: String,
            pub location: Location,
            pub message: String,
        }

        impl $name {
            pub fn new(source: &str, location: Location, message: impl Into<String>) -> $name {
                $name {
                    source_text: source.to_string(),
                    location,
                    message: message.into(),
                }
            }
        }

        impl CompileError for $name {
            fn location(&self) -> Location {
                self.location
            }

            fn message(&self) -> &str {
                &self.message
            }

            fn source_text(&self) -> &str {
                &self.source_text
            }
        }
    };
}

positioned_error! {
    /// Malformed character or literal.
    LexError
}

positioned_error! {
    /// Token chain that cannot represent a well-formed equation list.
    LintError
}

positioned_error! {
    /// The token chain's links disagree with each other. This is a defect in
    /// whatever produced the chain, not a problem with the input.
    ChainError
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("lexical error at {}: {}", .0.location, .0.message)]
    Lex(#[from] LexError),

    #[error("lint error at {}: {}", .0.location, .0.message)]
    Lint(#[from] LintError),

    #[error("token chain integrity fault at {}: {}", .0.location, .0.message)]
    Chain(#[from] ChainError),
}

impl Error {
    /// True when the error is the input's fault, false for a broken chain.
    pub fn is_input_error(&self) -> bool {
        match self {
            Error::Lex(_) | Error::Lint(_) => true,
            Error::Chain(_) => false,
        }
    }

    fn inner(&self) -> &dyn CompileError {
        match self {
            Error::Lex(e) => e,
            Error::Lint(e) => e,
            Error::Chain(e) => e,
        }
    }
}

impl CompileError for Error {
    fn location(&self) -> Location {
        self.inner().location()
    }

    fn message(&self) -> &str {
        self.inner().message()
    }

    fn source_text(&self) -> &str {
        self.inner().source_text()
    }
}

pub type Result<T> = ::std::result::Result<T, Error>;
