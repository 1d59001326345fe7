use std::fmt;
use std::ops::Index;

#[derive(PartialEq, Eq, Debug, Hash, Copy, Clone)]
pub enum TokenKind {
    Sof,
    Eof,
    Add,
    Sub,
    Mul,
    Eq,
    Leq,
    Geq,
    Coefficient,
    Variable,
    Comma,
}

impl TokenKind {
    pub fn spelling(self) -> &'static str {
        use self::TokenKind::*;
        match self {
            Sof => "<SOF>",
            Eof => "<EOF>",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Eq => "=",
            Leq => "<=",
            Geq => ">=",
            Coefficient => "Coefficient",
            Variable => "Variable",
            Comma => ",",
        }
    }

    /// `+` or `-`.
    pub fn is_binary_operator(self) -> bool {
        match self {
            TokenKind::Add | TokenKind::Sub => true,
            _ => false,
        }
    }

    pub fn is_relational_operator(self) -> bool {
        match self {
            TokenKind::Eq | TokenKind::Leq | TokenKind::Geq => true,
            _ => false,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.spelling())
    }
}

/// 1-based line and column. Columns count characters, not bytes.
#[derive(PartialEq, Eq, Debug, Hash, Copy, Clone, Default)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Location {
        Location { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A token of the source.
///
/// `start` and `end` are byte offsets, `end` pointing past the last byte.
/// `prev` and `next` are indices into the owning [`TokenChain`]; `next` is
/// filled in exactly once, when the following token is appended.
#[derive(PartialEq, Debug, Copy, Clone)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    pub location: Location,
    pub value: &'a str,
    pub index: usize,
    pub prev: Option<usize>,
    pub next: Option<usize>,
}

impl<'a> Token<'a> {
    /// Numeric value of a coefficient token.
    pub fn coefficient(&self) -> Option<f64> {
        if self.kind != TokenKind::Coefficient {
            return None;
        }
        self.value.parse().ok()
    }
}

impl<'a> fmt::Display for Token<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            TokenKind::Coefficient | TokenKind::Variable => {
                write!(f, "{} {} {:?}", self.location, self.kind, self.value)
            }
            kind => write!(f, "{} {}", self.location, kind),
        }
    }
}

/// Append-only, index-linked sequence of tokens, headed by the
/// start-of-input token.
#[derive(Debug, Clone, Default)]
pub struct TokenChain<'a> {
    tokens: Vec<Token<'a>>,
}

impl<'a> TokenChain<'a> {
    pub(crate) fn new() -> TokenChain<'a> {
        TokenChain { tokens: Vec::new() }
    }

    /// Links `token` after the current last token and returns its index.
    pub(crate) fn append(&mut self, mut token: Token<'a>) -> usize {
        let index = self.tokens.len();
        token.index = index;
        token.prev = index.checked_sub(1);
        token.next = None;
        if let Some(last) = self.tokens.last_mut() {
            last.next = Some(index);
        }
        self.tokens.push(token);
        index
    }

    pub fn head(&self) -> Option<&Token<'a>> {
        self.tokens.first()
    }

    pub fn last(&self) -> Option<&Token<'a>> {
        self.tokens.last()
    }

    pub fn get(&self, index: usize) -> Option<&Token<'a>> {
        self.tokens.get(index)
    }

    pub fn prev_of(&self, token: &Token<'a>) -> Option<&Token<'a>> {
        token.prev.and_then(|i| self.tokens.get(i))
    }

    pub fn next_of(&self, token: &Token<'a>) -> Option<&Token<'a>> {
        token.next.and_then(|i| self.tokens.get(i))
    }

    pub fn iter(&self) -> ::std::slice::Iter<Token<'a>> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Takes the tokens as they are, links included. Nothing is relinked, so a
/// chain assembled this way is only trustworthy after linting.
impl<'a> From<Vec<Token<'a>>> for TokenChain<'a> {
    fn from(tokens: Vec<Token<'a>>) -> TokenChain<'a> {
        TokenChain { tokens }
    }
}

impl<'a> Index<usize> for TokenChain<'a> {
    type Output = Token<'a>;

    fn index(&self, index: usize) -> &Token<'a> {
        &self.tokens[index]
    }
}

impl<'a, 'c> IntoIterator for &'c TokenChain<'a> {
    type Item = &'c Token<'a>;
    type IntoIter = ::std::slice::Iter<'c, Token<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
