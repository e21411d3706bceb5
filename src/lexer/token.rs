use crate::parser::state::Describe;

/// What a token is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A registered keyword or operator, in its registered spelling
    Reserved(String),
    Identifier(String),
    Integer(String),
    Decimal(String),
    Scientific { significand: String, exponent: String },
    Long(i64),
    Char(char),
    Str(String),
}

impl TokenKind {
    /// Category name of this kind, as matched by [`fragment`](super::terminals::fragment):
    /// `reserved`, `identifier`, `integer`, `decimal`, `scientific`, `long`, `char` or `string`.
    pub fn tag(&self) -> &'static str {
        match self {
            TokenKind::Reserved(_) => "reserved",
            TokenKind::Identifier(_) => "identifier",
            TokenKind::Integer(_) => "integer",
            TokenKind::Decimal(_) => "decimal",
            TokenKind::Scientific { .. } => "scientific",
            TokenKind::Long(_) => "long",
            TokenKind::Char(_) => "char",
            TokenKind::Str(_) => "string",
        }
    }
}

/// A categorized slice `[start, end)` of the character input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub start: usize,
    pub end: usize,
    pub kind: TokenKind,
    /// The source text exactly as matched
    pub text: String,
}

impl Token {
    pub fn new(start: usize, end: usize, kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            kind,
            text: text.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The registered lexeme, if this is a keyword or operator
    pub fn reserved(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Reserved(lexeme) => Some(lexeme),
            _ => None,
        }
    }
}

impl Describe for Token {
    fn describe(&self) -> String {
        self.text.clone()
    }
}
