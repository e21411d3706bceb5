//! # Failure Model
//!
//! Parsers never unwind on bad input. A failing parser records a [`Failure`]
//! in the [`ParseState`](super::ParseState) and returns `Err`. The state keeps
//! only the failure at the furthest index any branch has reached; failures at
//! the same index merge their expected labels.
//!
//! Only the top-level entry points turn the retained failure into a
//! [`ParseError`], resolving the index into a 1-based line and column:
//!
//! ```text
//! line 1, column 3: EOF expected, x encountered.
//! line 2, column 1: +, -, foo or bar expected, baz encountered.
//! ```

use std::fmt;

use thiserror::Error;

use super::source::LineIndex;

/// What was found where a failure happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encountered {
    Unit(String),
    Eof,
}

impl fmt::Display for Encountered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encountered::Unit(unit) => f.write_str(unit),
            Encountered::Eof => f.write_str("EOF"),
        }
    }
}

/// A failure recorded during parsing, positioned by input index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub at: usize,
    pub expected: Vec<String>,
    pub message: Option<String>,
    pub encountered: Encountered,
}

impl Failure {
    pub fn new(at: usize, encountered: Encountered) -> Self {
        Self {
            at,
            expected: Vec::new(),
            message: None,
            encountered,
        }
    }

    pub fn expected(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        if !self.expected.contains(&label) {
            self.expected.push(label);
        }
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Moves the failure to another index, e.g. from token index to source index.
    pub fn relocate(self, at: usize, encountered: Encountered) -> Self {
        Self {
            at,
            encountered,
            ..self
        }
    }

    /// Unions `other` into this failure. Both must sit at the same index.
    pub fn merge(&mut self, other: Failure) {
        debug_assert_eq!(self.at, other.at);
        for label in other.expected {
            if !self.expected.contains(&label) {
                self.expected.push(label);
            }
        }
        if self.message.is_none() {
            self.message = other.message;
        }
    }

    pub fn render(&self) -> String {
        if !self.expected.is_empty() {
            format!(
                "{} expected, {} encountered.",
                expected_list(&self.expected),
                self.encountered
            )
        } else if let Some(message) = &self.message {
            message.clone()
        } else {
            format!("unexpected {}.", self.encountered)
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Joins labels as `a`, `a or b`, `a, b or c`.
pub fn expected_list<S: AsRef<str>>(labels: &[S]) -> String {
    match labels {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [init @ .., last] => {
            let init: Vec<&str> = init.iter().map(AsRef::as_ref).collect();
            format!("{} or {}", init.join(", "), last.as_ref())
        }
    }
}

/// A parse failure resolved against the source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}, column {column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }

    pub fn locate(failure: &Failure, lines: &LineIndex) -> Self {
        let (line, column) = lines.locate(failure.at);
        Self::new(line, column, failure.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_list_joins_with_trailing_or() {
        assert_eq!(expected_list::<&str>(&[]), "");
        assert_eq!(expected_list(&["+"]), "+");
        assert_eq!(expected_list(&["+", "-"]), "+ or -");
        assert_eq!(expected_list(&["+", "-", "foo", "bar"]), "+, -, foo or bar");
    }

    #[test]
    fn render_expected_and_encountered() {
        let failure = Failure::new(2, Encountered::Unit("x".into())).expected("EOF");
        assert_eq!(failure.render(), "EOF expected, x encountered.");
    }

    #[test]
    fn render_falls_back_to_message() {
        let failure = Failure::new(0, Encountered::Eof).message("no alternatives");
        assert_eq!(failure.render(), "no alternatives");

        let bare = Failure::new(0, Encountered::Unit("+".into()));
        assert_eq!(bare.render(), "unexpected +.");
    }

    #[test]
    fn merge_deduplicates_labels() {
        let mut failure = Failure::new(0, Encountered::Eof).expected("a").expected("b");
        failure.merge(Failure::new(0, Encountered::Eof).expected("b").expected("c"));
        assert_eq!(failure.expected, vec!["a", "b", "c"]);
    }

    #[test]
    fn parse_error_display() {
        let err = ParseError::new(1, 3, "EOF expected, x encountered.");
        assert_eq!(err.to_string(), "line 1, column 3: EOF expected, x encountered.");
    }
}
