use std::sync::{Arc, OnceLock};

use super::combinators::BoxedParser;
use super::state::{ParseState, Parser};

/// Indirection cell for recursive grammars.
///
/// Hand out [`Reference::lazy`] parsers while building the grammar, then bind
/// the real parser with [`Reference::set`] once it exists:
///
/// ```
/// use parsnip::parser::{Reference, between, optional};
/// use parsnip::lexer::scanners::is_char;
///
/// // nested := "(" nested? ")"
/// let nested: Reference<char, ()> = Reference::new();
/// let parens = between(is_char('('), optional(nested.lazy()), is_char(')')).map(|_| ());
/// nested.set(parens.clone());
///
/// assert!(parens.parse("(())").is_ok());
/// assert!(parens.parse("(()").is_err());
/// ```
pub struct Reference<I, T> {
    cell: Arc<OnceLock<BoxedParser<I, T>>>,
}

impl<I, T> Clone for Reference<I, T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<I, T> Default for Reference<I, T> {
    fn default() -> Self {
        Self {
            cell: Arc::new(OnceLock::new()),
        }
    }
}

impl<I: 'static, T: 'static> Reference<I, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A parser forwarding to whatever gets bound later.
    ///
    /// # Panics
    ///
    /// The returned parser panics when applied before [`Reference::set`].
    pub fn lazy(&self) -> BoxedParser<I, T> {
        let cell = Arc::clone(&self.cell);
        BoxedParser::new(move |state: &mut ParseState<I>| match cell.get() {
            Some(parser) => parser.apply(state),
            None => panic!("lazy parser reference applied before a parser was bound to it"),
        })
    }

    /// Binds the target parser.
    ///
    /// # Panics
    ///
    /// When a parser is already bound.
    pub fn set(&self, parser: BoxedParser<I, T>) {
        if self.cell.set(parser).is_err() {
            panic!("lazy parser reference bound twice");
        }
    }

    pub fn is_set(&self) -> bool {
        self.cell.get().is_some()
    }
}
