//! # Lexing
//!
//! Stage one of the pipeline: character scanners, the [`Terminals`]
//! registry, and the glue running a token-level grammar over the tokens a
//! tokenizer produces.
//!
//! - [`patterns`] - raw character patterns for the literal grammars
//! - [`scanners`] - labelled character parsers built on the patterns
//! - [`terminals`] - keyword/operator registry, tokenizers, token parsers
//! - [`token`] - the positioned [`Token`]
//! - [`numbers`] - numeric text to token payloads

pub mod numbers;
pub mod patterns;
pub mod scanners;
pub mod terminals;
pub mod token;

pub use terminals::{CaseSensitivity, Terminals, TerminalsBuilder, TerminalsError};
pub use token::{Token, TokenKind};

use crate::parser::combinators::{BoxedParser, eof, many, optional};
use crate::parser::error::{Encountered, Failure};
use crate::parser::state::{Describe, ParseState, Parser};
use crate::parser::trace::DisabledTrace;

/// `delimiter? (token delimiter?)*`
pub fn lexer(tokenizer: BoxedParser<char, Token>, delimiter: BoxedParser<char, ()>) -> BoxedParser<char, Vec<Token>> {
    let delimiter = optional(delimiter);
    delimiter.clone() * many(tokenizer - delimiter)
}

/// Maps a failure at a token index back onto the character input.
fn relocate(failure: Failure, tokens: &[Token], lexed_to: usize, chars: &[char]) -> Failure {
    match tokens.get(failure.at) {
        Some(token) => {
            let encountered = Encountered::Unit(token.describe());
            failure.relocate(token.start, encountered)
        }
        None => {
            let encountered = match chars.get(lexed_to) {
                Some(c) => Encountered::Unit(c.describe()),
                None => Encountered::Eof,
            };
            failure.relocate(lexed_to, encountered)
        }
    }
}

impl<T: 'static> BoxedParser<Token, T> {
    /// Runs this token-level parser over the tokens `tokenizer` finds,
    /// skipping `delimiter` between them.
    ///
    /// The result is a character-level parser. All tokens lexed from the
    /// current position must be consumed; token-level failures are reported
    /// at the start of the offending token. Input the tokenizer cannot handle
    /// stops lexing and is left for whatever follows, so at top level it
    /// surfaces as `EOF expected, <char> encountered.`
    pub fn from(self, tokenizer: BoxedParser<char, Token>, delimiter: BoxedParser<char, ()>) -> BoxedParser<char, T> {
        let lexer = lexer(tokenizer, delimiter);
        let grammar = self - eof();
        BoxedParser::new(move |state: &mut ParseState<char>| {
            let start = state.position();

            // lexing failures only mark where lexing stopped
            let earlier = state.take_failure();
            let tokens = lexer.apply(state);
            state.take_failure();
            state.absorb(earlier);
            let tokens = tokens?;
            let lexed_to = state.position();

            let trace = state.replace_trace(Box::new(DisabledTrace));
            let mut nested = ParseState::with_trace(tokens, trace);
            let result = grammar.apply(&mut nested);
            let failure = nested
                .take_failure()
                .map(|failure| relocate(failure, nested.input(), lexed_to, state.input()));
            let (_, trace) = nested.finish();
            state.replace_trace(trace);

            if let Some(failure) = failure {
                state.record(failure);
            }
            if result.is_err() {
                state.restore(start);
            }
            result
        })
    }
}
