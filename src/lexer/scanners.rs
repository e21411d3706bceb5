//! Character-level parsers.
//!
//! Scanners recognize a shape and, except for the value-producing quoted
//! literals and single-char matchers, return `()`. Use
//! [`BoxedParser::source`] to get the matched text. Every scanner fails with
//! its category label, e.g. `decimal number expected, x encountered.`

use crate::parser::combinators::{BoxedParser, choice, satisfy, skip_some};
use crate::parser::state::ParseState;

use super::patterns;

/// Wrap a raw pattern into a parser failing with `label`
pub fn pattern<F>(matcher: F, label: impl Into<String>) -> BoxedParser<char, ()>
where
    F: Fn(&[char], usize) -> Option<usize> + Send + Sync + 'static,
{
    let label = label.into();
    BoxedParser::new(move |state: &mut ParseState<char>| {
        match matcher(state.input(), state.position()) {
            Some(end) => {
                state.advance_to(end);
                Ok(())
            }
            None => Err(state.expected_here(label.as_str())),
        }
    })
}

pub fn is_char(expected: char) -> BoxedParser<char, char> {
    satisfy(move |c: &char| *c == expected, expected.to_string())
}

pub fn char_class<F>(predicate: F, label: impl Into<String>) -> BoxedParser<char, char>
where
    F: Fn(char) -> bool + Send + Sync + 'static,
{
    satisfy(move |c: &char| predicate(*c), label)
}

pub fn string(text: &str) -> BoxedParser<char, ()> {
    let chars: Vec<char> = text.chars().collect();
    pattern(move |src, at| patterns::literal(src, at, &chars), text)
}

pub fn string_ignore_case(text: &str) -> BoxedParser<char, ()> {
    let chars: Vec<char> = text.chars().collect();
    pattern(move |src, at| patterns::literal_ignore_case(src, at, &chars), text)
}

pub fn whitespace() -> BoxedParser<char, char> {
    char_class(char::is_whitespace, "whitespace")
}

/// One or more whitespace characters
pub fn whitespaces() -> BoxedParser<char, ()> {
    pattern(patterns::whitespaces, "whitespaces")
}

pub fn identifier() -> BoxedParser<char, ()> {
    pattern(patterns::identifier, "identifier")
}

pub fn integer() -> BoxedParser<char, ()> {
    pattern(patterns::integer, "integer")
}

pub fn decimal() -> BoxedParser<char, ()> {
    pattern(patterns::decimal, "decimal number")
}

pub fn scientific() -> BoxedParser<char, ()> {
    pattern(patterns::scientific, "scientific notation")
}

pub fn hex_integer() -> BoxedParser<char, ()> {
    pattern(patterns::hex_integer, "hex integer")
}

pub fn oct_integer() -> BoxedParser<char, ()> {
    pattern(patterns::oct_integer, "octal integer")
}

pub fn dec_integer() -> BoxedParser<char, ()> {
    pattern(patterns::dec_integer, "decimal integer")
}

pub fn line_comment(prefix: &str) -> BoxedParser<char, ()> {
    let chars: Vec<char> = prefix.chars().collect();
    pattern(move |src, at| patterns::line_comment(src, at, &chars), "line comment")
}

pub fn block_comment(open: &str, close: &str) -> BoxedParser<char, ()> {
    let open: Vec<char> = open.chars().collect();
    let close: Vec<char> = close.chars().collect();
    pattern(
        move |src, at| patterns::block_comment(src, at, &open, &close),
        "block comment",
    )
}

/// Whitespace, `//` line comments and `/* */` block comments, one or more
pub fn whitespaces_and_comments() -> BoxedParser<char, ()> {
    skip_some(choice(vec![
        whitespaces(),
        line_comment("//"),
        block_comment("/*", "*/"),
    ]))
}

/// A single character between `quote`s, escapes resolved
pub fn char_literal(quote: char) -> BoxedParser<char, char> {
    BoxedParser::new(move |state: &mut ParseState<char>| {
        let literal = patterns::quoted(state.input(), state.position(), quote).and_then(
            |(end, content)| {
                let mut chars = content.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some((end, c)),
                    _ => None,
                }
            },
        );
        match literal {
            Some((end, c)) => {
                state.advance_to(end);
                Ok(c)
            }
            None => Err(state.expected_here("character literal")),
        }
    })
}

/// A run of characters between `quote`s, escapes resolved
pub fn string_literal(quote: char) -> BoxedParser<char, String> {
    BoxedParser::new(move |state: &mut ParseState<char>| {
        match patterns::quoted(state.input(), state.position(), quote) {
            Some((end, content)) => {
                state.advance_to(end);
                Ok(content)
            }
            None => Err(state.expected_here("string literal")),
        }
    })
}
