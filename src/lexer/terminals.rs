//! # Terminals
//!
//! The keyword/operator registry and the tokenizer built from it.
//!
//! ```
//! use parsnip::lexer::scanners::whitespaces;
//! use parsnip::lexer::terminals::Terminals;
//!
//! let terminals = Terminals::builder()
//!     .operators(["+", "-", "=="])
//!     .keywords(["if", "then", "else"])
//!     .build()
//!     .unwrap();
//!
//! let parser = terminals
//!     .phrase(&["if", "then"])
//!     .from(terminals.tokenizer(), whitespaces());
//! assert!(parser.parse("if   then").is_ok());
//! ```
//!
//! ## Tokenizing
//!
//! At each position the tokenizer compares the longest operator match with
//! what the word scanner matches. The longer match wins; on a tie the
//! operator wins. A word equal to a keyword (under the configured case rule)
//! becomes [`TokenKind::Reserved`] with the registered spelling, any other
//! word becomes [`TokenKind::Identifier`].

use std::collections::HashMap;

use log::{debug, warn};
use thiserror::Error;

use crate::parser::combinators::{BoxedParser, sequence};
use crate::parser::state::{Failed, ParseState, Parser};

use super::numbers::{dec_to_long, hex_to_long, oct_to_long, split_scientific};
use super::scanners;
use super::token::{Token, TokenKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaseSensitivity {
    #[default]
    Sensitive,
    Insensitive,
}

impl CaseSensitivity {
    fn normalize(self, lexeme: &str) -> String {
        match self {
            CaseSensitivity::Sensitive => lexeme.to_string(),
            CaseSensitivity::Insensitive => lexeme.to_lowercase(),
        }
    }
}

/// Invalid terminals configuration, reported by [`TerminalsBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TerminalsError {
    #[error("duplicate terminal: `{duplicate}` collides with `{existing}`")]
    Duplicate { existing: String, duplicate: String },

    #[error("empty string registered as a terminal")]
    Empty,
}

#[derive(Debug, Clone, Default)]
pub struct TerminalsBuilder {
    operators: Vec<String>,
    keywords: Vec<String>,
    case: CaseSensitivity,
    words: Option<BoxedParser<char, ()>>,
}

impl TerminalsBuilder {
    pub fn operators<S: Into<String>>(mut self, operators: impl IntoIterator<Item = S>) -> Self {
        self.operators.extend(operators.into_iter().map(Into::into));
        self
    }

    pub fn keywords<S: Into<String>>(mut self, keywords: impl IntoIterator<Item = S>) -> Self {
        self.keywords.extend(keywords.into_iter().map(Into::into));
        self
    }

    pub fn case_sensitive(self) -> Self {
        self.case(CaseSensitivity::Sensitive)
    }

    pub fn case_insensitive(self) -> Self {
        self.case(CaseSensitivity::Insensitive)
    }

    pub fn case(mut self, case: CaseSensitivity) -> Self {
        self.case = case;
        self
    }

    /// The scanner recognizing words, keywords included. Defaults to
    /// [`scanners::identifier`] when keywords are registered.
    pub fn words(mut self, scanner: BoxedParser<char, ()>) -> Self {
        self.words = Some(scanner);
        self
    }

    pub fn build(self) -> Result<Terminals, TerminalsError> {
        check_duplicates(&self.operators, &self.keywords, self.case)?;

        let case = self.case;
        let keywords: HashMap<String, String> = self
            .keywords
            .iter()
            .map(|keyword| (case.normalize(keyword), keyword.clone()))
            .collect();
        let words = match self.words {
            Some(scanner) => Some(scanner),
            None if !keywords.is_empty() => Some(scanners::identifier()),
            None => None,
        };

        debug!(
            "built terminals: {} operators, {} keywords, {:?}",
            self.operators.len(),
            keywords.len(),
            case
        );

        let tokenizer = tokenizer(self.operators.clone(), keywords.clone(), case, words);
        Ok(Terminals {
            operators: self.operators,
            keywords,
            case,
            tokenizer,
        })
    }
}

/// Rejects empty lexemes and lexemes equal under `case`, across operators and
/// keywords alike.
pub fn check_duplicates(
    operators: &[String],
    keywords: &[String],
    case: CaseSensitivity,
) -> Result<(), TerminalsError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for lexeme in operators.iter().chain(keywords) {
        if lexeme.is_empty() {
            return Err(TerminalsError::Empty);
        }
        if let Some(existing) = seen.insert(case.normalize(lexeme), lexeme) {
            return Err(TerminalsError::Duplicate {
                existing: existing.to_string(),
                duplicate: lexeme.clone(),
            });
        }
    }
    Ok(())
}

/// Registry of keywords and operators with the tokenizer recognizing them.
#[derive(Debug, Clone)]
pub struct Terminals {
    operators: Vec<String>,
    /// normalized spelling -> registered spelling
    keywords: HashMap<String, String>,
    case: CaseSensitivity,
    tokenizer: BoxedParser<char, Token>,
}

impl Terminals {
    pub fn builder() -> TerminalsBuilder {
        TerminalsBuilder::default()
    }

    pub fn case(&self) -> CaseSensitivity {
        self.case
    }

    pub fn tokenizer(&self) -> BoxedParser<char, Token> {
        self.tokenizer.clone()
    }

    /// The registered spelling `name` resolves to, if it is a terminal.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.operators
            .iter()
            .find(|operator| operator.as_str() == name)
            .or_else(|| self.keywords.get(&self.case.normalize(name)))
            .map(String::as_str)
    }

    /// Matches a reserved token spelled like any of `names`.
    ///
    /// Fails with all `names` as expected labels, e.g.
    /// `+, -, foo or bar expected, baz encountered.`
    pub fn token<S: AsRef<str>>(&self, names: &[S]) -> BoxedParser<Token, Token> {
        let labels: Vec<String> = names.iter().map(|name| name.as_ref().to_string()).collect();
        let lexemes: Vec<String> = labels
            .iter()
            .filter_map(|name| {
                let resolved = self.resolve(name).map(str::to_string);
                if resolved.is_none() {
                    warn!("`{name}` is not a registered terminal and will never match");
                }
                resolved
            })
            .collect();

        BoxedParser::new(move |state: &mut ParseState<Token>| {
            let matched = state
                .peek()
                .and_then(Token::reserved)
                .is_some_and(|lexeme| lexemes.iter().any(|l| l == lexeme));
            if matched {
                state.advance().cloned().ok_or(Failed::Recoverable)
            } else {
                Err(state.expected_any_here(&labels))
            }
        })
    }

    /// Matches exactly the given words in order, labelled as the whole phrase.
    pub fn phrase<S: AsRef<str>>(&self, words: &[S]) -> BoxedParser<Token, Vec<Token>> {
        let label = words
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ");
        sequence(words.iter().map(|word| self.token(&[word])).collect()).label(label)
    }
}

fn longest_operator<'a>(operators: &'a [Vec<char>], src: &[char], at: usize) -> Option<(usize, &'a [char])> {
    operators
        .iter()
        .filter(|operator| src[at..].starts_with(operator))
        // max_by_key keeps the last maximum, so go in reverse to prefer earlier entries
        .rev()
        .max_by_key(|operator| operator.len())
        .map(|operator| (at + operator.len(), operator.as_slice()))
}

fn tokenizer(
    operators: Vec<String>,
    keywords: HashMap<String, String>,
    case: CaseSensitivity,
    words: Option<BoxedParser<char, ()>>,
) -> BoxedParser<char, Token> {
    let operator_chars: Vec<Vec<char>> = operators.iter().map(|op| op.chars().collect()).collect();

    BoxedParser::new(move |state: &mut ParseState<char>| {
        let start = state.position();
        let operator = longest_operator(&operator_chars, state.input(), start)
            .map(|(end, op)| (end, op.iter().collect::<String>()));
        let word_end = words.as_ref().and_then(|scanner| {
            let earlier = state.take_failure();
            let peak = state.peak();
            let end = scanner.apply(state).ok().map(|()| state.position());
            state.restore(start);
            state.reset_peak(peak);
            state.take_failure();
            state.absorb(earlier);
            end.filter(|end| *end > start)
        });

        let (end, kind) = match (operator, word_end) {
            (Some((op_end, _)), Some(end)) if end > op_end => (end, word_kind(state, start, end, &keywords, case)),
            (Some((op_end, lexeme)), _) => (op_end, TokenKind::Reserved(lexeme)),
            (None, Some(end)) => (end, word_kind(state, start, end, &keywords, case)),
            (None, None) => return Err(state.expected_any_here(&operators)),
        };
        let text: String = state.slice(start, end).iter().collect();
        state.advance_to(end);
        Ok(Token::new(start, end, kind, text))
    })
}

fn word_kind(
    state: &ParseState<char>,
    start: usize,
    end: usize,
    keywords: &HashMap<String, String>,
    case: CaseSensitivity,
) -> TokenKind {
    let text: String = state.slice(start, end).iter().collect();
    match keywords.get(&case.normalize(&text)) {
        Some(keyword) => TokenKind::Reserved(keyword.clone()),
        None => TokenKind::Identifier(text),
    }
}

// === Literal tokenizers ===

fn tokenize<V, F>(scanner: BoxedParser<char, V>, kind: F) -> BoxedParser<char, Token>
where
    V: 'static,
    F: Fn(V, &str) -> TokenKind + Send + Sync + 'static,
{
    BoxedParser::new(move |state: &mut ParseState<char>| {
        let start = state.position();
        let value = scanner.apply(state)?;
        let end = state.position();
        let text: String = state.slice(start, end).iter().collect();
        Ok(Token::new(start, end, kind(value, &text), text))
    })
}

pub fn identifier_tokenizer() -> BoxedParser<char, Token> {
    tokenize(scanners::identifier(), |(), text| TokenKind::Identifier(text.to_string()))
}

pub fn integer_tokenizer() -> BoxedParser<char, Token> {
    tokenize(scanners::integer(), |(), text| TokenKind::Integer(text.to_string()))
}

pub fn decimal_tokenizer() -> BoxedParser<char, Token> {
    tokenize(scanners::decimal(), |(), text| TokenKind::Decimal(text.to_string()))
}

pub fn scientific_tokenizer() -> BoxedParser<char, Token> {
    tokenize(scanners::scientific(), |(), text| {
        let (significand, exponent) = split_scientific(text);
        TokenKind::Scientific {
            significand,
            exponent,
        }
    })
}

pub fn hex_tokenizer() -> BoxedParser<char, Token> {
    tokenize(scanners::hex_integer(), |(), text| TokenKind::Long(hex_to_long(text)))
}

pub fn oct_tokenizer() -> BoxedParser<char, Token> {
    tokenize(scanners::oct_integer(), |(), text| TokenKind::Long(oct_to_long(text)))
}

pub fn dec_tokenizer() -> BoxedParser<char, Token> {
    tokenize(scanners::dec_integer(), |(), text| TokenKind::Long(dec_to_long(text)))
}

/// Hex if prefixed with `0x`, octal if it starts with `0`, decimal otherwise.
/// A lone `0` is octal.
pub fn long_tokenizer() -> BoxedParser<char, Token> {
    (hex_tokenizer() | oct_tokenizer() | dec_tokenizer()).label("integer")
}

pub fn char_literal_tokenizer(quote: char) -> BoxedParser<char, Token> {
    tokenize(scanners::char_literal(quote), |c, _| TokenKind::Char(c))
}

pub fn string_literal_tokenizer(quote: char) -> BoxedParser<char, Token> {
    tokenize(scanners::string_literal(quote), |content, _| TokenKind::Str(content))
}

// === Token-level literal parsers ===

fn literal<V, F>(label: &'static str, extract: F) -> BoxedParser<Token, V>
where
    V: 'static,
    F: Fn(&TokenKind) -> Option<V> + Send + Sync + 'static,
{
    BoxedParser::new(move |state: &mut ParseState<Token>| {
        match state.peek().and_then(|token| extract(&token.kind)) {
            Some(value) => {
                state.advance();
                Ok(value)
            }
            None => Err(state.expected_here(label)),
        }
    })
}

pub fn identifier() -> BoxedParser<Token, String> {
    literal("identifier", |kind| match kind {
        TokenKind::Identifier(name) => Some(name.clone()),
        _ => None,
    })
}

pub fn integer() -> BoxedParser<Token, String> {
    literal("integer", |kind| match kind {
        TokenKind::Integer(text) => Some(text.clone()),
        _ => None,
    })
}

pub fn decimal() -> BoxedParser<Token, String> {
    literal("decimal number", |kind| match kind {
        TokenKind::Decimal(text) => Some(text.clone()),
        _ => None,
    })
}

pub fn scientific() -> BoxedParser<Token, (String, String)> {
    literal("scientific notation", |kind| match kind {
        TokenKind::Scientific {
            significand,
            exponent,
        } => Some((significand.clone(), exponent.clone())),
        _ => None,
    })
}

pub fn long() -> BoxedParser<Token, i64> {
    literal("integer", |kind| match kind {
        TokenKind::Long(value) => Some(*value),
        _ => None,
    })
}

pub fn char_literal() -> BoxedParser<Token, char> {
    literal("character literal", |kind| match kind {
        TokenKind::Char(c) => Some(*c),
        _ => None,
    })
}

pub fn string_literal() -> BoxedParser<Token, String> {
    literal("string literal", |kind| match kind {
        TokenKind::Str(content) => Some(content.clone()),
        _ => None,
    })
}

/// Matches any token whose [`TokenKind::tag`] is one of `tags`, returning its text.
///
/// Fails with `identifier or integer expected, + encountered.` style messages.
pub fn fragment<S: AsRef<str>>(tags: &[S]) -> BoxedParser<Token, String> {
    let tags: Vec<String> = tags.iter().map(|tag| tag.as_ref().to_string()).collect();
    BoxedParser::new(move |state: &mut ParseState<Token>| {
        let matched = state
            .peek()
            .is_some_and(|token| tags.iter().any(|tag| tag == token.kind.tag()));
        if matched {
            state.advance().map(|token| token.text.clone()).ok_or(Failed::Recoverable)
        } else {
            Err(state.expected_any_here(&tags))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn duplicates_follow_case_rule() {
        let keywords = strings(&["a", "b"]);
        let upper = strings(&["A", "B"]);
        assert!(check_duplicates(&upper, &keywords, CaseSensitivity::Sensitive).is_ok());
        assert_eq!(
            check_duplicates(&upper, &keywords, CaseSensitivity::Insensitive),
            Err(TerminalsError::Duplicate {
                existing: "A".into(),
                duplicate: "a".into()
            })
        );
        assert!(check_duplicates(&strings(&["x", "b"]), &keywords, CaseSensitivity::Sensitive).is_err());
    }

    #[test]
    fn empty_lexeme_rejected() {
        assert_eq!(
            check_duplicates(&strings(&[""]), &[], CaseSensitivity::Sensitive),
            Err(TerminalsError::Empty)
        );
    }

    #[test]
    fn longest_operator_prefers_length_then_order() {
        let operators: Vec<Vec<char>> = ["=", "==", ":", "=>"].iter().map(|s| s.chars().collect()).collect();
        let src: Vec<char> = "==>".chars().collect();
        assert_eq!(longest_operator(&operators, &src, 0).map(|(end, _)| end), Some(2));

        let src: Vec<char> = "=>".chars().collect();
        let (_, op) = longest_operator(&operators, &src, 0).unwrap();
        assert_eq!(op, &['=', '>']);
    }
}
