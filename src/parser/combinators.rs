use std::fmt;
use std::ops::{Add, BitOr, Mul, Shr, Sub};
use std::sync::Arc;

use log::debug;

use super::error::{Encountered, Failure, ParseError};
use super::source::LineIndex;
use super::state::{Describe, Failed, ParseResult, ParseState, Parser};
use super::trace::{DisabledTrace, ParserTrace, TraceNode, TreeTrace};

type ParserFn<I, T> = Arc<dyn Fn(&mut ParseState<I>) -> ParseResult<T> + Send + Sync>;

// === Boxed Parser for type erasure ===

/// A shareable parser node.
///
/// Cloning is cheap and shares the node, so one parser can appear in many
/// places of a grammar. Nodes never change after construction and can be used
/// from several threads at once, each parse owning its own [`ParseState`].
pub struct BoxedParser<I, T> {
    parser: ParserFn<I, T>,
}

impl<I, T> Clone for BoxedParser<I, T> {
    fn clone(&self) -> Self {
        BoxedParser {
            parser: Arc::clone(&self.parser),
        }
    }
}

impl<I, T> fmt::Debug for BoxedParser<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BoxedParser")
    }
}

impl<I: 'static, T: 'static> BoxedParser<I, T> {
    pub fn new<P: Parser<I, T> + Send + Sync + 'static>(parser: P) -> Self {
        BoxedParser {
            parser: Arc::new(move |state: &mut ParseState<I>| parser.apply(state)),
        }
    }
}

impl<I, T> Parser<I, T> for BoxedParser<I, T> {
    fn apply(&self, state: &mut ParseState<I>) -> ParseResult<T> {
        (self.parser)(state)
    }
}

// === Combinators as methods ===

impl<I: Describe + 'static, T: 'static> BoxedParser<I, T> {
    /// Sequence: parse self then other, return (T, U)
    pub fn seq<U: 'static>(self, other: BoxedParser<I, U>) -> BoxedParser<I, (T, U)> {
        BoxedParser::new(move |state: &mut ParseState<I>| {
            state.attempt(|state| {
                let a = self.apply(state)?;
                let b = other.apply(state)?;
                Ok((a, b))
            })
        })
    }

    /// Keep left: parse self then other, discard other's result
    pub fn skip<U: 'static>(self, other: BoxedParser<I, U>) -> BoxedParser<I, T> {
        BoxedParser::new(move |state: &mut ParseState<I>| {
            state.attempt(|state| {
                let a = self.apply(state)?;
                other.apply(state)?;
                Ok(a)
            })
        })
    }

    /// Keep right: parse self then other, discard self's result
    pub fn skip_left<U: 'static>(self, other: BoxedParser<I, U>) -> BoxedParser<I, U> {
        BoxedParser::new(move |state: &mut ParseState<I>| {
            state.attempt(|state| {
                self.apply(state)?;
                other.apply(state)
            })
        })
    }

    /// Alias of [`BoxedParser::skip_left`]
    pub fn then<U: 'static>(self, other: BoxedParser<I, U>) -> BoxedParser<I, U> {
        self.skip_left(other)
    }

    /// Map: transform result
    pub fn map<U: 'static, F: Fn(T) -> U + Send + Sync + 'static>(self, f: F) -> BoxedParser<I, U> {
        BoxedParser::new(move |state: &mut ParseState<I>| self.apply(state).map(&f))
    }

    /// Choice: try self, if it fails without committing try other from the same index
    pub fn or(self, other: BoxedParser<I, T>) -> BoxedParser<I, T> {
        BoxedParser::new(move |state: &mut ParseState<I>| {
            let pos = state.position();
            match self.apply(state) {
                Ok(a) => Ok(a),
                Err(Failed::Committed) => Err(Failed::Committed),
                Err(Failed::Recoverable) => {
                    // the failure stays recorded and merges with other's
                    state.restore(pos);
                    other.apply(state)
                }
            }
        })
    }

    /// Add a label to this parser for better error messages.
    ///
    /// If the parser fails before getting past its entry index, whatever it
    /// expected there is replaced by `name`. Deeper failures are kept as they
    /// are.
    pub fn label(self, name: impl Into<String>) -> BoxedParser<I, T> {
        let name = name.into();
        BoxedParser::new(move |state: &mut ParseState<I>| {
            let pos = state.position();
            let earlier = state.take_failure();
            state.trace_mut().push(&name);
            let result = self.apply(state);
            state.trace_mut().pop();
            if result.is_err() && state.failure().is_none_or(|failure| failure.at <= pos) {
                state.take_failure();
                state.restore(pos);
                state.expected_here(name.as_str());
            }
            state.absorb(earlier);
            result
        })
    }

    /// Report this parser's invocations and results to the trace observer.
    pub fn traced(self, name: impl Into<String>) -> BoxedParser<I, T>
    where
        T: fmt::Debug,
    {
        let name = name.into();
        BoxedParser::new(move |state: &mut ParseState<I>| {
            state.trace_mut().push(&name);
            let result = self.apply(state);
            if let Ok(value) = &result {
                state.trace_mut().set_current_result(value);
            }
            state.trace_mut().pop();
            result
        })
    }

    /// Commit once input has been consumed.
    ///
    /// A failure after this parser got past its entry index becomes
    /// [`Failed::Committed`], so enclosing alternatives are not tried.
    pub fn atomic(self) -> BoxedParser<I, T> {
        BoxedParser::new(move |state: &mut ParseState<I>| {
            let pos = state.position();
            let outer_peak = state.reset_peak(pos);
            let result = self.apply(state);
            let consumed = state.peak() > pos;
            state.raise_peak(outer_peak);
            match result {
                Err(Failed::Recoverable) if consumed => {
                    state.restore(pos);
                    Err(Failed::Committed)
                }
                other => other,
            }
        })
    }

    /// Lookahead: run self, then rewind regardless of the outcome.
    ///
    /// The consumption mark is rewound too, so an enclosing [`atomic`](Self::atomic)
    /// does not commit on lookahead alone.
    pub fn peek(self) -> BoxedParser<I, T> {
        BoxedParser::new(move |state: &mut ParseState<I>| {
            let pos = state.position();
            let peak = state.peak();
            let result = self.apply(state);
            state.restore(pos);
            state.reset_peak(peak);
            result
        })
    }

    /// Require end of input after self
    pub fn end(self) -> BoxedParser<I, T> {
        self.skip(eof())
    }

    /// Parse `input` as a whole, without line information.
    pub fn parse_input(&self, input: Vec<I>) -> Result<T, Failure> {
        let mut state = ParseState::new(input);
        let result = self.clone().end().apply(&mut state);
        let len = state.input().len();
        let (failure, _) = state.finish();
        result.map_err(|_| {
            failure.unwrap_or_else(|| Failure::new(len, Encountered::Eof).message("parse failed"))
        })
    }
}

// === Entry points over characters ===

impl<T: 'static> BoxedParser<char, T> {
    /// Parse a whole source text. Trailing input is a failure.
    pub fn parse(&self, source: &str) -> Result<T, ParseError> {
        self.run(source, Box::new(DisabledTrace)).0
    }

    /// Parse a whole source text, recording labelled and traced parsers.
    pub fn parse_traced(&self, source: &str) -> (Result<T, ParseError>, Vec<TraceNode>) {
        self.run(source, Box::new(TreeTrace::new()))
    }

    pub fn parse_with_trace(
        &self,
        source: &str,
        trace: Box<dyn ParserTrace>,
    ) -> (Result<T, ParseError>, Vec<TraceNode>) {
        self.run(source, trace)
    }

    /// Parse a leading part of `source`.
    ///
    /// Returns the value together with the char index where this parser
    /// stopped; the rest of the input is left unexamined.
    pub fn parse_prefix(&self, source: &str) -> Result<(T, usize), ParseError> {
        let parser = self.clone();
        let positioned = BoxedParser::new(move |state: &mut ParseState<char>| {
            let value = parser.apply(state)?;
            Ok((value, state.position()))
        });
        run_chars(&positioned, source, Box::new(DisabledTrace)).0
    }

    fn run(&self, source: &str, trace: Box<dyn ParserTrace>) -> (Result<T, ParseError>, Vec<TraceNode>) {
        run_chars(&self.clone().end(), source, trace)
    }

    /// Replace the result with the source text this parser matched.
    pub fn source(self) -> BoxedParser<char, String> {
        BoxedParser::new(move |state: &mut ParseState<char>| {
            let start = state.position();
            self.apply(state)?;
            Ok(state.slice(start, state.position()).iter().collect())
        })
    }
}

fn run_chars<T: 'static>(
    parser: &BoxedParser<char, T>,
    source: &str,
    trace: Box<dyn ParserTrace>,
) -> (Result<T, ParseError>, Vec<TraceNode>) {
    let chars: Vec<char> = source.chars().collect();
    let lines = LineIndex::new(&chars);
    let len = chars.len();
    let mut state = ParseState::with_trace(chars, trace);

    let result = parser.apply(&mut state);
    let (failure, trace) = state.finish();
    let nodes = trace.finish();

    let result = result.map_err(|_| {
        let err = match failure {
            Some(failure) => ParseError::locate(&failure, &lines),
            None => {
                let (line, column) = lines.locate(len);
                ParseError::new(line, column, "parse failed")
            }
        };
        debug!("parse failed at {}:{}: {}", err.line, err.column, err.message);
        err
    });
    (result, nodes)
}

// === Operator Overloading ===

/// `+` for sequence: A + B -> (A, B)
impl<I: Describe + 'static, T: 'static, U: 'static> Add<BoxedParser<I, U>> for BoxedParser<I, T> {
    type Output = BoxedParser<I, (T, U)>;

    fn add(self, rhs: BoxedParser<I, U>) -> Self::Output {
        self.seq(rhs)
    }
}

/// `-` for keep left: A - B -> A (parse B, discard result)
impl<I: Describe + 'static, T: 'static, U: 'static> Sub<BoxedParser<I, U>> for BoxedParser<I, T> {
    type Output = BoxedParser<I, T>;

    fn sub(self, rhs: BoxedParser<I, U>) -> Self::Output {
        self.skip(rhs)
    }
}

/// `*` for keep right: A * B -> B (parse A, discard result)
impl<I: Describe + 'static, T: 'static, U: 'static> Mul<BoxedParser<I, U>> for BoxedParser<I, T> {
    type Output = BoxedParser<I, U>;

    fn mul(self, rhs: BoxedParser<I, U>) -> Self::Output {
        self.skip_left(rhs)
    }
}

/// `|` for choice: A | B -> A or B
impl<I: Describe + 'static, T: 'static> BitOr<BoxedParser<I, T>> for BoxedParser<I, T> {
    type Output = BoxedParser<I, T>;

    fn bitor(self, rhs: BoxedParser<I, T>) -> Self::Output {
        self.or(rhs)
    }
}

/// `>>` for map: A >> fn -> B
impl<I, T, U, F> Shr<F> for BoxedParser<I, T>
where
    I: Describe + 'static,
    T: 'static,
    U: 'static,
    F: Fn(T) -> U + Send + Sync + 'static,
{
    type Output = BoxedParser<I, U>;

    fn shr(self, f: F) -> Self::Output {
        self.map(f)
    }
}

// === Primitive Parsers ===

/// Match one unit satisfying `predicate`, expecting `label` otherwise
pub fn satisfy<I, F>(predicate: F, label: impl Into<String>) -> BoxedParser<I, I>
where
    I: Describe + Clone + 'static,
    F: Fn(&I) -> bool + Send + Sync + 'static,
{
    let label = label.into();
    BoxedParser::new(move |state: &mut ParseState<I>| match state.peek() {
        Some(unit) if predicate(unit) => state.advance().cloned().ok_or(Failed::Recoverable),
        _ => Err(state.expected_here(label.as_str())),
    })
}

/// Match any single unit
pub fn any<I: Describe + Clone + 'static>() -> BoxedParser<I, I> {
    satisfy(|_| true, "any")
}

/// Succeed at end of input only
pub fn eof<I: Describe + 'static>() -> BoxedParser<I, ()> {
    BoxedParser::new(|state: &mut ParseState<I>| {
        if state.has_next() {
            Err(state.expected_here("EOF"))
        } else {
            Ok(())
        }
    })
}

/// Succeed with `value` without consuming anything
pub fn constant<I: 'static, T: Clone + Send + Sync + 'static>(value: T) -> BoxedParser<I, T> {
    BoxedParser::new(move |_: &mut ParseState<I>| Ok(value.clone()))
}

/// Always fail with `message`
pub fn fail<I: Describe + 'static, T: 'static>(message: impl Into<String>) -> BoxedParser<I, T> {
    let message = message.into();
    BoxedParser::new(move |state: &mut ParseState<I>| Err(state.fail_here(message.as_str())))
}

// === Repetition ===

fn repeat<I, T>(parser: &BoxedParser<I, T>, state: &mut ParseState<I>, results: &mut Vec<T>) -> ParseResult<()> {
    loop {
        let pos = state.position();
        match parser.apply(state) {
            Ok(item) => {
                if state.position() == pos {
                    panic!(
                        "repetition over a parser that succeeded without consuming input at index {pos}; \
                         the grammar would loop forever"
                    );
                }
                results.push(item);
            }
            Err(Failed::Recoverable) => {
                state.restore(pos);
                return Ok(());
            }
            Err(Failed::Committed) => return Err(Failed::Committed),
        }
    }
}

/// Parse zero or more occurrences
///
/// # Panics
///
/// When `parser` succeeds without consuming input.
pub fn many<I: Describe + 'static, T: 'static>(parser: BoxedParser<I, T>) -> BoxedParser<I, Vec<T>> {
    BoxedParser::new(move |state: &mut ParseState<I>| {
        state.attempt(|state| {
            let mut results = Vec::new();
            repeat(&parser, state, &mut results)?;
            Ok(results)
        })
    })
}

/// Parse one or more occurrences
///
/// # Panics
///
/// When `parser` succeeds without consuming input.
pub fn some<I: Describe + 'static, T: 'static>(parser: BoxedParser<I, T>) -> BoxedParser<I, Vec<T>> {
    BoxedParser::new(move |state: &mut ParseState<I>| {
        state.attempt(|state| {
            let mut results = vec![parser.apply(state)?];
            repeat(&parser, state, &mut results)?;
            Ok(results)
        })
    })
}

/// Parse zero or more occurrences, discarding them
pub fn skip_many<I: Describe + 'static, T: 'static>(parser: BoxedParser<I, T>) -> BoxedParser<I, ()> {
    many(parser).map(|_| ())
}

/// Parse one or more occurrences, discarding them
pub fn skip_some<I: Describe + 'static, T: 'static>(parser: BoxedParser<I, T>) -> BoxedParser<I, ()> {
    some(parser).map(|_| ())
}

/// Parse exactly `count` occurrences
pub fn times<I: Describe + 'static, T: 'static>(parser: BoxedParser<I, T>, count: usize) -> BoxedParser<I, Vec<T>> {
    BoxedParser::new(move |state: &mut ParseState<I>| {
        state.attempt(|state| (0..count).map(|_| parser.apply(state)).collect())
    })
}

/// Optional: parse zero or one
pub fn optional<I: Describe + 'static, T: 'static>(parser: BoxedParser<I, T>) -> BoxedParser<I, Option<T>> {
    BoxedParser::new(move |state: &mut ParseState<I>| {
        let pos = state.position();
        match parser.apply(state) {
            Ok(item) => Ok(Some(item)),
            Err(Failed::Recoverable) => {
                state.restore(pos);
                Ok(None)
            }
            Err(Failed::Committed) => Err(Failed::Committed),
        }
    })
}

/// Optional with a fallback value
pub fn optional_or<I, T>(parser: BoxedParser<I, T>, default: T) -> BoxedParser<I, T>
where
    I: Describe + 'static,
    T: Clone + Send + Sync + 'static,
{
    optional(parser).map(move |item| item.unwrap_or_else(|| default.clone()))
}

/// Succeed without consuming when `parser` does not match here
pub fn not_followed_by<I: Describe + 'static, T: 'static>(
    parser: BoxedParser<I, T>,
    label: impl Into<String>,
) -> BoxedParser<I, ()> {
    let message = format!("unexpected {}", label.into());
    BoxedParser::new(move |state: &mut ParseState<I>| {
        let pos = state.position();
        let peak = state.peak();
        let earlier = state.take_failure();
        let matched = parser.apply(state).is_ok();
        state.restore(pos);
        state.reset_peak(peak);
        state.take_failure();
        state.absorb(earlier);
        if matched {
            Err(state.fail_here(message.as_str()))
        } else {
            Ok(())
        }
    })
}

// === Structural sugar ===

/// Run every parser in order, collecting the results
pub fn sequence<I: Describe + 'static, T: 'static>(parsers: Vec<BoxedParser<I, T>>) -> BoxedParser<I, Vec<T>> {
    BoxedParser::new(move |state: &mut ParseState<I>| {
        state.attempt(|state| parsers.iter().map(|parser| parser.apply(state)).collect())
    })
}

/// Try each parser in order
pub fn choice<I: Describe + 'static, T: 'static>(parsers: Vec<BoxedParser<I, T>>) -> BoxedParser<I, T> {
    parsers
        .into_iter()
        .reduce(BoxedParser::or)
        .unwrap_or_else(|| fail("no alternatives to choose from"))
}

/// open, then parser, then close; keeps the parser's result
pub fn between<I: Describe + 'static, O: 'static, T: 'static, C: 'static>(
    open: BoxedParser<I, O>,
    parser: BoxedParser<I, T>,
    close: BoxedParser<I, C>,
) -> BoxedParser<I, T> {
    open * parser - close
}

/// One or more occurrences separated by `separator`
pub fn sep_by1<I: Describe + 'static, T: 'static, S: 'static>(
    parser: BoxedParser<I, T>,
    separator: BoxedParser<I, S>,
) -> BoxedParser<I, Vec<T>> {
    let rest = many(separator * parser.clone());
    (parser + rest).map(|(first, rest)| {
        let mut items = Vec::with_capacity(rest.len() + 1);
        items.push(first);
        items.extend(rest);
        items
    })
}

/// Zero or more occurrences separated by `separator`
pub fn sep_by<I: Describe + 'static, T: 'static, S: 'static>(
    parser: BoxedParser<I, T>,
    separator: BoxedParser<I, S>,
) -> BoxedParser<I, Vec<T>> {
    optional(sep_by1(parser, separator)).map(Option::unwrap_or_default)
}

/// Zero or more occurrences separated and optionally terminated by `separator`
pub fn sep_end_by<I: Describe + 'static, T: 'static, S: 'static>(
    parser: BoxedParser<I, T>,
    separator: BoxedParser<I, S>,
) -> BoxedParser<I, Vec<T>> {
    let items = sep_by1(parser, separator.clone()) - optional(separator);
    optional(items).map(Option::unwrap_or_default)
}
