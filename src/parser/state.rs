use super::error::{Encountered, Failure};
use super::trace::{DisabledTrace, ParserTrace};

/// Why a parser gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failed {
    /// Alternatives may still be tried from the entry index.
    Recoverable,
    /// An atomic parser failed after consuming input. Enclosing choices,
    /// optionals and repetitions propagate it instead of trying something else.
    Committed,
}

/// The details of a failure live in the [`ParseState`], the result only says
/// whether one happened.
pub type ParseResult<T> = Result<T, Failed>;

/// Renders an input unit for the "encountered" half of a diagnostic.
pub trait Describe {
    fn describe(&self) -> String;
}

impl Describe for char {
    fn describe(&self) -> String {
        self.to_string()
    }
}

/// Mutable state of one top-level parse.
///
/// Holds the input, the current index, the furthest failure recorded so far
/// and the trace observer chosen for this parse. Parsers themselves are
/// immutable; everything that changes during a parse lives here.
pub struct ParseState<I> {
    input: Vec<I>,
    index: usize,
    peak: usize,
    failure: Option<Failure>,
    trace: Box<dyn ParserTrace>,
}

impl<I> ParseState<I> {
    pub fn new(input: Vec<I>) -> Self {
        Self::with_trace(input, Box::new(DisabledTrace))
    }

    pub fn with_trace(input: Vec<I>, trace: Box<dyn ParserTrace>) -> Self {
        Self {
            input,
            index: 0,
            peak: 0,
            failure: None,
            trace,
        }
    }

    pub fn advance(&mut self) -> Option<&I> {
        if self.has_next() {
            self.index += 1;
            self.peak = self.peak.max(self.index);
            self.input.get(self.index - 1)
        } else {
            None
        }
    }

    /// Moves forward to `index`, counting everything in between as consumed.
    pub fn advance_to(&mut self, index: usize) {
        debug_assert!(index >= self.index && index <= self.input.len());
        self.index = index.min(self.input.len());
        self.peak = self.peak.max(self.index);
    }

    pub fn peek(&self) -> Option<&I> {
        self.input.get(self.index)
    }

    pub fn has_next(&self) -> bool {
        self.index < self.input.len()
    }

    pub fn position(&self) -> usize {
        self.index
    }

    pub fn restore(&mut self, position: usize) {
        self.index = position;
    }

    pub fn input(&self) -> &[I] {
        &self.input
    }

    pub fn slice(&self, start: usize, end: usize) -> &[I] {
        &self.input[start..end]
    }

    /// Runs `f`, rewinding to the entry index if it fails.
    pub fn attempt<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        let pos = self.index;
        let result = f(self);
        if result.is_err() {
            self.index = pos;
        }
        result
    }

    /// Records a failure, keeping only the furthest one.
    ///
    /// A deeper failure replaces the current one, a failure at the same index
    /// merges its expected labels after the existing ones, a shallower one is
    /// dropped.
    pub fn record(&mut self, failure: Failure) {
        match &mut self.failure {
            Some(current) if current.at > failure.at => {}
            Some(current) if current.at == failure.at => current.merge(failure),
            slot => *slot = Some(failure),
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    pub fn take_failure(&mut self) -> Option<Failure> {
        self.failure.take()
    }

    /// Puts back a failure taken earlier with [`ParseState::take_failure`],
    /// ordered before whatever was recorded since.
    pub fn absorb(&mut self, earlier: Option<Failure>) {
        let since = std::mem::replace(&mut self.failure, earlier);
        if let Some(failure) = since {
            self.record(failure);
        }
    }

    pub(crate) fn peak(&self) -> usize {
        self.peak
    }

    /// Resets the consumption mark to `at`, returning the previous mark.
    pub(crate) fn reset_peak(&mut self, at: usize) -> usize {
        std::mem::replace(&mut self.peak, at)
    }

    pub(crate) fn raise_peak(&mut self, at: usize) {
        self.peak = self.peak.max(at);
    }

    pub fn trace_mut(&mut self) -> &mut dyn ParserTrace {
        self.trace.as_mut()
    }

    pub fn replace_trace(&mut self, trace: Box<dyn ParserTrace>) -> Box<dyn ParserTrace> {
        std::mem::replace(&mut self.trace, trace)
    }

    pub fn finish(self) -> (Option<Failure>, Box<dyn ParserTrace>) {
        (self.failure, self.trace)
    }
}

impl<I: Describe> ParseState<I> {
    pub fn encountered(&self) -> Encountered {
        match self.peek() {
            Some(unit) => Encountered::Unit(unit.describe()),
            None => Encountered::Eof,
        }
    }

    /// Records that `label` was expected at the current index.
    pub fn expected_here(&mut self, label: impl Into<String>) -> Failed {
        let failure = Failure::new(self.index, self.encountered()).expected(label);
        self.record(failure);
        Failed::Recoverable
    }

    /// Records that any one of `labels` was expected at the current index.
    pub fn expected_any_here<S: AsRef<str>>(&mut self, labels: &[S]) -> Failed {
        let failure = labels.iter().fold(
            Failure::new(self.index, self.encountered()),
            |failure, label| failure.expected(label.as_ref()),
        );
        self.record(failure);
        Failed::Recoverable
    }

    pub fn fail_here(&mut self, message: impl Into<String>) -> Failed {
        let failure = Failure::new(self.index, self.encountered()).message(message);
        self.record(failure);
        Failed::Recoverable
    }
}

/// Anything that can run against a [`ParseState`].
pub trait Parser<I, T>: Sized {
    fn apply(&self, state: &mut ParseState<I>) -> ParseResult<T>;
}

impl<I, T, F: Fn(&mut ParseState<I>) -> ParseResult<T>> Parser<I, T> for F {
    fn apply(&self, state: &mut ParseState<I>) -> ParseResult<T> {
        self(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(source: &str) -> ParseState<char> {
        ParseState::new(source.chars().collect())
    }

    #[test]
    fn deeper_failure_replaces_shallower() {
        let mut state = state("abc");
        state.expected_here("x");
        state.advance();
        state.expected_here("y");
        state.restore(0);
        state.expected_here("z");

        let failure = state.failure().unwrap();
        assert_eq!(failure.at, 1);
        assert_eq!(failure.expected, vec!["y"]);
    }

    #[test]
    fn failures_at_same_index_merge_in_order() {
        let mut state = state("abc");
        state.expected_here("x");
        state.expected_here("y");
        state.expected_here("x");

        assert_eq!(state.failure().unwrap().expected, vec!["x", "y"]);
    }

    #[test]
    fn absorb_keeps_earlier_labels_first() {
        let mut state = state("abc");
        state.expected_here("a");
        let earlier = state.take_failure();
        state.expected_here("b");
        state.absorb(earlier);

        assert_eq!(state.failure().unwrap().expected, vec!["a", "b"]);
    }

    #[test]
    fn attempt_rewinds_on_failure() {
        let mut state = state("abc");
        let result: ParseResult<()> = state.attempt(|state| {
            state.advance();
            state.advance();
            Err(Failed::Recoverable)
        });
        assert!(result.is_err());
        assert_eq!(state.position(), 0);
        assert_eq!(state.peak(), 2);
    }

    #[test]
    fn encountered_at_end_is_eof() {
        let mut state = state("a");
        state.advance();
        assert_eq!(state.encountered(), Encountered::Eof);
    }
}
