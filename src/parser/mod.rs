//! # Combinator Engine
//!
//! Everything needed to build and run parsers over any input element type:
//!
//! - [`state`] - the per-parse [`ParseState`] and the [`Parser`] contract
//! - [`combinators`] - [`BoxedParser`] and the combinator library
//! - [`reference`] - lazy references for recursive grammars
//! - [`error`] - failure recording and rendering
//! - [`source`] - line/column resolution
//! - [`trace`] - optional parse tracing
//!
//! ## Backtracking
//!
//! A parser that fails leaves the index where it found it, so `a | b` always
//! runs `b` from the same place as `a`. The only way to stop an alternative
//! from being tried is [`BoxedParser::atomic`]: once the atomic parser has
//! consumed input, its failure is [`Failed::Committed`] and propagates
//! through every enclosing choice.
//!
//! ## Operators
//!
//! | Operator | Meaning                          |
//! |----------|----------------------------------|
//! | `a + b`  | sequence, keep both `(A, B)`     |
//! | `a - b`  | sequence, keep `A`               |
//! | `a * b`  | sequence, keep `B`               |
//! | `a \| b` | choice                           |
//! | `a >> f` | map                              |

pub mod combinators;
pub mod error;
pub mod reference;
pub mod source;
pub mod state;
pub mod trace;

pub use combinators::*;
pub use error::{Encountered, Failure, ParseError};
pub use reference::Reference;
pub use source::LineIndex;
pub use state::{Describe, Failed, ParseResult, ParseState, Parser};
pub use trace::{DisabledTrace, LogTrace, ParserTrace, TraceNode, TreeTrace};
