//! # Parsnip - Composable Parser Combinators
//!
//! Parsnip builds recursive-descent parsers out of small reusable parsers,
//! with automatic backtracking, furthest-failure diagnostics and a two-stage
//! pipeline: character-level scanning into tokens, then token-level grammar
//! parsing with the very same combinators.
//!
//! ## Architecture Overview
//!
//! 1. **Parser** (`parser`) - the engine: [`ParseState`](parser::ParseState),
//!    [`BoxedParser`](parser::BoxedParser), combinators, lazy references,
//!    failure recording and tracing
//! 2. **Lexer** (`lexer`) - scanners over characters, the
//!    [`Terminals`](lexer::Terminals) keyword/operator registry, positioned
//!    [`Token`](lexer::Token)s and the stage-one/stage-two glue
//!
//! ## Pipeline Flow
//!
//! ```text
//! Source Code (&str)
//!     ↓
//! [Tokenizer: scanners + Terminals] → Vec<Token>
//!     ↓
//! [Grammar: BoxedParser<Token, T>] → T
//!     ↓
//! [Entry point] → Result<T, ParseError> (1-based line/column + message)
//! ```
//!
//! ## Key Design Decisions
//!
//! ### Failures Are State, Not Control Flow
//! A failing parser returns `Err` and records what it expected in the parse
//! state. Nothing unwinds, so trying an alternative is a plain function call.
//! The state keeps only the failure at the furthest index reached by any
//! branch; failures at the same index merge their expected labels:
//!
//! ```text
//! +, -, foo or bar expected, baz encountered.
//! ```
//!
//! ### Backtracking by Default
//! A failing parser leaves the index where it found it. An
//! [`atomic`](parser::BoxedParser::atomic) parser that fails after consuming
//! input commits, and enclosing alternatives are skipped.
//!
//! ### Grammar-Authoring Bugs Panic
//! Repetition over a parser that succeeds without consuming input, and lazy
//! references used before being bound, panic. Duplicate terminals are
//! rejected by [`TerminalsBuilder::build`](lexer::TerminalsBuilder::build).
//!
//! ## Module Structure
//!
//! - [`parser`] - combinator engine
//! - [`lexer`] - scanners, terminals and tokens
//!
//! ## Example
//!
//! ```
//! use parsnip::lexer::scanners::whitespaces;
//! use parsnip::lexer::terminals::{self, Terminals};
//! use parsnip::parser::sep_by1;
//!
//! let terminals = Terminals::builder()
//!     .operators([","])
//!     .build()
//!     .unwrap();
//! let tokenizer = terminals.tokenizer() | terminals::long_tokenizer();
//!
//! let list = sep_by1(terminals::long(), terminals.token(&[","]));
//! let parser = list.from(tokenizer, whitespaces());
//!
//! assert_eq!(parser.parse("1, 0x10, 010").unwrap(), vec![1, 16, 8]);
//!
//! let err = parser.parse("1, ,").unwrap_err();
//! assert_eq!((err.line, err.column), (1, 4));
//! ```

pub mod lexer;
pub mod parser;

pub use lexer::{Terminals, Token, TokenKind};
pub use parser::{BoxedParser, ParseError, Parser};
