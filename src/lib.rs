//! Parser for `$name(arg, ...)` call expressions.
//!
//! Arguments are nested calls, JSON object or array literals, or raw
//! tokens passed through verbatim.

pub mod ast;
pub mod cursor;
pub mod error;
pub mod parser;
pub mod scanner;

pub use ast::{Argument, Call};
pub use error::{Expected, LiteralKind, ParseError};
pub use parser::{CallParser, ParserConfig, parse};
pub use scanner::QuoteMode;
