use std::fmt;

use thiserror::Error;

pub use crate::scanner::LiteralKind;

/// The grammar construct missing at the position a call failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    StartSymbol,
    OpenParen,
    CloseParen,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::StartSymbol => f.write_str("expected start symbol `$`"),
            Expected::OpenParen => f.write_str("expected '(' after function name"),
            Expected::CloseParen => f.write_str("expected ')' after function args"),
        }
    }
}

/// Reasons a parse is aborted. Offsets are byte offsets into the input.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed call at offset {offset}: {expected}")]
    MalformedCall { expected: Expected, offset: usize },

    #[error("invalid {kind} literal at offset {offset}: {source}")]
    LiteralDecode {
        kind: LiteralKind,
        offset: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("call nesting exceeds maximum depth of {limit} at offset {offset}")]
    DepthLimitExceeded { limit: usize, offset: usize },
}

impl ParseError {
    pub fn offset(&self) -> usize {
        match self {
            ParseError::MalformedCall { offset, .. }
            | ParseError::LiteralDecode { offset, .. }
            | ParseError::DepthLimitExceeded { offset, .. } => *offset,
        }
    }
}
