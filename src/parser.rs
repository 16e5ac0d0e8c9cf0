use std::borrow::Cow;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::ast::{Argument, Call};
use crate::cursor::{Cursor, is_word_char};
use crate::error::{Expected, ParseError};
use crate::scanner::{LiteralKind, QuoteMode, scan_balanced, scan_raw};

const START_SYMBOL: char = '$';
const OPEN_PAREN: char = '(';
const CLOSE_PAREN: char = ')';
const COMMA: char = ',';

/// Parser settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Deepest call nesting accepted; the top-level call counts as 1.
    pub max_depth: usize,
    pub quote_mode: QuoteMode,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: 100,
            quote_mode: QuoteMode::Naive,
        }
    }
}

impl ParserConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_quote_mode(mut self, quote_mode: QuoteMode) -> Self {
        self.quote_mode = quote_mode;
        self
    }
}

/// Recursive-descent parser for `$name(args)` expressions.
///
/// Holds configuration only. Each parse runs on its own [`Cursor`], so a
/// single parser can be shared freely.
#[derive(Debug, Clone, Default)]
pub struct CallParser {
    config: ParserConfig,
}

impl CallParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse the call expression at the start of `input`.
    ///
    /// Leading whitespace is skipped; anything after the closing `)` is
    /// ignored.
    pub fn parse<'a>(&self, input: &'a str) -> Result<Call<'a>, ParseError> {
        self.parse_prefix(input).map(|(call, _)| call)
    }

    /// Like [`CallParser::parse`], also returning the byte offset just past
    /// the call's closing `)`.
    pub fn parse_prefix<'a>(&self, input: &'a str) -> Result<(Call<'a>, usize), ParseError> {
        let mut cursor = Cursor::new(input);
        match self.parse_call(&mut cursor, 1) {
            Ok(call) => {
                debug!(
                    name = %call.name,
                    args = call.args.len(),
                    end = cursor.pos(),
                    "parsed call"
                );
                Ok((call, cursor.pos()))
            }
            Err(err) => {
                debug!(%err, "call parse failed");
                Err(err)
            }
        }
    }

    /// `Call := '$' Identifier '(' ArgList ')'`
    fn parse_call<'a>(
        &self,
        cursor: &mut Cursor<'a>,
        depth: usize,
    ) -> Result<Call<'a>, ParseError> {
        cursor.skip_whitespace();
        if depth > self.config.max_depth {
            return Err(ParseError::DepthLimitExceeded {
                limit: self.config.max_depth,
                offset: cursor.pos(),
            });
        }
        expect(cursor, START_SYMBOL, Expected::StartSymbol)?;

        let start = cursor.pos();
        cursor.eat_while(is_word_char);
        let name = cursor.slice(start, cursor.pos());
        trace!(name, depth, offset = start, "parse_call");

        cursor.skip_whitespace();
        expect(cursor, OPEN_PAREN, Expected::OpenParen)?;
        let args = self.parse_args(cursor, depth)?;
        cursor.skip_whitespace();
        expect(cursor, CLOSE_PAREN, Expected::CloseParen)?;

        Ok(Call {
            name: Cow::Borrowed(name),
            args,
        })
    }

    /// Arguments up to, not including, the closing `)`.
    ///
    /// Always yields at least one argument: `$foo()` has a single empty
    /// raw argument.
    fn parse_args<'a>(
        &self,
        cursor: &mut Cursor<'a>,
        depth: usize,
    ) -> Result<Vec<Argument<'a>>, ParseError> {
        let mut args = Vec::new();
        loop {
            cursor.skip_whitespace();
            args.push(self.parse_argument(cursor, depth)?);
            cursor.skip_whitespace();
            if !cursor.eat(COMMA) {
                break;
            }
        }
        Ok(args)
    }

    fn parse_argument<'a>(
        &self,
        cursor: &mut Cursor<'a>,
        depth: usize,
    ) -> Result<Argument<'a>, ParseError> {
        match cursor.peek() {
            Some(START_SYMBOL) => self.parse_call(cursor, depth + 1).map(Argument::Call),
            Some(c) => match LiteralKind::from_open(c) {
                Some(kind) => self.parse_literal(cursor, kind),
                None => Ok(raw_argument(cursor)),
            },
            None => Ok(raw_argument(cursor)),
        }
    }

    fn parse_literal<'a>(
        &self,
        cursor: &mut Cursor<'a>,
        kind: LiteralKind,
    ) -> Result<Argument<'a>, ParseError> {
        let offset = cursor.pos();
        let span = scan_balanced(cursor, kind, self.config.quote_mode);
        let decode_err = |source| ParseError::LiteralDecode {
            kind,
            offset,
            source,
        };
        match kind {
            LiteralKind::Object => serde_json::from_str::<Map<String, Value>>(span)
                .map(Argument::Object)
                .map_err(decode_err),
            LiteralKind::Array => serde_json::from_str::<Vec<Value>>(span)
                .map(Argument::Array)
                .map_err(decode_err),
        }
    }
}

fn raw_argument<'a>(cursor: &mut Cursor<'a>) -> Argument<'a> {
    let text = scan_raw(cursor);
    trace!(text, end = cursor.pos(), "raw argument");
    Argument::Raw(Cow::Borrowed(text))
}

fn expect(cursor: &mut Cursor<'_>, c: char, expected: Expected) -> Result<(), ParseError> {
    if cursor.eat(c) {
        Ok(())
    } else {
        Err(ParseError::MalformedCall {
            expected,
            offset: cursor.pos(),
        })
    }
}

/// Parse `input` with the default configuration.
pub fn parse(input: &str) -> Result<Call<'_>, ParseError> {
    CallParser::default().parse(input)
}
