//! Span scanners for literal and raw-token arguments.
//!
//! Both scanners only locate spans; decoding literal spans is left to the
//! caller.

use std::fmt;

use tracing::trace;

use crate::cursor::{Cursor, is_whitespace};

/// The two bracketed literal forms an argument may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    /// `{ ... }`
    Object,
    /// `[ ... ]`
    Array,
}

impl LiteralKind {
    pub fn open(self) -> char {
        match self {
            LiteralKind::Object => '{',
            LiteralKind::Array => '[',
        }
    }

    pub fn close(self) -> char {
        match self {
            LiteralKind::Object => '}',
            LiteralKind::Array => ']',
        }
    }

    /// The literal kind opened by `c`, if any.
    pub fn from_open(c: char) -> Option<Self> {
        match c {
            '{' => Some(LiteralKind::Object),
            '[' => Some(LiteralKind::Array),
            _ => None,
        }
    }
}

impl fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralKind::Object => f.write_str("object"),
            LiteralKind::Array => f.write_str("array"),
        }
    }
}

/// How `"` is treated while scanning a literal span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteMode {
    /// Every `"` toggles the quoted region, backslashes included.
    /// A string value containing `\"` ends the quoted region early.
    #[default]
    Naive,
    /// Inside a quoted region `\` makes the following character inert,
    /// so `\"` does not close the region.
    Escaped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    InLiteral(usize),
    InQuotedLiteral(usize),
    InEscape(usize),
}

impl ScanState {
    fn depth(self) -> usize {
        match self {
            ScanState::InLiteral(depth)
            | ScanState::InQuotedLiteral(depth)
            | ScanState::InEscape(depth) => depth,
        }
    }

    fn step(self, c: char, kind: LiteralKind, mode: QuoteMode) -> Self {
        match self {
            ScanState::InLiteral(depth) => match c {
                '"' => ScanState::InQuotedLiteral(depth),
                c if c == kind.open() => ScanState::InLiteral(depth + 1),
                c if c == kind.close() => ScanState::InLiteral(depth.saturating_sub(1)),
                _ => self,
            },
            ScanState::InQuotedLiteral(depth) => match c {
                '"' => ScanState::InLiteral(depth),
                '\\' if mode == QuoteMode::Escaped => ScanState::InEscape(depth),
                _ => self,
            },
            ScanState::InEscape(depth) => ScanState::InQuotedLiteral(depth),
        }
    }
}

/// Scan a balanced literal span starting at the cursor's opening delimiter.
///
/// Only delimiters of `kind` are counted, and only outside quoted regions.
/// The scan stops just past the delimiter that brings the depth back to
/// zero, or at end of input if that never happens; an unterminated span
/// is returned as-is.
pub fn scan_balanced<'a>(
    cursor: &mut Cursor<'a>,
    kind: LiteralKind,
    mode: QuoteMode,
) -> &'a str {
    let start = cursor.pos();
    let mut state = ScanState::InLiteral(0);
    while let Some(c) = cursor.bump() {
        state = state.step(c, kind, mode);
        if state.depth() == 0 {
            break;
        }
    }
    let span = cursor.slice(start, cursor.pos());
    trace!(
        %kind,
        start,
        end = cursor.pos(),
        terminated = state.depth() == 0,
        "scanned literal span"
    );
    span
}

/// Scan a raw token: everything up to the next `,` or `)`, trimmed.
///
/// Separators are matched lexically, so a raw token never contains either
/// character.
pub fn scan_raw<'a>(cursor: &mut Cursor<'a>) -> &'a str {
    let start = cursor.pos();
    cursor.eat_while(|c| c != ',' && c != ')');
    cursor.slice(start, cursor.pos()).trim_matches(is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balanced(input: &str, kind: LiteralKind, mode: QuoteMode) -> (&str, usize) {
        let mut cursor = Cursor::new(input);
        let span = scan_balanced(&mut cursor, kind, mode);
        (span, cursor.pos())
    }

    #[test]
    fn test_nested_braces() {
        let (span, end) = balanced(
            r#"{"a":{"b":{}}},rest"#,
            LiteralKind::Object,
            QuoteMode::Naive,
        );
        assert_eq!(span, r#"{"a":{"b":{}}}"#);
        assert_eq!(end, span.len());
    }

    #[test]
    fn test_quoted_delimiters_ignored() {
        let (span, _) = balanced(r#"{"}":2}, x"#, LiteralKind::Object, QuoteMode::Naive);
        assert_eq!(span, r#"{"}":2}"#);

        let (span, _) = balanced(r#"["]", "[["], 1"#, LiteralKind::Array, QuoteMode::Naive);
        assert_eq!(span, r#"["]", "[["]"#);
    }

    #[test]
    fn test_only_own_delimiter_counted() {
        let (span, _) = balanced(r#"[{"a":[1]}, {]"#, LiteralKind::Array, QuoteMode::Naive);
        assert_eq!(span, r#"[{"a":[1]}, {]"#);
    }

    #[test]
    fn test_unterminated_runs_to_end() {
        let (span, end) = balanced(r#"{"a":{1}"#, LiteralKind::Object, QuoteMode::Naive);
        assert_eq!(span, r#"{"a":{1}"#);
        assert_eq!(end, 8);

        let (span, _) = balanced(r#"{"open"#, LiteralKind::Object, QuoteMode::Naive);
        assert_eq!(span, r#"{"open"#);
    }

    #[test]
    fn test_escaped_quote_naive_vs_escaped() {
        // Naive toggling leaves the quoted region at `\"`, so the `}` inside
        // the string closes the literal early.
        let input = r#"{"a":"x\"}"},tail"#;
        let (span, _) = balanced(input, LiteralKind::Object, QuoteMode::Naive);
        assert_eq!(span, r#"{"a":"x\"}"#);

        let (span, _) = balanced(input, LiteralKind::Object, QuoteMode::Escaped);
        assert_eq!(span, r#"{"a":"x\"}"}"#);
    }

    #[test]
    fn test_raw_token_trimmed() {
        let mut cursor = Cursor::new("  2006-01-02 15:04:05 , now)");
        assert_eq!(scan_raw(&mut cursor), "2006-01-02 15:04:05");
        assert_eq!(cursor.peek(), Some(','));
    }

    #[test]
    fn test_raw_token_keeps_quotes() {
        let mut cursor = Cursor::new(r#""a b" )"#);
        assert_eq!(scan_raw(&mut cursor), r#""a b""#);
        assert_eq!(cursor.peek(), Some(')'));
    }

    #[test]
    fn test_raw_token_trim_set() {
        let mut cursor = Cursor::new("\u{feff} x \u{feff},");
        assert_eq!(scan_raw(&mut cursor), "x");

        let mut cursor = Cursor::new("\u{85}x\u{85})");
        assert_eq!(scan_raw(&mut cursor), "\u{85}x\u{85}");
    }

    #[test]
    fn test_raw_token_empty_at_close() {
        let mut cursor = Cursor::new(")");
        assert_eq!(scan_raw(&mut cursor), "");
        assert_eq!(cursor.pos(), 0);
    }
}
