/// Forward-only read position over the input text.
///
/// Offsets are byte offsets into the input. The position only ever moves
/// forward and never passes the end of the input.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Character at the current position, if any.
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consume the current character.
    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consume `expected` if it is the current character.
    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    pub fn eat_while(&mut self, mut predicate: impl FnMut(char) -> bool) {
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    pub fn skip_whitespace(&mut self) {
        self.eat_while(is_whitespace);
    }

    /// Input between two offsets previously reported by [`Cursor::pos`].
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.input[start..end]
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }
}

/// Whitespace as expressions written for JavaScript hosts see it: Unicode
/// `White_Space` plus the byte order mark, minus NEL (U+0085).
pub fn is_whitespace(c: char) -> bool {
    (c.is_whitespace() && c != '\u{85}') || c == '\u{feff}'
}

/// Identifier characters: ASCII letters, digits and underscore.
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
