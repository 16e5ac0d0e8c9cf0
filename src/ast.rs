use std::borrow::Cow;
use std::fmt;
use std::io;
use std::str::FromStr;

use serde::Serialize;
use serde_json::ser::{CharEscape, CompactFormatter, Formatter};
use serde_json::{Map, Serializer, Value};

use crate::error::ParseError;

/// A parsed `$name(args)` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Call<'a> {
    pub name: Cow<'a, str>,
    pub args: Vec<Argument<'a>>,
}

/// One element of a call's argument list.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument<'a> {
    /// Nested call: `$inner(...)`
    Call(Call<'a>),
    /// Decoded `{...}` literal
    Object(Map<String, Value>),
    /// Decoded `[...]` literal
    Array(Vec<Value>),
    /// Trimmed text up to the next `,` or `)`, quotes included.
    /// An empty argument slot is represented as Raw("")
    Raw(Cow<'a, str>),
}

impl<'a> Call<'a> {
    pub fn new(name: impl Into<Cow<'a, str>>, args: Vec<Argument<'a>>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Argument<'a>] {
        &self.args
    }

    /// Nesting depth of the call tree. A call without nested call
    /// arguments has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .args
            .iter()
            .filter_map(Argument::as_call)
            .map(Call::depth)
            .max()
            .unwrap_or(0)
    }

    /// Detach the tree from the input it was parsed from.
    pub fn into_owned(self) -> Call<'static> {
        Call {
            name: Cow::Owned(self.name.into_owned()),
            args: self.args.into_iter().map(Argument::into_owned).collect(),
        }
    }
}

impl<'a> Argument<'a> {
    /// Shorthand for a raw token argument.
    pub fn raw(text: impl Into<Cow<'a, str>>) -> Self {
        Argument::Raw(text.into())
    }

    pub fn as_call(&self) -> Option<&Call<'a>> {
        match self {
            Argument::Call(call) => Some(call),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Argument::Raw(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            Argument::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Argument::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_owned(self) -> Argument<'static> {
        match self {
            Argument::Call(call) => Argument::Call(call.into_owned()),
            Argument::Object(map) => Argument::Object(map),
            Argument::Array(items) => Argument::Array(items),
            Argument::Raw(text) => Argument::Raw(Cow::Owned(text.into_owned())),
        }
    }
}

impl<'a> From<Call<'a>> for Argument<'a> {
    fn from(call: Call<'a>) -> Self {
        Argument::Call(call)
    }
}

/// Renders the call back into expression syntax. JSON literals are
/// written compact, so the output is structurally (not byte-for-byte)
/// equal to the parsed source.
impl fmt::Display for Call<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for Argument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Call(call) => write!(f, "{call}"),
            Argument::Object(map) => write_literal(f, map),
            Argument::Array(items) => write_literal(f, items),
            Argument::Raw(text) => f.write_str(text),
        }
    }
}

/// Compact JSON that writes `"` inside strings as `\u0022`, so the only
/// quote marks in the output delimit strings and the literal scanner reads
/// it back in either quote mode.
struct LiteralFormatter;

impl Formatter for LiteralFormatter {
    fn write_char_escape<W>(&mut self, writer: &mut W, char_escape: CharEscape) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        match char_escape {
            CharEscape::Quote => writer.write_all(b"\\u0022"),
            other => CompactFormatter.write_char_escape(writer, other),
        }
    }
}

fn write_literal<T: Serialize + ?Sized>(f: &mut fmt::Formatter<'_>, value: &T) -> fmt::Result {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, LiteralFormatter);
    value.serialize(&mut ser).map_err(|_| fmt::Error)?;
    f.write_str(std::str::from_utf8(&buf).map_err(|_| fmt::Error)?)
}

impl FromStr for Call<'static> {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parser::parse(s).map(Call::into_owned)
    }
}
