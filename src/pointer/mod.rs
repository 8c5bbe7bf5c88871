//! Textual notations for paths.
//!
//! Three interchangeable schemes are supported:
//!
//! | scheme    | root | example                       |
//! |-----------|------|-------------------------------|
//! | `pointer` | `#`  | `#/one/2/prop%20with%20space` |
//! | `dotted`  | `.`  | `.one.[2].["prop with space"]`|
//! | `json`    | `[]` | `["one",2,"prop%20with%20space"]` |
//!
//! Dotted and json notations round-trip every path. The pointer notation
//! decodes canonical decimal segments as indexes, so a string key such as
//! `"3"` comes back as index 3.

mod dotted;
mod fragment;
mod json;

use std::fmt;
use std::str::FromStr;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use strum::{AsRefStr, Display, EnumString};

use crate::error::PointerError;
use crate::path::{Path, Segment};

/// Characters left alone by `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PathScheme {
    #[default]
    Pointer,
    Dotted,
    Json,
}

impl PathScheme {
    /// Looks a scheme up by name.
    pub fn from_name(name: &str) -> Result<Self, PointerError> {
        PathScheme::from_str(name).map_err(|_| PointerError::UnknownScheme {
            name: name.to_string(),
        })
    }

    /// Picks the scheme by the leading character of an encoded path.
    pub fn detect(src: &str) -> Option<Self> {
        match src.chars().next()? {
            '#' => Some(PathScheme::Pointer),
            '.' => Some(PathScheme::Dotted),
            '[' => Some(PathScheme::Json),
            _ => None,
        }
    }

    pub fn encode(self, path: &[Segment]) -> String {
        match self {
            PathScheme::Pointer => fragment::encode(path),
            PathScheme::Dotted => dotted::encode(path),
            PathScheme::Json => json::encode(path),
        }
    }

    pub fn decode(self, src: &str) -> Result<Path, PointerError> {
        match self {
            PathScheme::Pointer => fragment::decode(src),
            PathScheme::Dotted => dotted::decode(src),
            PathScheme::Json => json::decode(src),
        }
    }
}

/// Encodes a path in the default (pointer) notation.
pub fn encode_pointer(path: &[Segment]) -> String {
    PathScheme::default().encode(path)
}

/// Decodes a path written in any of the three notations.
pub fn decode_pointer(src: &str) -> Result<Path, PointerError> {
    match PathScheme::detect(src) {
        Some(scheme) => scheme.decode(src),
        None => Err(PointerError::malformed(
            "pointer",
            0,
            "expected one of '#', '.', or '['",
        )),
    }
}

/// A path together with its canonical pointer text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPointer {
    path: Path,
    pointer: String,
}

impl PathPointer {
    pub fn new(path: Path) -> Self {
        let pointer = encode_pointer(&path);
        PathPointer { path, pointer }
    }

    /// Parses an encoded path in any notation and canonicalizes it.
    pub fn parse(src: &str) -> Result<Self, PointerError> {
        decode_pointer(src).map(PathPointer::new)
    }

    pub fn path(&self) -> &[Segment] {
        &self.path
    }

    pub fn pointer(&self) -> &str {
        &self.pointer
    }

    pub fn into_path(self) -> Path {
        self.path
    }
}

impl fmt::Display for PathPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pointer)
    }
}

impl From<Path> for PathPointer {
    fn from(path: Path) -> Self {
        PathPointer::new(path)
    }
}

fn percent_encode(text: &str) -> String {
    utf8_percent_encode(text, COMPONENT).to_string()
}

fn percent_decode(
    text: &str,
    scheme: &'static str,
    position: usize,
) -> Result<String, PointerError> {
    percent_decode_str(text)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| PointerError::malformed(scheme, position, "invalid percent-encoded UTF-8"))
}

/// Minimal scanner shared by the decoders. Positions are byte offsets.
struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    scheme: &'static str,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str, scheme: &'static str) -> Self {
        Cursor {
            src,
            pos: 0,
            scheme,
        }
    }

    fn pos(&self) -> usize {
        self.pos
    }

    fn is_done(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn expect(&mut self, expected: char) -> Result<(), PointerError> {
        match self.peek() {
            Some(ch) if ch == expected => {
                self.pos += ch.len_utf8();
                Ok(())
            }
            Some(ch) => Err(self.error(format!("expected '{}' but found '{}'", expected, ch))),
            None => Err(self.error(format!("expected '{}' but reached the end", expected))),
        }
    }

    fn take_while(&mut self, mut pred: impl FnMut(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
        &self.src[start..self.pos]
    }

    fn error(&self, message: impl Into<String>) -> PointerError {
        self.error_at(self.pos, message)
    }

    fn error_at(&self, position: usize, message: impl Into<String>) -> PointerError {
        PointerError::malformed(self.scheme, position, message)
    }

    /// Parses a non-empty run of decimal digits found at `position`.
    fn decimal(&self, digits: &str, position: usize) -> Result<usize, PointerError> {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(self.error_at(position, "expected decimal digits"));
        }
        digits
            .parse()
            .map_err(|_| self.error_at(position, "index out of range"))
    }
}
