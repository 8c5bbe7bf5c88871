//! Paths locating a value inside a root structure.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use crate::tree::{canonical_index, PropertyKey, Symbol};

/// One step of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
    Symbol(Symbol),
}

/// An ordered list of segments; empty denotes the root.
pub type Path = Vec<Segment>;

impl Segment {
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Segment::Index(index) => Some(*index),
            _ => None,
        }
    }

    pub fn is_index(&self) -> bool {
        matches!(self, Segment::Index(_))
    }

    /// The property this segment addresses on a keyed value.
    pub fn to_property_key(&self) -> PropertyKey {
        match self {
            Segment::Key(name) => PropertyKey::Name(name.clone()),
            Segment::Index(index) => PropertyKey::Name(index.to_string()),
            Segment::Symbol(symbol) => PropertyKey::Symbol(symbol.clone()),
        }
    }

    /// Text form used for ordering and encoding. Symbols use their description.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Segment::Key(name) => Cow::Borrowed(name),
            Segment::Index(index) => Cow::Owned(index.to_string()),
            Segment::Symbol(symbol) => Cow::Borrowed(symbol.description().unwrap_or_default()),
        }
    }

    /// The same segment, with canonical decimal keys turned into indexes.
    pub fn normalized(self) -> Segment {
        match self {
            Segment::Key(name) => match canonical_index(&name) {
                Some(index) => Segment::Index(index),
                None => Segment::Key(name),
            },
            other => other,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Symbol(symbol) => write!(f, "{}", symbol),
            other => f.write_str(&other.as_text()),
        }
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

impl From<Symbol> for Segment {
    fn from(symbol: Symbol) -> Self {
        Segment::Symbol(symbol)
    }
}

impl From<&PropertyKey> for Segment {
    fn from(key: &PropertyKey) -> Self {
        key.to_segment()
    }
}

/// Orders two segments: indexes numerically, everything else by text.
pub fn compare_segments(a: &Segment, b: &Segment) -> Ordering {
    match (a, b) {
        (Segment::Index(x), Segment::Index(y)) => x.cmp(y),
        _ => a.as_text().cmp(&b.as_text()),
    }
}

/// Orders paths shorter first, then segment by segment.
///
/// Length-first ordering keeps every run of siblings contiguous, which is
/// what change-set grouping relies on.
pub fn compare_paths(a: &[Segment], b: &[Segment]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| compare_segments(x, y))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    })
}

pub fn is_prefix(prefix: &[Segment], path: &[Segment]) -> bool {
    prefix.len() <= path.len()
        && prefix
            .iter()
            .zip(path.iter())
            .all(|(p, s)| p == s || p.as_text() == s.as_text())
}

/// Builds a child path.
pub fn child(path: &[Segment], segment: Segment) -> Path {
    let mut next = Vec::with_capacity(path.len() + 1);
    next.extend_from_slice(path);
    next.push(segment);
    next
}
