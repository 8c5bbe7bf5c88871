//! Property visibility and path filtering.
//!
//! Two layers live here:
//!
//! - the comparison-time visibility policy ([`list_comparable_members`] and
//!   [`IgnorePolicy`]), which decides which own properties the comparator and
//!   the hasher see at all;
//! - output-time filtering of finished diffs ([`FilterConfig`], [`filter_diff`]).
//!
//! # Pattern Syntax
//!
//! - `foo` - matches literal segment "foo"
//! - `*` - matches any single path segment
//! - `**` - matches any number of path segments (including zero)
//! - `foo.bar` - matches nested path "foo.bar"
//! - `**.version` - matches "version" at any depth
//!
//! # Examples
//!
//! ```
//! use ddiff_rs::filter::PathPattern;
//! use ddiff_rs::Segment;
//!
//! let pattern = PathPattern::parse("metadata.timestamp");
//! assert!(pattern.matches(&[Segment::from("metadata"), Segment::from("timestamp")]));
//!
//! let pattern = PathPattern::parse("**.version");
//! assert!(pattern.matches(&[Segment::from("package"), Segment::from("version")]));
//! assert!(pattern.matches(&[Segment::from("deps"), Segment::Index(0), Segment::from("version")]));
//! ```

use crate::diff::{Diff, DiffConfig, DiffStats};
use crate::path::{child, is_prefix, Path, Segment};
use crate::tree::{canonical_index, PropertyKey, Value};

/// A single segment in a path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
    /// Matches an exact segment, compared by its text form
    Literal(String),
    /// Matches any single path segment (*)
    SingleWildcard,
    /// Matches any number of path segments (**)
    DoubleWildcard,
}

/// A compiled glob pattern over paths.
#[derive(Debug, Clone)]
pub struct PathPattern {
    pub segments: Vec<PatternSegment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        let segments = pattern
            .split('.')
            .map(|s| match s {
                "**" => PatternSegment::DoubleWildcard,
                "*" => PatternSegment::SingleWildcard,
                _ => PatternSegment::Literal(s.to_string()),
            })
            .collect();
        Self { segments }
    }

    pub fn matches(&self, path: &[Segment]) -> bool {
        Self::matches_from(&self.segments, path)
    }

    fn matches_from(pattern: &[PatternSegment], path: &[Segment]) -> bool {
        match (pattern.first(), path.first()) {
            (None, None) => true,
            (None, Some(_)) => false,
            (Some(_), None) => pattern
                .iter()
                .all(|s| matches!(s, PatternSegment::DoubleWildcard)),
            (Some(seg), Some(path_seg)) => match seg {
                PatternSegment::Literal(lit) => {
                    *lit == path_seg.as_text() && Self::matches_from(&pattern[1..], &path[1..])
                }
                PatternSegment::SingleWildcard => Self::matches_from(&pattern[1..], &path[1..]),
                PatternSegment::DoubleWildcard => {
                    Self::matches_from(&pattern[1..], path)
                        || Self::matches_from(pattern, &path[1..])
                }
            },
        }
    }
}

/// Properties removed from comparison on both sides.
#[derive(Debug, Clone, Default)]
pub struct IgnorePolicy {
    /// Property names ignored wherever they occur.
    pub properties: Vec<String>,
    /// Subtrees ignored by path prefix.
    pub paths: Vec<Path>,
    /// Glob patterns matched against the full property path.
    pub patterns: Vec<PathPattern>,
}

impl IgnorePolicy {
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.paths.is_empty() && self.patterns.is_empty()
    }

    /// True when the outcome depends on where a property sits, not just its name.
    pub fn is_path_dependent(&self) -> bool {
        !self.paths.is_empty() || !self.patterns.is_empty()
    }

    /// Decides whether the property `key` of the value at `parent` is ignored.
    pub fn ignores(&self, parent: &[Segment], key: &PropertyKey) -> bool {
        if let Some(name) = key.as_name() {
            if self.properties.iter().any(|p| p == name) {
                return true;
            }
        }
        if !self.is_path_dependent() {
            return false;
        }
        let full = child(parent, key.to_segment());
        self.paths.iter().any(|prefix| is_prefix(prefix, &full))
            || self.patterns.iter().any(|pattern| pattern.matches(&full))
    }
}

/// Lists the own properties of `value` that take part in comparison.
///
/// Sequences never list `length` or index-named properties; their elements
/// are compared structurally.
pub fn list_comparable_members(
    value: &Value,
    path: &[Segment],
    config: &DiffConfig,
) -> Vec<PropertyKey> {
    let is_sequence = matches!(value, Value::Array(_));
    value
        .with_props(|bag| {
            bag.iter()
                .filter(|prop| {
                    if prop.key.is_symbol() && !config.include_symbols {
                        return false;
                    }
                    if !prop.enumerable && !config.include_non_enumerable {
                        return false;
                    }
                    if !config.include_functions && matches!(prop.value, Value::Function(_)) {
                        return false;
                    }
                    if is_sequence {
                        if let Some(name) = prop.key.as_name() {
                            if name == "length" || canonical_index(name).is_some() {
                                return false;
                            }
                        }
                    }
                    !config.ignore.ignores(path, &prop.key)
                })
                .map(|prop| prop.key.clone())
                .collect()
        })
        .unwrap_or_default()
}

/// Configuration for filtering finished diffs.
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    /// Patterns for paths to ignore (exclude from output)
    pub ignore_patterns: Vec<PathPattern>,
    /// Patterns for paths to include (if non-empty, only these are shown)
    pub only_patterns: Vec<PathPattern>,
}

impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignore(mut self, pattern: &str) -> Self {
        self.ignore_patterns.push(PathPattern::parse(pattern));
        self
    }

    pub fn only(mut self, pattern: &str) -> Self {
        self.only_patterns.push(PathPattern::parse(pattern));
        self
    }

    pub fn has_filters(&self) -> bool {
        !self.ignore_patterns.is_empty() || !self.only_patterns.is_empty()
    }

    /// Only-patterns also keep descendants of a matching path.
    pub fn should_include(&self, path: &[Segment]) -> bool {
        if self.ignore_patterns.iter().any(|p| p.matches(path)) {
            return false;
        }
        self.only_patterns.is_empty()
            || self
                .only_patterns
                .iter()
                .any(|p| (0..=path.len()).any(|end| p.matches(&path[..end])))
    }
}

/// Filters a diff based on the filter configuration.
pub fn filter_diff(diff: &Diff, config: &FilterConfig) -> Diff {
    if !config.has_filters() {
        return diff.clone();
    }

    let changes: Vec<_> = diff
        .changes
        .iter()
        .filter(|change| config.should_include(change.path()))
        .cloned()
        .collect();
    let stats = DiffStats::from_changes(&changes);

    Diff { changes, stats }
}
