//! DDIFF - Deep structural diff and patch for object graphs.
//!
//! This library compares two arbitrary value graphs (objects, arrays, maps,
//! sets, dates, regular expressions and scalars, possibly cyclic), produces
//! an ordered list of path-addressed change records, and applies or reverts
//! those records against a target value in place.
//!
//! # Example
//!
//! ```
//! use ddiff_rs::{apply, compute_diff, revert, DiffConfig, Value};
//! use serde_json::json;
//!
//! let subject = Value::from(json!({"name": "Alice", "tags": ["a", "b"]}));
//! let comparand = Value::from(json!({"name": "Alicia", "tags": ["a", "c", "b"]}));
//!
//! let config = DiffConfig::default();
//! let diff = compute_diff(&subject, &comparand, &config).unwrap();
//! assert_eq!(diff.stats.edited, 1);
//! assert_eq!(diff.stats.added, 1);
//!
//! let target = subject.deep_clone();
//! let patched = apply(&target, &diff.changes, &config).unwrap();
//! assert_eq!(patched, comparand);
//!
//! let restored = revert(&patched, &diff.changes, &config).unwrap();
//! assert_eq!(restored, subject);
//! ```

pub mod access;
pub mod change;
pub mod change_set;
pub mod diff;
pub mod error;
pub mod filter;
pub mod hash;
pub mod kind;
pub mod output;
pub mod parser;
pub mod path;
pub mod pointer;
pub mod property_set;
pub mod sequence;
pub mod serialize;
pub mod tree;

// Re-export commonly used types for convenience
pub use access::{Accessor, DirectAccessor, DirectMutator, Mutator};
pub use change::{ChangeKind, ChangeRecord};
pub use change_set::{apply, calculate_change_sets, revert, sort_changes, ChangeSet, ChangeSetKind};
pub use diff::{changes, compute_diff, Changes, Diff, DiffConfig, DiffStats};
pub use error::{DdiffError, DiffError, OutputError, ParseError, PatchError, PointerError, SerializeError};
pub use filter::{FilterConfig, IgnorePolicy, PathPattern};
pub use hash::{looks_equal, ContentHasher};
pub use kind::SemanticKind;
pub use output::{format_diff, OutputFormat, OutputOptions};
pub use parser::{parse_file, parse_json, parse_toml, parse_yaml};
pub use path::{Path, Segment};
pub use pointer::{decode_pointer, encode_pointer, PathPointer, PathScheme};
pub use serialize::{value_from_json, value_to_json, CompactFormat, TextFormat};
pub use tree::{PropertyBag, PropertyKey, Symbol, Value};
