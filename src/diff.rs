//! Core structural diff algorithm.
//!
//! This module compares two value graphs and yields the changes needed to go
//! from the subject to the comparand. The walk is lazy: [`changes`] returns an
//! iterator that does only as much work as the caller pulls, driven by an
//! explicit task stack so deep graphs never grow the native call stack.
//!
//! Cycles are tolerated by tracking, per side, the depth at which each
//! container is currently being visited. A pair of containers that both
//! close a cycle at the same depth is considered equivalent; any other
//! revisit is reported as an edit.
//!
//! # Examples
//!
//! ```
//! use ddiff_rs::{compute_diff, DiffConfig, Value};
//! use serde_json::json;
//!
//! let old = Value::from(json!({"age": 30}));
//! let new = Value::from(json!({"age": 31}));
//!
//! let diff = compute_diff(&old, &new, &DiffConfig::default()).unwrap();
//!
//! assert_eq!(diff.stats.edited, 1);
//! assert_eq!(diff.changes[0].pointer(), "#/age");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use tracing::{debug, trace};

use crate::access::{Accessor, DirectAccessor, DirectMutator, Mutator};
use crate::change::{ChangeKind, ChangeRecord};
use crate::error::{DiffError, PointerError};
use crate::filter::{list_comparable_members, IgnorePolicy, PathPattern};
use crate::hash::ContentHasher;
use crate::kind::SemanticKind;
use crate::path::{child, Path, Segment};
use crate::pointer::{decode_pointer, encode_pointer};
use crate::property_set::align_keys;
use crate::sequence::{align_sequences, Alignment};
use crate::tree::{PropertyKey, Value};

/// Returns true to skip the pair at `path` entirely.
pub type FilterHook = Rc<dyn Fn(&[Segment], &Value, &Value) -> bool>;
/// Replaces the pair at `path` before it is compared.
pub type NormalizeHook = Rc<dyn Fn(&[Segment], Value, Value) -> (Value, Value)>;
/// Stable identity of a sequence element, used to recognize moves.
pub type IdentityHook = Rc<dyn Fn(&Value) -> Option<String>>;

/// Statistics about the diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    /// Number of added members
    pub added: usize,
    /// Number of removed members
    pub removed: usize,
    /// Number of edited members
    pub edited: usize,
    /// Number of relocated sequence elements
    pub moved: usize,
}

impl DiffStats {
    /// Creates a new DiffStats with all counts at zero.
    pub fn new() -> Self {
        Self {
            added: 0,
            removed: 0,
            edited: 0,
            moved: 0,
        }
    }

    pub fn from_changes(changes: &[ChangeRecord]) -> Self {
        let mut stats = Self::new();
        for change in changes {
            stats.record(change);
        }
        stats
    }

    pub fn record(&mut self, change: &ChangeRecord) {
        match change.kind() {
            ChangeKind::Added => self.added += 1,
            ChangeKind::Removed => self.removed += 1,
            ChangeKind::Edited => self.edited += 1,
            ChangeKind::Moved => self.moved += 1,
        }
    }

    /// Returns the total number of changes.
    pub fn total_changes(&self) -> usize {
        self.added + self.removed + self.edited + self.moved
    }

    /// Returns true if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.total_changes() == 0
    }
}

impl Default for DiffStats {
    fn default() -> Self {
        Self::new()
    }
}

/// The complete diff result.
#[derive(Debug, Clone)]
pub struct Diff {
    /// List of all changes, in traversal order
    pub changes: Vec<ChangeRecord>,
    /// Summary statistics
    pub stats: DiffStats,
}

impl Diff {
    /// Creates a new empty Diff.
    pub fn new() -> Self {
        Self {
            changes: Vec::new(),
            stats: DiffStats::new(),
        }
    }

    /// Returns true if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

impl Default for Diff {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<ChangeRecord>> for Diff {
    fn from(changes: Vec<ChangeRecord>) -> Self {
        let stats = DiffStats::from_changes(&changes);
        Self { changes, stats }
    }
}

/// Configuration for comparison and for replaying changes.
///
/// The same configuration should be used to compute a diff and to apply or
/// revert it, since the accessor and mutator seams live here too.
#[derive(Clone)]
pub struct DiffConfig {
    /// Compare strings after trimming and collapsing runs of whitespace
    pub ignore_whitespace: bool,
    /// Compare non-enumerable own properties
    pub include_non_enumerable: bool,
    /// Compare symbol-keyed own properties
    pub include_symbols: bool,
    /// Compare properties whose value is a function
    pub include_functions: bool,
    /// Treat sequences as bags; indices in records refer to hash order
    pub ignore_array_order: bool,
    /// Properties hidden from comparison on both sides
    pub ignore: IgnorePolicy,
    pub filter: Option<FilterHook>,
    pub normalize: Option<NormalizeHook>,
    pub element_identity: Option<IdentityHook>,
    pub accessor: Rc<dyn Accessor>,
    pub mutator: Rc<dyn Mutator>,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            ignore_whitespace: false,
            include_non_enumerable: false,
            include_symbols: false,
            include_functions: false,
            ignore_array_order: false,
            ignore: IgnorePolicy::default(),
            filter: None,
            normalize: None,
            element_identity: None,
            accessor: Rc::new(DirectAccessor),
            mutator: Rc::new(DirectMutator),
        }
    }
}

impl fmt::Debug for DiffConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffConfig")
            .field("ignore_whitespace", &self.ignore_whitespace)
            .field("include_non_enumerable", &self.include_non_enumerable)
            .field("include_symbols", &self.include_symbols)
            .field("include_functions", &self.include_functions)
            .field("ignore_array_order", &self.ignore_array_order)
            .field("ignore", &self.ignore)
            .field("filter", &self.filter.is_some())
            .field("normalize", &self.normalize.is_some())
            .field("element_identity", &self.element_identity.is_some())
            .finish_non_exhaustive()
    }
}

impl DiffConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, hook: impl Fn(&[Segment], &Value, &Value) -> bool + 'static) -> Self {
        self.filter = Some(Rc::new(hook));
        self
    }

    pub fn with_normalize(
        mut self,
        hook: impl Fn(&[Segment], Value, Value) -> (Value, Value) + 'static,
    ) -> Self {
        self.normalize = Some(Rc::new(hook));
        self
    }

    pub fn with_identity(mut self, hook: impl Fn(&Value) -> Option<String> + 'static) -> Self {
        self.element_identity = Some(Rc::new(hook));
        self
    }

    pub fn with_accessor(mut self, accessor: impl Accessor + 'static) -> Self {
        self.accessor = Rc::new(accessor);
        self
    }

    pub fn with_mutator(mut self, mutator: impl Mutator + 'static) -> Self {
        self.mutator = Rc::new(mutator);
        self
    }

    /// Ignores every property with this name, at any depth.
    pub fn ignore_property(mut self, name: impl Into<String>) -> Self {
        self.ignore.properties.push(name.into());
        self
    }

    /// Ignores the subtree at `pointer`, written in any path notation.
    pub fn ignore_path(mut self, pointer: &str) -> Result<Self, PointerError> {
        self.ignore.paths.push(decode_pointer(pointer)?);
        Ok(self)
    }

    /// Ignores properties whose full path matches a glob pattern.
    pub fn ignore_pattern(mut self, pattern: &str) -> Self {
        self.ignore.patterns.push(PathPattern::parse(pattern));
        self
    }
}

enum Task {
    Compare {
        path: Path,
        subject: Value,
        comparand: Value,
    },
    Emit(ChangeRecord),
    Release {
        left: usize,
        right: usize,
    },
}

/// Lazy iterator over the differences between two values.
///
/// Yields records in traversal order. The first error ends the iteration.
pub struct Changes<'c> {
    config: &'c DiffConfig,
    hasher: ContentHasher<'c>,
    tasks: Vec<Task>,
    /// Containers on the current branch with the depth they were entered at.
    /// The values are held so their addresses cannot be reused meanwhile.
    left_stack: HashMap<usize, (Value, usize)>,
    right_stack: HashMap<usize, (Value, usize)>,
    members: HashMap<usize, (Value, Vec<PropertyKey>)>,
    emitted: usize,
    done: bool,
}

/// Starts a comparison of `subject` against `comparand` at the root.
pub fn changes<'c>(subject: &Value, comparand: &Value, config: &'c DiffConfig) -> Changes<'c> {
    Changes::new(subject, comparand, Vec::new(), config)
}

impl<'c> Changes<'c> {
    /// Starts a comparison whose records are reported under `path`.
    pub fn new(subject: &Value, comparand: &Value, path: Path, config: &'c DiffConfig) -> Self {
        debug!(pointer = %encode_pointer(&path), "starting comparison");
        Changes {
            config,
            hasher: ContentHasher::new(config),
            tasks: vec![Task::Compare {
                path,
                subject: subject.clone(),
                comparand: comparand.clone(),
            }],
            left_stack: HashMap::new(),
            right_stack: HashMap::new(),
            members: HashMap::new(),
            emitted: 0,
            done: false,
        }
    }

    fn compare(&mut self, path: Path, subject: Value, comparand: Value) -> Result<(), DiffError> {
        let config = self.config;
        if let Some(filter) = &config.filter {
            if filter(&path, &subject, &comparand) {
                trace!(pointer = %encode_pointer(&path), "skipped by filter");
                return Ok(());
            }
        }
        let (subject, comparand) = match &config.normalize {
            Some(normalize) => normalize(&path, subject, comparand),
            None => (subject, comparand),
        };

        if subject.same_identity(&comparand) {
            return Ok(());
        }

        let (left_kind, right_kind) = (subject.kind(), comparand.kind());
        if left_kind != right_kind {
            let record = if right_kind == SemanticKind::Undefined {
                ChangeRecord::removed(path, subject)
            } else {
                ChangeRecord::edited(path, subject, comparand)
            };
            self.tasks.push(Task::Emit(record));
            return Ok(());
        }

        let differs = match (&subject, &comparand) {
            (Value::Object(_), Value::Object(_))
            | (Value::Math(_), Value::Math(_))
            | (Value::Array(_), Value::Array(_)) => None,
            (Value::Date(a), Value::Date(b)) => {
                Some(!same_number(a.borrow().primary, b.borrow().primary))
            }
            (Value::Function(a), Value::Function(b)) => Some(a.borrow().primary != b.borrow().primary),
            (Value::RegExp(a), Value::RegExp(b)) => {
                if a.borrow().primary != b.borrow().primary {
                    self.tasks.push(Task::Emit(ChangeRecord::edited(path, subject, comparand)));
                }
                return Ok(());
            }
            (Value::Map(_), Value::Map(_)) | (Value::Set(_), Value::Set(_)) => {
                let left = self.hasher.hash_primary(&subject, &path)?;
                let right = self.hasher.hash_primary(&comparand, &path)?;
                Some(left != right)
            }
            _ => {
                if !scalars_equal(&subject, &comparand, config.ignore_whitespace) {
                    self.tasks.push(Task::Emit(ChangeRecord::edited(path, subject, comparand)));
                }
                return Ok(());
            }
        };
        if differs == Some(true) {
            let record = ChangeRecord::edited(path.clone(), subject.clone(), comparand.clone());
            // Dates and functions still compare their own properties.
            if matches!(subject, Value::Date(_) | Value::Function(_)) {
                self.descend(path, subject, comparand)?;
            }
            self.tasks.push(Task::Emit(record));
            return Ok(());
        }
        self.descend(path, subject, comparand)
    }

    fn descend(&mut self, path: Path, subject: Value, comparand: Value) -> Result<(), DiffError> {
        let (Some(left), Some(right)) = (subject.identity(), comparand.identity()) else {
            return Ok(());
        };
        let depth = path.len();
        match (self.left_stack.get(&left), self.right_stack.get(&right)) {
            (None, None) => {}
            (Some((_, a)), Some((_, b))) if a == b => return Ok(()),
            _ => {
                trace!(pointer = %encode_pointer(&path), "asymmetric cycle");
                self.tasks.push(Task::Emit(ChangeRecord::edited(path, subject, comparand)));
                return Ok(());
            }
        }
        self.left_stack.insert(left, (subject.clone(), depth));
        self.right_stack.insert(right, (comparand.clone(), depth));

        let mut pending = Vec::new();
        if let (Value::Array(_), Value::Array(_)) = (&subject, &comparand) {
            let aligned = align_sequences(&subject, &comparand, &path, self.config, &mut self.hasher);
            let alignments = match aligned {
                Ok(alignments) => alignments,
                Err(err) => {
                    self.left_stack.remove(&left);
                    self.right_stack.remove(&right);
                    return Err(err);
                }
            };
            for alignment in alignments {
                pending.push(match alignment {
                    Alignment::Record(record) => Task::Emit(record),
                    Alignment::Compare {
                        path,
                        subject,
                        comparand,
                    } => Task::Compare {
                        path,
                        subject,
                        comparand,
                    },
                });
            }
        }

        let left_keys = self.comparable_members(&subject, &path);
        let right_keys = self.comparable_members(&comparand, &path);
        for aligned in align_keys(&left_keys, &right_keys) {
            let segment = aligned.key.to_segment();
            let member_path = child(&path, segment.clone());
            match (aligned.left, aligned.right) {
                (None, _) => {
                    let value = comparand.get(&segment);
                    if !self.filtered(&member_path, &Value::Undefined, &value) {
                        pending.push(Task::Emit(ChangeRecord::added(member_path, value)));
                    }
                }
                (_, None) => {
                    let value = subject.get(&segment);
                    if !self.filtered(&member_path, &value, &Value::Undefined) {
                        pending.push(Task::Emit(ChangeRecord::removed(member_path, value)));
                    }
                }
                _ => pending.push(Task::Compare {
                    subject: subject.get(&segment),
                    comparand: comparand.get(&segment),
                    path: member_path,
                }),
            }
        }

        self.tasks.push(Task::Release { left, right });
        self.tasks.extend(pending.into_iter().rev());
        Ok(())
    }

    fn filtered(&self, path: &[Segment], subject: &Value, comparand: &Value) -> bool {
        self.config
            .filter
            .as_ref()
            .is_some_and(|filter| filter(path, subject, comparand))
    }

    fn comparable_members(&mut self, value: &Value, path: &[Segment]) -> Vec<PropertyKey> {
        if self.config.ignore.is_path_dependent() {
            return list_comparable_members(value, path, self.config);
        }
        let Some(id) = value.identity() else {
            return Vec::new();
        };
        if let Some((_, keys)) = self.members.get(&id) {
            return keys.clone();
        }
        let keys = list_comparable_members(value, path, self.config);
        self.members.insert(id, (value.clone(), keys.clone()));
        keys
    }
}

impl Iterator for Changes<'_> {
    type Item = Result<ChangeRecord, DiffError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        while let Some(task) = self.tasks.pop() {
            match task {
                Task::Emit(record) => {
                    self.emitted += 1;
                    return Some(Ok(record));
                }
                Task::Release { left, right } => {
                    self.left_stack.remove(&left);
                    self.right_stack.remove(&right);
                }
                Task::Compare {
                    path,
                    subject,
                    comparand,
                } => {
                    if let Err(err) = self.compare(path, subject, comparand) {
                        debug!(error = %err, "comparison aborted");
                        self.done = true;
                        self.tasks.clear();
                        return Some(Err(err));
                    }
                }
            }
        }
        debug!(emitted = self.emitted, "comparison finished");
        self.done = true;
        None
    }
}

impl std::iter::FusedIterator for Changes<'_> {}

/// Computes the full diff between two values.
///
/// This drains [`changes`] and collects statistics.
///
/// # Arguments
///
/// * `subject` - The original value
/// * `comparand` - The value to compare against
/// * `config` - Configuration options for the diff
///
/// # Returns
///
/// Returns a Diff containing all changes and statistics, or the first
/// error the comparison hit.
///
/// # Examples
///
/// ```
/// use ddiff_rs::{compute_diff, DiffConfig, Value};
///
/// let diff = compute_diff(&Value::from(42), &Value::from(43), &DiffConfig::default()).unwrap();
///
/// assert_eq!(diff.stats.edited, 1);
/// ```
pub fn compute_diff(subject: &Value, comparand: &Value, config: &DiffConfig) -> Result<Diff, DiffError> {
    let changes = changes(subject, comparand, config).collect::<Result<Vec<_>, _>>()?;
    Ok(Diff::from(changes))
}

fn same_number(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

fn scalars_equal(a: &Value, b: &Value, ignore_whitespace: bool) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => same_number(*a, *b),
        (Value::BigInt(a), Value::BigInt(b)) => a == b,
        (Value::String(a), Value::String(b)) if ignore_whitespace => {
            normalize_whitespace(a) == normalize_whitespace(b)
        }
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Symbol(a), Value::Symbol(b)) => a == b,
        _ => false,
    }
}

/// Normalizes whitespace in a string (trim and collapse multiple spaces).
fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn diff(a: &Value, b: &Value) -> Vec<ChangeRecord> {
        compute_diff(a, b, &DiffConfig::default()).unwrap().changes
    }

    #[test]
    fn test_diff_stats_new() {
        let stats = DiffStats::new();
        assert_eq!(stats.added, 0);
        assert_eq!(stats.removed, 0);
        assert_eq!(stats.edited, 0);
        assert_eq!(stats.moved, 0);
        assert!(stats.is_empty());
    }

    #[test]
    fn test_diff_stats_total_changes() {
        let stats = DiffStats {
            added: 2,
            removed: 1,
            edited: 3,
            moved: 1,
        };
        assert_eq!(stats.total_changes(), 7);
        assert!(!stats.is_empty());
    }

    #[test]
    fn test_identical_primitives() {
        for value in [Value::Null, Value::from(true), Value::from(42), Value::from("hello")] {
            assert!(diff(&value, &value.clone()).is_empty());
        }
    }

    #[test]
    fn test_nan_equals_nan() {
        assert!(diff(&Value::from(f64::NAN), &Value::from(f64::NAN)).is_empty());
    }

    #[test]
    fn test_kind_change_is_an_edit() {
        let changes = diff(&Value::from(42), &Value::from("42"));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind(), ChangeKind::Edited);
        assert!(changes[0].path().is_empty());
    }

    #[test]
    fn test_undefined_comparand_is_a_removal() {
        let changes = diff(&Value::from(1), &Value::Undefined);
        assert_eq!(changes, vec![ChangeRecord::removed(vec![], Value::from(1))]);
    }

    #[test]
    fn test_object_members() {
        let a = Value::from(json!({"keep": 1, "drop": 2, "edit": 3}));
        let b = Value::from(json!({"keep": 1, "edit": 4, "add": 5}));
        let changes = diff(&a, &b);
        let summary: Vec<_> = changes.iter().map(|c| (c.kind(), c.pointer())).collect();
        assert_eq!(
            summary,
            vec![
                (ChangeKind::Removed, "#/drop".to_string()),
                (ChangeKind::Edited, "#/edit".to_string()),
                (ChangeKind::Added, "#/add".to_string()),
            ]
        );
    }

    #[test]
    fn test_regexps_compare_by_source() {
        assert!(diff(&Value::regexp("/a/"), &Value::regexp("/a/")).is_empty());
        let changes = diff(&Value::regexp("/a/"), &Value::regexp("/a/g"));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind(), ChangeKind::Edited);
    }

    #[test]
    fn test_dates_compare_by_time() {
        assert!(diff(&Value::date(1000.0), &Value::date(1000.0)).is_empty());
        assert_eq!(diff(&Value::date(1000.0), &Value::date(2000.0)).len(), 1);
    }

    #[test]
    fn test_maps_edit_when_entries_differ() {
        let a = Value::map([(Value::from("k"), Value::from(1))]);
        let b = Value::map([(Value::from("k"), Value::from(1))]);
        let c = Value::map([(Value::from("k"), Value::from(2))]);
        assert!(diff(&a, &b).is_empty());
        assert_eq!(diff(&a, &c)[0].kind(), ChangeKind::Edited);
    }

    #[test]
    fn test_ignore_whitespace() {
        let config = DiffConfig {
            ignore_whitespace: true,
            ..Default::default()
        };
        let a = Value::from("hello   world ");
        let b = Value::from(" hello world");
        assert!(compute_diff(&a, &b, &config).unwrap().is_empty());
    }

    #[test]
    fn test_symmetric_cycles_are_equal() {
        let a = Value::empty_object();
        a.with_props_mut(|bag| bag.insert("self", a.clone()));
        let b = Value::empty_object();
        b.with_props_mut(|bag| bag.insert("self", b.clone()));
        assert!(diff(&a, &b).is_empty());
    }

    #[test]
    fn test_asymmetric_cycle_is_an_edit() {
        let a = Value::empty_object();
        a.with_props_mut(|bag| bag.insert("next", a.clone()));
        let b = Value::empty_object();
        let inner = Value::empty_object();
        inner.with_props_mut(|bag| bag.insert("next", b.clone()));
        b.with_props_mut(|bag| bag.insert("next", inner.clone()));

        let changes = diff(&a, &b);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind(), ChangeKind::Edited);
        assert_eq!(changes[0].pointer(), "#/next");
    }

    #[test]
    fn test_filter_skips_members() {
        let config = DiffConfig::default().with_filter(|path, _, _| {
            path.last().is_some_and(|s| s.as_text() == "secret")
        });
        let a = Value::from(json!({"secret": 1, "x": 1}));
        let b = Value::from(json!({"x": 2, "secret": 2}));
        let changes = compute_diff(&a, &b, &config).unwrap().changes;
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].pointer(), "#/x");
    }

    #[test]
    fn test_normalize_replaces_values() {
        let config = DiffConfig::default().with_normalize(|_, a, b| {
            if let (Value::String(x), Value::String(y)) = (&a, &b) {
                return (Value::from(x.to_lowercase()), Value::from(y.to_lowercase()));
            }
            (a, b)
        });
        let a = Value::from(json!({"name": "Ada"}));
        let b = Value::from(json!({"name": "ADA"}));
        assert!(compute_diff(&a, &b, &config).unwrap().is_empty());
    }

    #[test]
    fn test_ignored_property() {
        let config = DiffConfig::default().ignore_property("stamp");
        let a = Value::from(json!({"stamp": 1, "deep": {"stamp": 2}}));
        let b = Value::from(json!({"stamp": 3, "deep": {"stamp": 4}}));
        assert!(compute_diff(&a, &b, &config).unwrap().is_empty());
    }

    #[test]
    fn test_iterator_is_lazy() {
        let a = Value::from(json!({"a": 1, "b": 2, "c": 3}));
        let b = Value::from(json!({"a": 9, "b": 9, "c": 9}));
        let config = DiffConfig::default();
        let first = changes(&a, &b, &config).next().unwrap().unwrap();
        assert_eq!(first.pointer(), "#/a");
    }

    #[test]
    fn test_errors_end_iteration() {
        let set = Value::set([]);
        if let Value::Set(cell) = &set {
            cell.borrow_mut().primary.push(set.clone());
        }
        let other = Value::set([Value::from(1)]);
        let config = DiffConfig::default();
        let mut iter = changes(&set, &other, &config);
        assert!(matches!(iter.next(), Some(Err(DiffError::UnsupportedCycle { .. }))));
        assert!(iter.next().is_none());
    }
}
