//! Grouping of change records by parent and batch apply/revert.
//!
//! Records are sorted so that shallower paths come first and siblings are
//! contiguous, then grouped into one [`ChangeSet`] per parent container.
//! Within a sequence parent the records run in subject index order, which
//! lets the running offset translate subject positions into positions of the
//! partially patched sequence.

use std::cmp::Ordering;

use tracing::debug;

use crate::change::{resolve, ChangeRecord};
use crate::diff::DiffConfig;
use crate::error::PatchError;
use crate::path::{compare_paths, Path, Segment};
use crate::pointer::encode_pointer;
use crate::tree::Value;

/// Whether a change set's records shift one another's positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSetKind {
    /// Parent is a sequence; index records are offset-tracked
    Sequence,
    /// Parent is keyed; records are independent
    Keyed,
}

/// All records that share a parent container, with the resolved parent.
#[derive(Debug, Clone)]
pub struct ChangeSet {
    parent: Path,
    target: Value,
    changes: Vec<ChangeRecord>,
}

impl ChangeSet {
    pub fn parent(&self) -> &[Segment] {
        &self.parent
    }

    pub fn target(&self) -> &Value {
        &self.target
    }

    pub fn changes(&self) -> &[ChangeRecord] {
        &self.changes
    }

    pub fn kind(&self) -> ChangeSetKind {
        match self.target {
            Value::Array(_) => ChangeSetKind::Sequence,
            _ => ChangeSetKind::Keyed,
        }
    }

    /// Applies every record in order and returns the final offset.
    pub fn apply(&self, config: &DiffConfig) -> Result<isize, PatchError> {
        let mut offset = 0;
        for change in &self.changes {
            offset = change.apply(&self.target, offset, config)?;
        }
        Ok(offset)
    }

    /// Reverts every record in reverse order.
    pub fn revert(&self, config: &DiffConfig) -> Result<(), PatchError> {
        let mut offset = self.net_offset();
        for change in self.changes.iter().rev() {
            offset = change.revert(&self.target, offset, config)?;
        }
        Ok(())
    }

    /// Offset reached after applying the whole set.
    fn net_offset(&self) -> isize {
        if self.kind() == ChangeSetKind::Keyed {
            return 0;
        }
        self.changes
            .iter()
            .filter(|change| change.key().is_some_and(Segment::is_index))
            .map(ChangeRecord::drift)
            .sum()
    }
}

/// Orders records so shallower paths come first, siblings are contiguous and
/// in ascending key order, and records at the same path run Added, Edited,
/// Moved, Removed. The sort is stable.
pub fn sort_changes(changes: &[ChangeRecord]) -> Vec<ChangeRecord> {
    let mut sorted = changes.to_vec();
    sorted.sort_by(compare_changes);
    sorted
}

fn compare_changes(a: &ChangeRecord, b: &ChangeRecord) -> Ordering {
    compare_paths(a.path(), b.path()).then_with(|| a.kind().rank().cmp(&b.kind().rank()))
}

/// Lazily groups sorted records into change sets, resolving each parent
/// against the target as the set is produced.
pub struct ChangeSets<'c> {
    root: Value,
    changes: std::iter::Peekable<std::vec::IntoIter<ChangeRecord>>,
    config: &'c DiffConfig,
    create: bool,
}

impl<'c> ChangeSets<'c> {
    fn new(root: &Value, changes: &[ChangeRecord], config: &'c DiffConfig, create: bool) -> Self {
        ChangeSets {
            root: root.clone(),
            changes: sort_changes(changes).into_iter().peekable(),
            config,
            create,
        }
    }
}

impl Iterator for ChangeSets<'_> {
    type Item = Result<ChangeSet, PatchError>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.changes.next()?;
        let parent: Path = first.parent_path().to_vec();
        let mut changes = vec![first];
        while let Some(next) = self
            .changes
            .next_if(|change| !change.path().is_empty() && change.parent_path() == parent.as_slice())
        {
            changes.push(next);
        }
        if changes[0].path().is_empty() {
            return Some(Err(PatchError::RootChangeNotAlone));
        }
        let hint = changes[0].key();
        let target = match resolve(&self.root, &parent, hint, self.config, self.create) {
            Ok(target) => target,
            Err(err) => return Some(Err(err)),
        };
        Some(Ok(ChangeSet {
            parent,
            target,
            changes,
        }))
    }
}

/// Groups `changes` by parent, creating missing intermediate containers in
/// `target` as parents are resolved.
pub fn calculate_change_sets<'c>(
    target: &Value,
    changes: &[ChangeRecord],
    config: &'c DiffConfig,
) -> ChangeSets<'c> {
    ChangeSets::new(target, changes, config, true)
}

fn root_change(changes: &[ChangeRecord]) -> Result<Option<&ChangeRecord>, PatchError> {
    match changes.iter().find(|change| change.path().is_empty()) {
        None => Ok(None),
        Some(root) if changes.len() == 1 => Ok(Some(root)),
        Some(_) => Err(PatchError::RootChangeNotAlone),
    }
}

/// Applies `changes` to `target` in place and returns the patched value.
///
/// All parents are resolved before any record is applied, so records keep
/// addressing the subject layout. A lone root-level record replaces the
/// whole value instead.
pub fn apply(target: &Value, changes: &[ChangeRecord], config: &DiffConfig) -> Result<Value, PatchError> {
    if let Some(root) = root_change(changes)? {
        return Ok(root.comparand().map(Value::deep_clone).unwrap_or(Value::Undefined));
    }
    let sets = calculate_change_sets(target, changes, config).collect::<Result<Vec<_>, _>>()?;
    debug!(records = changes.len(), sets = sets.len(), "applying changes");
    for set in &sets {
        set.apply(config)?;
    }
    Ok(target.clone())
}

/// Reverts `changes` previously applied to `target`, in place, and returns
/// the restored value.
///
/// Parents are resolved one set at a time, shallowest first, after the sets
/// above them have been reverted.
pub fn revert(target: &Value, changes: &[ChangeRecord], config: &DiffConfig) -> Result<Value, PatchError> {
    if let Some(root) = root_change(changes)? {
        return Ok(root.subject().map(Value::deep_clone).unwrap_or(Value::Undefined));
    }
    debug!(records = changes.len(), "reverting changes");
    for set in ChangeSets::new(target, changes, config, false) {
        let set = set?;
        if let Err(err) = set.revert(config) {
            debug!(parent = %encode_pointer(set.parent()), error = %err, "revert failed");
            return Err(err);
        }
    }
    Ok(target.clone())
}
