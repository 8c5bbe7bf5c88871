//! Change records and their apply/revert state machine.
//!
//! A record describes one difference at one path. Applying it against a
//! parent container moves the parent from the subject state to the comparand
//! state; reverting does the inverse. Against a sequence parent, records
//! address subject positions and carry a running offset that accounts for
//! earlier sibling insertions and removals in the same parent.

use std::fmt;

use serde::Serialize;
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

use crate::diff::DiffConfig;
use crate::error::{PatchError, PointerError};
use crate::path::{Path, Segment};
use crate::pointer::{decode_pointer, encode_pointer, PathScheme};
use crate::serialize::TextFormat;
use crate::tree::{Sequence, Shared, Value};

/// The kind of change a record describes. The string form is the one-letter
/// tag used by the text and compact formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, AsRefStr, IntoStaticStr)]
pub enum ChangeKind {
    /// Member exists in the comparand but not the subject
    #[strum(serialize = "A")]
    Added,
    /// Member exists on both sides with different values
    #[strum(serialize = "E")]
    Edited,
    /// Member exists in the subject but not the comparand
    #[strum(serialize = "R")]
    Removed,
    /// Sequence element relocated from `origin`
    #[strum(serialize = "M")]
    Moved,
}

impl ChangeKind {
    /// Ordering among records at the same path.
    pub(crate) fn rank(self) -> u8 {
        match self {
            ChangeKind::Added => 0,
            ChangeKind::Edited => 1,
            ChangeKind::Moved => 2,
            ChangeKind::Removed => 3,
        }
    }
}

/// One difference between a subject and a comparand.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeRecord {
    Added {
        path: Path,
        comparand: Value,
    },
    Edited {
        path: Path,
        subject: Value,
        comparand: Value,
    },
    Removed {
        path: Path,
        subject: Value,
    },
    Moved {
        path: Path,
        subject: Value,
        comparand: Value,
        origin: usize,
    },
}

impl ChangeRecord {
    pub fn added(path: Path, comparand: Value) -> Self {
        ChangeRecord::Added { path, comparand }
    }

    pub fn edited(path: Path, subject: Value, comparand: Value) -> Self {
        ChangeRecord::Edited {
            path,
            subject,
            comparand,
        }
    }

    pub fn removed(path: Path, subject: Value) -> Self {
        ChangeRecord::Removed { path, subject }
    }

    pub fn moved(path: Path, subject: Value, comparand: Value, origin: usize) -> Self {
        ChangeRecord::Moved {
            path,
            subject,
            comparand,
            origin,
        }
    }

    /// Builds an Added record from a path written in any notation.
    pub fn added_at(pointer: &str, comparand: Value) -> Result<Self, PointerError> {
        Ok(Self::added(decode_pointer(pointer)?, comparand))
    }

    pub fn edited_at(pointer: &str, subject: Value, comparand: Value) -> Result<Self, PointerError> {
        Ok(Self::edited(decode_pointer(pointer)?, subject, comparand))
    }

    pub fn removed_at(pointer: &str, subject: Value) -> Result<Self, PointerError> {
        Ok(Self::removed(decode_pointer(pointer)?, subject))
    }

    pub fn moved_at(
        pointer: &str,
        subject: Value,
        comparand: Value,
        origin: usize,
    ) -> Result<Self, PointerError> {
        Ok(Self::moved(decode_pointer(pointer)?, subject, comparand, origin))
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            ChangeRecord::Added { .. } => ChangeKind::Added,
            ChangeRecord::Edited { .. } => ChangeKind::Edited,
            ChangeRecord::Removed { .. } => ChangeKind::Removed,
            ChangeRecord::Moved { .. } => ChangeKind::Moved,
        }
    }

    pub fn path(&self) -> &[Segment] {
        match self {
            ChangeRecord::Added { path, .. }
            | ChangeRecord::Edited { path, .. }
            | ChangeRecord::Removed { path, .. }
            | ChangeRecord::Moved { path, .. } => path,
        }
    }

    /// The path in the default pointer notation.
    pub fn pointer(&self) -> String {
        encode_pointer(self.path())
    }

    pub fn pointer_in(&self, scheme: PathScheme) -> String {
        scheme.encode(self.path())
    }

    /// The value before the change, if the record carries one.
    pub fn subject(&self) -> Option<&Value> {
        match self {
            ChangeRecord::Added { .. } => None,
            ChangeRecord::Edited { subject, .. }
            | ChangeRecord::Removed { subject, .. }
            | ChangeRecord::Moved { subject, .. } => Some(subject),
        }
    }

    /// The value after the change, if the record carries one.
    pub fn comparand(&self) -> Option<&Value> {
        match self {
            ChangeRecord::Removed { .. } => None,
            ChangeRecord::Added { comparand, .. }
            | ChangeRecord::Edited { comparand, .. }
            | ChangeRecord::Moved { comparand, .. } => Some(comparand),
        }
    }

    pub fn origin(&self) -> Option<usize> {
        match self {
            ChangeRecord::Moved { origin, .. } => Some(*origin),
            _ => None,
        }
    }

    /// Last path segment; `None` for a root-level record.
    pub fn key(&self) -> Option<&Segment> {
        self.path().last()
    }

    pub fn parent_path(&self) -> &[Segment] {
        let path = self.path();
        &path[..path.len().saturating_sub(1)]
    }

    /// Index drift this record causes in a sequence parent once applied.
    pub(crate) fn drift(&self) -> isize {
        match self {
            ChangeRecord::Added { .. } => 1,
            ChangeRecord::Removed { .. } => -1,
            ChangeRecord::Edited { .. } => 0,
            ChangeRecord::Moved { origin, .. } => match self.key().and_then(Segment::as_index) {
                Some(index) if *origin < index => -1,
                _ => 0,
            },
        }
    }

    /// Walks from `root` to this record's parent, creating missing
    /// intermediate containers, and returns the parent with the final key.
    pub fn descend(&self, root: &Value, config: &DiffConfig) -> Result<(Value, Segment), PatchError> {
        let (key, parent) = self
            .path()
            .split_last()
            .ok_or(PatchError::RootChangeNotAlone)?;
        let target = resolve(root, parent, Some(key), config, true)?;
        Ok((target, key.clone()))
    }

    /// Applies this record to `parent`, given the running offset of its
    /// change set. Returns the offset for the next sibling.
    pub fn apply(&self, parent: &Value, offset: isize, config: &DiffConfig) -> Result<isize, PatchError> {
        let key = self.key().ok_or(PatchError::RootChangeNotAlone)?;
        match (parent, key.as_index()) {
            (Value::Array(cell), Some(index)) => self.apply_in_sequence(cell, index, offset),
            _ => {
                let value = match self {
                    ChangeRecord::Added { comparand, .. } | ChangeRecord::Edited { comparand, .. } => {
                        comparand.deep_clone()
                    }
                    ChangeRecord::Removed { .. } => Value::Undefined,
                    ChangeRecord::Moved { .. } => return Err(self.move_error()),
                };
                config.mutator.set(self.path(), key, parent, value)?;
                Ok(offset)
            }
        }
    }

    /// Inverse of [`ChangeRecord::apply`]. `offset` is the running offset
    /// after this record was applied; returns the offset before it.
    pub fn revert(&self, parent: &Value, offset: isize, config: &DiffConfig) -> Result<isize, PatchError> {
        let key = self.key().ok_or(PatchError::RootChangeNotAlone)?;
        match (parent, key.as_index()) {
            (Value::Array(cell), Some(index)) => self.revert_in_sequence(cell, index, offset),
            _ => {
                let value = match self {
                    ChangeRecord::Added { .. } => Value::Undefined,
                    ChangeRecord::Edited { subject, .. } | ChangeRecord::Removed { subject, .. } => {
                        subject.deep_clone()
                    }
                    ChangeRecord::Moved { .. } => return Err(self.move_error()),
                };
                config.mutator.set(self.path(), key, parent, value)?;
                Ok(offset)
            }
        }
    }

    fn apply_in_sequence(&self, cell: &Shared<Sequence>, index: usize, offset: isize) -> Result<isize, PatchError> {
        let at = index as isize + offset;
        let mut seq = cell.borrow_mut();
        match self {
            ChangeRecord::Added { comparand, .. } => {
                self.insert(&mut seq.items, at, comparand.deep_clone())?;
                Ok(offset + 1)
            }
            ChangeRecord::Removed { .. } => {
                self.remove(&mut seq.items, at)?;
                Ok(offset - 1)
            }
            ChangeRecord::Edited { comparand, .. } => {
                self.replace(&mut seq.items, at, comparand.deep_clone())?;
                Ok(offset)
            }
            ChangeRecord::Moved { comparand, origin, .. } => {
                self.replace(&mut seq.items, at, comparand.deep_clone())?;
                self.remove(&mut seq.items, *origin as isize + offset)?;
                Ok(if *origin < index { offset - 1 } else { offset })
            }
        }
    }

    fn revert_in_sequence(&self, cell: &Shared<Sequence>, index: usize, offset: isize) -> Result<isize, PatchError> {
        let mut seq = cell.borrow_mut();
        match self {
            ChangeRecord::Added { .. } => {
                let before = offset - 1;
                self.remove(&mut seq.items, index as isize + before)?;
                Ok(before)
            }
            ChangeRecord::Removed { subject, .. } => {
                let before = offset + 1;
                self.insert(&mut seq.items, index as isize + before, subject.deep_clone())?;
                Ok(before)
            }
            ChangeRecord::Edited { subject, .. } => {
                self.replace(&mut seq.items, index as isize + offset, subject.deep_clone())?;
                Ok(offset)
            }
            ChangeRecord::Moved {
                subject,
                comparand,
                origin,
                ..
            } => {
                let before = if *origin < index { offset + 1 } else { offset };
                self.insert(&mut seq.items, *origin as isize + before, comparand.deep_clone())?;
                self.replace(&mut seq.items, index as isize + before, subject.deep_clone())?;
                Ok(before)
            }
        }
    }

    fn insert(&self, items: &mut Vec<Value>, at: isize, value: Value) -> Result<(), PatchError> {
        if at < 0 {
            return Err(self.range_error(at, items.len()));
        }
        let at = (at as usize).min(items.len());
        items.insert(at, value);
        Ok(())
    }

    fn remove(&self, items: &mut Vec<Value>, at: isize) -> Result<(), PatchError> {
        if at < 0 || at as usize >= items.len() {
            return Err(self.range_error(at, items.len()));
        }
        items.remove(at as usize);
        Ok(())
    }

    fn replace(&self, items: &mut Vec<Value>, at: isize, value: Value) -> Result<(), PatchError> {
        if at < 0 {
            return Err(self.range_error(at, items.len()));
        }
        let at = at as usize;
        if at >= items.len() {
            items.resize(at + 1, Value::Undefined);
        }
        items[at] = value;
        Ok(())
    }

    fn range_error(&self, index: isize, len: usize) -> PatchError {
        PatchError::IndexOutOfRange {
            pointer: self.pointer(),
            index,
            len,
        }
    }

    fn move_error(&self) -> PatchError {
        PatchError::MoveRequiresSequence {
            pointer: self.pointer(),
        }
    }
}

impl fmt::Display for ChangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match TextFormat::new().audit(true).encode_record(self) {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "{} {}", self.kind(), self.pointer()),
        }
    }
}

/// Walks `path` from `root` through the accessor.
///
/// With `create`, missing (undefined or null) members are replaced through
/// the mutator by a new container: a sequence when the following segment is
/// an index, otherwise an object. `hint` is the segment that will be used on
/// the final container.
pub(crate) fn resolve(
    root: &Value,
    path: &[Segment],
    hint: Option<&Segment>,
    config: &DiffConfig,
    create: bool,
) -> Result<Value, PatchError> {
    let mut current = root.clone();
    for (i, segment) in path.iter().enumerate() {
        ensure_container(&current, &path[..i])?;
        let here = &path[..=i];
        let mut next = config.accessor.get(here, segment, &current);
        if create && next.is_nullish() {
            let upcoming = path.get(i + 1).or(hint);
            let container = if upcoming.is_some_and(Segment::is_index) {
                Value::array(Vec::new())
            } else {
                Value::empty_object()
            };
            next = config.mutator.set(here, segment, &current, container)?;
        }
        current = next;
    }
    ensure_container(&current, path)?;
    Ok(current)
}

fn ensure_container(value: &Value, path: &[Segment]) -> Result<(), PatchError> {
    if value.kind().is_assignable() {
        Ok(())
    } else {
        Err(PatchError::UnsupportedTargetKind {
            pointer: encode_pointer(path),
            kind: value.kind(),
        })
    }
}
