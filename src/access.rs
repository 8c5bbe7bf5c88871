//! Read and write seams used when replaying changes against a target.

use crate::error::PatchError;
use crate::path::Segment;
use crate::pointer::encode_pointer;
use crate::tree::{canonical_index, Value};

/// Reads `target[key]`. `path` locates the member being read.
pub trait Accessor {
    fn get(&self, path: &[Segment], key: &Segment, target: &Value) -> Value;
}

/// Writes `target[key] = value`, deleting the member when `value` is
/// undefined. Returns the value now stored.
pub trait Mutator {
    fn set(
        &self,
        path: &[Segment],
        key: &Segment,
        target: &Value,
        value: Value,
    ) -> Result<Value, PatchError>;
}

impl<F> Accessor for F
where
    F: Fn(&[Segment], &Segment, &Value) -> Value,
{
    fn get(&self, path: &[Segment], key: &Segment, target: &Value) -> Value {
        self(path, key, target)
    }
}

impl<F> Mutator for F
where
    F: Fn(&[Segment], &Segment, &Value, Value) -> Result<Value, PatchError>,
{
    fn set(
        &self,
        path: &[Segment],
        key: &Segment,
        target: &Value,
        value: Value,
    ) -> Result<Value, PatchError> {
        self(path, key, target, value)
    }
}

/// Reads members directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectAccessor;

impl Accessor for DirectAccessor {
    fn get(&self, _path: &[Segment], key: &Segment, target: &Value) -> Value {
        target.get(key)
    }
}

/// Assigns members directly; index keys on sequences write elements,
/// padding with undefined.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectMutator;

impl Mutator for DirectMutator {
    fn set(
        &self,
        path: &[Segment],
        key: &Segment,
        target: &Value,
        value: Value,
    ) -> Result<Value, PatchError> {
        if let Value::Array(cell) = target {
            let index = match key {
                Segment::Index(index) => Some(*index),
                Segment::Key(name) => canonical_index(name),
                Segment::Symbol(_) => None,
            };
            if let Some(index) = index {
                let mut seq = cell.borrow_mut();
                if index >= seq.items.len() {
                    seq.items.resize(index + 1, Value::Undefined);
                }
                seq.items[index] = value.clone();
                return Ok(value);
            }
        }
        let property = key.to_property_key();
        let stored = target.with_props_mut(|bag| {
            if value.is_undefined() {
                bag.remove(&property);
            } else {
                bag.insert(property, value.clone());
            }
        });
        match stored {
            Some(()) => Ok(value),
            None => Err(PatchError::UnsupportedTargetKind {
                pointer: encode_pointer(path),
                kind: target.kind(),
            }),
        }
    }
}
