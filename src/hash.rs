//! Content hashing for fast equality probing.
//!
//! Hashes are 32-bit MurmurHash3 (x86 flavor) digests of canonical tags.
//! Containers combine their members' hashes by wrapping addition, so object
//! hashes never depend on property order, and sequence hashes depend on
//! element order only when order is significant.

use std::collections::{HashMap, HashSet};

use crate::diff::DiffConfig;
use crate::error::DiffError;
use crate::filter::list_comparable_members;
use crate::path::{child, Segment};
use crate::pointer::encode_pointer;
use crate::tree::{format_number, PropertyKey, Value};

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;

/// MurmurHash3 x86 32-bit with seed 0 over the low byte of each UTF-16
/// code unit of `text`.
pub fn murmur3_32(text: &str) -> u32 {
    let key: Vec<u8> = text.encode_utf16().map(|unit| (unit & 0xff) as u8).collect();
    murmur3_x86_32(&key, 0)
}

fn scramble(mut k1: u32) -> u32 {
    k1 = k1.wrapping_mul(C1);
    k1 = k1.rotate_left(15);
    k1.wrapping_mul(C2)
}

fn murmur3_x86_32(key: &[u8], seed: u32) -> u32 {
    let mut h1 = seed;
    let blocks = key.chunks_exact(4);
    let tail = blocks.remainder();
    for block in blocks {
        let k1 = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        h1 ^= scramble(k1);
        h1 = h1.rotate_left(13);
        h1 = h1.wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    let mut k1 = 0u32;
    for (shift, byte) in tail.iter().enumerate().rev() {
        k1 ^= (*byte as u32) << (8 * shift);
    }
    if !tail.is_empty() {
        h1 ^= scramble(k1);
    }

    h1 ^= key.len() as u32;
    h1 ^= h1 >> 16;
    h1 = h1.wrapping_mul(0x85eb_ca6b);
    h1 ^= h1 >> 13;
    h1 = h1.wrapping_mul(0xc2b2_ae35);
    h1 ^= h1 >> 16;
    h1
}

/// Structural hasher bound to one visibility configuration.
///
/// Holds an identity-keyed cache and the cycle stack for the lifetime of one
/// comparison. Cache entries keep their value alive so identities are never
/// recycled while cached.
pub struct ContentHasher<'c> {
    config: &'c DiffConfig,
    cache: HashMap<usize, (Value, u32)>,
    stack: HashSet<usize>,
    cacheable: bool,
}

impl<'c> ContentHasher<'c> {
    pub fn new(config: &'c DiffConfig) -> Self {
        ContentHasher {
            config,
            cache: HashMap::new(),
            stack: HashSet::new(),
            cacheable: !config.ignore.is_path_dependent(),
        }
    }

    /// Hash of a scalar, or of a container's primary content alone.
    pub fn hash_scalar(&self, value: &Value) -> u32 {
        let text = match value {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::BigInt(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::Symbol(symbol) => symbol.to_string(),
            Value::Date(cell) => format_number(cell.borrow().primary),
            Value::RegExp(cell) | Value::Function(cell) => cell.borrow().primary.clone(),
            Value::Math(_) => "Math".to_string(),
            Value::Object(_) => "Object".to_string(),
            Value::Array(_) => "Array".to_string(),
            Value::Map(_) => "Map".to_string(),
            Value::Set(_) => "Set".to_string(),
        };
        murmur3_32(&format!("{} {}", value.kind(), text))
    }

    pub fn hash_any(&mut self, value: &Value, path: &[Segment]) -> Result<u32, DiffError> {
        let Some(id) = value.identity() else {
            return Ok(self.hash_scalar(value));
        };
        if let Some((_, hash)) = self.cache.get(&id) {
            return Ok(*hash);
        }
        if !self.stack.insert(id) {
            return Err(DiffError::UnsupportedCycle {
                pointer: encode_pointer(path),
            });
        }
        let result = self.hash_container(value, path);
        self.stack.remove(&id);
        let hash = result?;
        if self.cacheable {
            self.cache.insert(id, (value.clone(), hash));
        }
        Ok(hash)
    }

    /// Hash of a sequence's elements plus its attached properties.
    pub fn hash_array(&mut self, value: &Value, path: &[Segment]) -> Result<u32, DiffError> {
        self.hash_any(value, path)
    }

    /// Hash of the comparable members of any value carrying a property bag.
    pub fn hash_object(&mut self, value: &Value, path: &[Segment]) -> Result<u32, DiffError> {
        let mut hash = 0u32;
        for key in list_comparable_members(value, path, self.config) {
            let segment = key.to_segment();
            let member = value.get(&segment);
            let item = self.hash_any(&member, &child(path, segment))?;
            let name = match &key {
                PropertyKey::Name(name) => name.clone(),
                PropertyKey::Symbol(symbol) => symbol.to_string(),
            };
            hash = hash.wrapping_add(murmur3_32(&format!("object .{} {}", name, item)));
        }
        Ok(hash)
    }

    /// Hash of a container's primary content (elements or entries) without
    /// its attached properties.
    pub fn hash_primary(&mut self, value: &Value, path: &[Segment]) -> Result<u32, DiffError> {
        let Some(id) = value.identity() else {
            return Ok(self.hash_scalar(value));
        };
        if !self.stack.insert(id) {
            return Err(DiffError::UnsupportedCycle {
                pointer: encode_pointer(path),
            });
        }
        let result = self.primary(value, path);
        self.stack.remove(&id);
        result
    }

    fn hash_container(&mut self, value: &Value, path: &[Segment]) -> Result<u32, DiffError> {
        let primary = self.primary(value, path)?;
        Ok(primary.wrapping_add(self.hash_object(value, path)?))
    }

    fn primary(&mut self, value: &Value, path: &[Segment]) -> Result<u32, DiffError> {
        let primary = match value {
            Value::Object(_) => 0,
            Value::Array(cell) => {
                let items = cell.borrow().items.clone();
                self.hash_items(&items, path)?
            }
            Value::Map(cell) => {
                let entries = cell.borrow().primary.clone();
                let mut sum = 0u32;
                for (key, entry) in &entries {
                    let k = self.hash_any(key, path)?;
                    let v = self.hash_any(entry, path)?;
                    sum = sum.wrapping_add(murmur3_32(&format!("map {} {}", k, v)));
                }
                sum.wrapping_add(murmur3_32(&format!("map {}", sum)))
            }
            Value::Set(cell) => {
                let items = cell.borrow().primary.clone();
                let mut sum = 0u32;
                for item in &items {
                    sum = sum.wrapping_add(self.hash_any(item, path)?);
                }
                sum.wrapping_add(murmur3_32(&format!("set {}", sum)))
            }
            _ => self.hash_scalar(value),
        };
        Ok(primary)
    }

    fn hash_items(&mut self, items: &[Value], path: &[Segment]) -> Result<u32, DiffError> {
        let mut hash = 0u32;
        for (i, item) in items.iter().enumerate() {
            let mut item_hash = self.hash_any(item, &child(path, Segment::Index(i)))?;
            if !self.config.ignore_array_order {
                item_hash = murmur3_32(&format!("array [{}] {}", i, item_hash));
            }
            hash = hash.wrapping_add(item_hash);
        }
        Ok(hash.wrapping_add(murmur3_32(&format!("array {}", hash))))
    }
}

/// Probes equality by content hash.
pub fn looks_equal(left: &Value, right: &Value, config: &DiffConfig) -> Result<bool, DiffError> {
    let mut hasher = ContentHasher::new(config);
    Ok(hasher.hash_any(left, &[])? == hasher.hash_any(right, &[])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_murmur_reference_vectors() {
        const SEED: u32 = 0x9747_b28c;
        assert_eq!(murmur3_32(""), 0);
        assert_eq!(murmur3_x86_32(b"", 1), 0x514e_28b7);
        assert_eq!(murmur3_32("test"), 0xba6b_d213);
        assert_eq!(murmur3_x86_32(b"a", SEED), 0x7fa0_9ea6);
        assert_eq!(murmur3_x86_32(b"ab", SEED), 0x7487_5592);
        assert_eq!(murmur3_x86_32(b"abc", SEED), 0xc84a_62dd);
        assert_eq!(murmur3_x86_32(b"aaaa", SEED), 0x5a97_808a);
        assert_eq!(murmur3_x86_32(b"Hello, world!", SEED), 0x2488_4cba);
    }

    #[test]
    fn test_object_hash_ignores_property_order() {
        let config = DiffConfig::default();
        let a = Value::object([("x", Value::from(1)), ("y", Value::from(2))]);
        let b = Value::object([("y", Value::from(2)), ("x", Value::from(1))]);
        assert!(looks_equal(&a, &b, &config).unwrap());
    }

    #[test]
    fn test_array_hash_order_sensitivity() {
        let a = Value::from(json!([1, 2, 3]));
        let b = Value::from(json!([3, 1, 2]));
        assert!(!looks_equal(&a, &b, &DiffConfig::default()).unwrap());

        let unordered = DiffConfig {
            ignore_array_order: true,
            ..Default::default()
        };
        assert!(looks_equal(&a, &b, &unordered).unwrap());
    }

    #[test]
    fn test_kind_is_part_of_the_tag() {
        let config = DiffConfig::default();
        let hasher = ContentHasher::new(&config);
        assert_ne!(
            hasher.hash_scalar(&Value::from("1")),
            hasher.hash_scalar(&Value::from(1))
        );
        assert_ne!(
            hasher.hash_scalar(&Value::Null),
            hasher.hash_scalar(&Value::Undefined)
        );
    }

    #[test]
    fn test_cycle_is_an_error() {
        let node = Value::empty_object();
        node.with_props_mut(|bag| bag.insert("next", node.clone()));
        let config = DiffConfig::default();
        let err = ContentHasher::new(&config).hash_any(&node, &[]).unwrap_err();
        assert_eq!(
            err,
            DiffError::UnsupportedCycle {
                pointer: "#/next".to_string()
            }
        );
    }

    #[test]
    fn test_shared_substructure_is_not_a_cycle() {
        let shared = Value::from(json!({"v": 1}));
        let root = Value::array(vec![shared.clone(), shared]);
        let config = DiffConfig::default();
        assert!(ContentHasher::new(&config).hash_any(&root, &[]).is_ok());
    }
}
