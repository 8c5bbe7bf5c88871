//! Union of two key lists with each key's position on either side.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// One key of the union and where it sits on each side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedKey<K> {
    pub key: K,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

/// Aligns two ordered key lists so every key of either side appears once.
///
/// Walks positions up to the longer length, preferring the right-hand key at
/// each position and pulling in a left-hand key at the same position when
/// the right side does not have it.
pub fn align_keys<K>(left: &[K], right: &[K]) -> Vec<AlignedKey<K>>
where
    K: Clone + Eq + Hash,
{
    let left_index: HashMap<&K, usize> = left.iter().enumerate().map(|(i, k)| (k, i)).collect();
    let right_keys: HashSet<&K> = right.iter().collect();
    let mut emitted_left = vec![false; left.len()];
    let mut aligned = Vec::with_capacity(left.len().max(right.len()));

    for i in 0..left.len().max(right.len()) {
        if let Some(key) = right.get(i) {
            let l = left_index.get(key).copied();
            if l != Some(i) && i < left.len() && !right_keys.contains(&left[i]) {
                aligned.push(AlignedKey {
                    key: left[i].clone(),
                    left: Some(i),
                    right: None,
                });
                emitted_left[i] = true;
            }
            if let Some(l) = l {
                emitted_left[l] = true;
            }
            aligned.push(AlignedKey {
                key: key.clone(),
                left: l,
                right: Some(i),
            });
        } else if i < left.len() && !emitted_left[i] {
            aligned.push(AlignedKey {
                key: left[i].clone(),
                left: Some(i),
                right: None,
            });
            emitted_left[i] = true;
        }
    }
    aligned
}
