//! Sequence alignment by content hash.
//!
//! Elements are hashed, the common prefix and suffix are trimmed, and the
//! remaining windows are aligned with Hirschberg's linear-space edit
//! distance, where substituting one element for another costs nothing when
//! their hashes agree. Substitutions of unequal elements are handed back to
//! the comparator for a structural sub-diff.
//!
//! Indices in the produced records address the subject sequence as it was
//! before any change: an insertion is keyed by the subject position it lands
//! in front of.

use tracing::trace;

use crate::change::ChangeRecord;
use crate::diff::{DiffConfig, IdentityHook};
use crate::error::DiffError;
use crate::hash::ContentHasher;
use crate::path::{child, Path, Segment};
use crate::tree::Value;

/// One step the comparator must take for a pair of sequences.
#[derive(Debug, Clone)]
pub enum Alignment {
    /// A change that needs no further comparison
    Record(ChangeRecord),
    /// A pair of aligned but unequal elements to diff structurally
    Compare {
        path: Path,
        subject: Value,
        comparand: Value,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Match(usize, usize),
    Substitute(usize, usize),
    Delete(usize),
    /// Comparand element `from` inserted before subject position `at`
    Insert { at: usize, from: usize },
    Move { origin: usize, at: usize, from: usize },
}

/// Aligns the elements of two sequences.
///
/// Both values must be sequences; anything else aligns to nothing.
pub fn align_sequences(
    subject: &Value,
    comparand: &Value,
    path: &[Segment],
    config: &DiffConfig,
    hasher: &mut ContentHasher<'_>,
) -> Result<Vec<Alignment>, DiffError> {
    let (Value::Array(left), Value::Array(right)) = (subject, comparand) else {
        return Ok(Vec::new());
    };
    let left_items = left.borrow().items.clone();
    let right_items = right.borrow().items.clone();
    let mut left = hashed(left_items, path, hasher)?;
    let mut right = hashed(right_items, path, hasher)?;
    if config.ignore_array_order {
        left.sort_by_key(|(hash, _)| *hash);
        right.sort_by_key(|(hash, _)| *hash);
    }
    let (left_hashes, left_items): (Vec<u32>, Vec<Value>) = left.into_iter().unzip();
    let (right_hashes, right_items): (Vec<u32>, Vec<Value>) = right.into_iter().unzip();

    let positional = config.element_identity.is_none();
    let ops = edit_script(&left_hashes, &right_hashes, positional);
    let ops = match &config.element_identity {
        Some(identity) => detect_moves(ops, &left_items, &right_items, &left_hashes, &right_hashes, identity),
        None => ops,
    };

    let passes = |path: &[Segment], subject: &Value, comparand: &Value| match &config.filter {
        Some(filter) => !filter(path, subject, comparand),
        None => true,
    };
    let mut alignments = Vec::new();
    for op in ops {
        match op {
            Op::Match(..) => {}
            Op::Substitute(i, j) => {
                let item_path = child(path, Segment::Index(i));
                let (subject, comparand) = (left_items[i].clone(), right_items[j].clone());
                if comparand.is_undefined() && !subject.is_undefined() {
                    if passes(&item_path, &subject, &comparand) {
                        alignments.push(Alignment::Record(ChangeRecord::edited(item_path, subject, comparand)));
                    }
                } else {
                    alignments.push(Alignment::Compare {
                        path: item_path,
                        subject,
                        comparand,
                    });
                }
            }
            Op::Delete(i) => {
                let item_path = child(path, Segment::Index(i));
                if passes(&item_path, &left_items[i], &Value::Undefined) {
                    alignments.push(Alignment::Record(ChangeRecord::removed(item_path, left_items[i].clone())));
                }
            }
            Op::Insert { at, from } => {
                let item_path = child(path, Segment::Index(at));
                if passes(&item_path, &Value::Undefined, &right_items[from]) {
                    alignments.push(Alignment::Record(ChangeRecord::added(item_path, right_items[from].clone())));
                }
            }
            Op::Move { origin, at, from } => {
                let item_path = child(path, Segment::Index(at));
                if passes(&item_path, &left_items[at], &right_items[from]) {
                    alignments.push(Alignment::Record(ChangeRecord::moved(
                        item_path,
                        left_items[at].clone(),
                        right_items[from].clone(),
                        origin,
                    )));
                }
            }
        }
    }
    Ok(alignments)
}

fn hashed(items: Vec<Value>, path: &[Segment], hasher: &mut ContentHasher<'_>) -> Result<Vec<(u32, Value)>, DiffError> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| Ok((hasher.hash_any(&item, &child(path, Segment::Index(i)))?, item)))
        .collect()
}

/// Edit script between two hash sequences, with absolute indices.
///
/// With `positional` set, equal-length windows pair index by index and never
/// insert or delete; otherwise the script is minimal.
fn edit_script(a: &[u32], b: &[u32], positional: bool) -> Vec<Op> {
    let mut start = 0;
    while start < a.len() && start < b.len() && a[start] == b[start] {
        start += 1;
    }
    let (mut end_a, mut end_b) = (a.len(), b.len());
    while end_a > start && end_b > start && a[end_a - 1] == b[end_b - 1] {
        end_a -= 1;
        end_b -= 1;
    }
    trace!(prefix = start, suffix = a.len() - end_a, "trimmed sequences");

    let mut ops: Vec<Op> = (0..start).map(|i| Op::Match(i, i)).collect();
    if positional && end_a == end_b {
        ops.extend((start..end_a).map(|i| if a[i] == b[i] { Op::Match(i, i) } else { Op::Substitute(i, i) }));
    } else {
        align(&a[start..end_a], &b[start..end_b], start, start, &mut ops);
    }
    ops.extend((end_a..a.len()).zip(end_b..b.len()).map(|(i, j)| Op::Match(i, j)));
    ops
}

fn align(a: &[u32], b: &[u32], a_off: usize, b_off: usize, ops: &mut Vec<Op>) {
    let (n, m) = (a.len(), b.len());
    if n == 0 {
        ops.extend((0..m).map(|j| Op::Insert { at: a_off, from: b_off + j }));
        return;
    }
    if m == 0 {
        ops.extend((0..n).map(|i| Op::Delete(a_off + i)));
        return;
    }
    if n == 1 {
        let (j, op) = match b.iter().position(|h| *h == a[0]) {
            Some(j) => (j, Op::Match(a_off, b_off + j)),
            None => (0, Op::Substitute(a_off, b_off)),
        };
        ops.extend((0..j).map(|k| Op::Insert { at: a_off, from: b_off + k }));
        ops.push(op);
        ops.extend((j + 1..m).map(|k| Op::Insert { at: a_off + 1, from: b_off + k }));
        return;
    }
    if m == 1 {
        let (i, op) = match a.iter().position(|h| *h == b[0]) {
            Some(i) => (i, Op::Match(a_off + i, b_off)),
            None => (0, Op::Substitute(a_off, b_off)),
        };
        ops.extend((0..i).map(|k| Op::Delete(a_off + k)));
        ops.push(op);
        ops.extend((i + 1..n).map(|k| Op::Delete(a_off + k)));
        return;
    }

    let mid = n / 2;
    let upper = last_row(&a[..mid], b);
    let lower = {
        let a_rev: Vec<u32> = a[mid..].iter().rev().copied().collect();
        let b_rev: Vec<u32> = b.iter().rev().copied().collect();
        last_row(&a_rev, &b_rev)
    };
    // Ties prefer the split nearest the diagonal, so equal-length windows
    // pair positionally.
    let diagonal = mid * m / n;
    let split = (0..=m)
        .min_by_key(|&j| (upper[j] + lower[m - j], j.abs_diff(diagonal)))
        .unwrap_or(diagonal);

    align(&a[..mid], &b[..split], a_off, b_off, ops);
    align(&a[mid..], &b[split..], a_off + mid, b_off + split, ops);
}

/// Last row of the edit-distance table of `a` against every prefix of `b`.
fn last_row(a: &[u32], b: &[u32]) -> Vec<usize> {
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0; b.len() + 1];
    for (i, x) in a.iter().enumerate() {
        cur[0] = i + 1;
        for (j, y) in b.iter().enumerate() {
            let substitute = prev[j] + usize::from(x != y);
            cur[j + 1] = substitute.min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev
}

/// Folds a deletion followed, across matches only, by a substitution of an
/// element with the same identity and content into a single move.
fn detect_moves(
    ops: Vec<Op>,
    left: &[Value],
    right: &[Value],
    left_hashes: &[u32],
    right_hashes: &[u32],
    identity: &IdentityHook,
) -> Vec<Op> {
    let mut out = Vec::with_capacity(ops.len());
    let mut i = 0;
    while i < ops.len() {
        if let Op::Delete(origin) = ops[i] {
            let mut k = i + 1;
            while matches!(ops.get(k), Some(Op::Match(..))) {
                k += 1;
            }
            if let Some(&Op::Substitute(at, from)) = ops.get(k) {
                let same = origin < at
                    && left_hashes[origin] == right_hashes[from]
                    && matches!(
                        (identity(&left[origin]), identity(&right[from])),
                        (Some(a), Some(b)) if a == b
                    );
                if same {
                    out.extend_from_slice(&ops[i + 1..k]);
                    out.push(Op::Move { origin, at, from });
                    i = k + 1;
                    continue;
                }
            }
        }
        out.push(ops[i]);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(a: &[u32], b: &[u32]) -> Vec<Op> {
        edit_script(a, b, true)
            .into_iter()
            .filter(|op| !matches!(op, Op::Match(..)))
            .collect()
    }

    #[test]
    fn test_identical_sequences() {
        assert!(script(&[1, 2, 3], &[1, 2, 3]).is_empty());
    }

    #[test]
    fn test_insert_at_front() {
        assert_eq!(script(&[2, 3], &[1, 2, 3]), vec![Op::Insert { at: 0, from: 0 }]);
    }

    #[test]
    fn test_append() {
        assert_eq!(script(&[1], &[1, 2, 3]), vec![
            Op::Insert { at: 1, from: 1 },
            Op::Insert { at: 1, from: 2 },
        ]);
    }

    #[test]
    fn test_delete_in_middle() {
        assert_eq!(script(&[0, 1, 2, 3, 4, 5], &[0, 1, 2, 4, 5]), vec![Op::Delete(3)]);
    }

    #[test]
    fn test_permutation_substitutes_positionally() {
        assert_eq!(script(&[1, 2, 3], &[3, 2, 1]), vec![
            Op::Substitute(0, 0),
            Op::Substitute(2, 2),
        ]);
        assert_eq!(script(&[1, 2], &[2, 1]), vec![
            Op::Substitute(0, 0),
            Op::Substitute(1, 1),
        ]);
    }

    #[test]
    fn test_rotation_substitutes_positionally() {
        assert_eq!(script(&[1, 2, 3], &[3, 1, 2]), vec![
            Op::Substitute(0, 0),
            Op::Substitute(1, 1),
            Op::Substitute(2, 2),
        ]);
        assert_eq!(script(&[1, 2, 3, 4, 5], &[1, 3, 4, 2, 5]), vec![
            Op::Substitute(1, 1),
            Op::Substitute(2, 2),
            Op::Substitute(3, 3),
        ]);
    }

    #[test]
    fn test_minimal_script_for_equal_lengths() {
        let ops = edit_script(&[1, 2, 3], &[3, 1, 2], false);
        assert_eq!(ops, vec![
            Op::Insert { at: 0, from: 0 },
            Op::Match(0, 1),
            Op::Match(1, 2),
            Op::Delete(2),
        ]);
    }

    #[test]
    fn test_script_is_minimal() {
        let a = [1, 2, 3, 4, 5, 6, 7];
        let b = [1, 9, 3, 4, 6, 7, 8];
        let cost = edit_script(&a, &b, false)
            .iter()
            .filter(|op| !matches!(op, Op::Match(..)))
            .count();
        assert_eq!(cost, last_row(&a, &b)[b.len()]);
    }

    #[test]
    fn test_last_row() {
        assert_eq!(last_row(&[1], &[3, 2, 1]), vec![1, 1, 2, 2]);
        assert_eq!(last_row(&[], &[1, 2]), vec![0, 1, 2]);
    }

    #[test]
    fn test_move_detection() {
        let left: Vec<Value> = ["A", "B", "C", "D"].iter().map(|s| Value::from(*s)).collect();
        let right: Vec<Value> = ["B", "C", "A"].iter().map(|s| Value::from(*s)).collect();
        let (lh, rh) = ([10, 11, 12, 13], [11, 12, 10]);
        let ops = edit_script(&lh, &rh, false);
        assert_eq!(ops, vec![
            Op::Delete(0),
            Op::Match(1, 0),
            Op::Match(2, 1),
            Op::Substitute(3, 2),
        ]);

        let identity: IdentityHook = std::rc::Rc::new(|v: &Value| match v {
            Value::String(s) => Some(s.clone()),
            _ => None,
        });
        let moved = detect_moves(ops, &left, &right, &lh, &rh, &identity);
        assert_eq!(moved, vec![
            Op::Match(1, 0),
            Op::Match(2, 1),
            Op::Move { origin: 0, at: 3, from: 2 },
        ]);
    }
}
