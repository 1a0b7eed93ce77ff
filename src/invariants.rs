//! Structural audit of a table.
//!
//! Walks every chain and checks the three structural invariants:
//! the entry count matches what the chains reach, every entry sits in the
//! bucket its key hashes to at the current capacity, and no entry is reachable
//! twice or left unreachable. `ChainTable::validate` exposes this in all
//! builds. Debug builds check after each mutation and panic on failure: an
//! insert or delete checks only the chain it touched (`audit_bucket`), a
//! rehash runs the full audit. In release builds the automatic check compiles
//! away.

use crate::chain::{Arena, Head};
use crate::hash::hash;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("table counts {count} entries but the chains reach {reachable}")]
    CountMismatch { count: usize, reachable: usize },

    #[error("table counts {count} entries but the arena stores {stored}")]
    StoredMismatch { count: usize, stored: usize },

    #[error("key {key:?} found in bucket {found}, hashes to bucket {expected}")]
    Misplaced {
        key: String,
        expected: usize,
        found: usize,
    },

    #[error("key {key:?} is reachable more than once")]
    Duplicate { key: String },

    #[error("chain at bucket {bucket} does not terminate")]
    Cycle { bucket: usize },
}

pub(crate) fn audit(
    buckets: &[Head],
    arena: &Arena,
    count: usize,
) -> Result<(), InvariantViolation> {
    let stored = arena.len();
    if stored != count {
        return Err(InvariantViolation::StoredMismatch { count, stored });
    }

    let capacity = buckets.len();
    let mut seen: HashSet<&str> = HashSet::with_capacity(count);
    let mut reachable = 0usize;
    for (bucket, &head) in buckets.iter().enumerate() {
        for (steps, k) in arena.chain(head).keys().enumerate() {
            if steps >= stored {
                return Err(InvariantViolation::Cycle { bucket });
            }
            let key = arena.key(k);
            let expected = hash(key, capacity);
            if expected != bucket {
                return Err(InvariantViolation::Misplaced {
                    key: key.to_string(),
                    expected,
                    found: bucket,
                });
            }
            if !seen.insert(key) {
                return Err(InvariantViolation::Duplicate {
                    key: key.to_string(),
                });
            }
            reachable += 1;
        }
    }

    if reachable != count {
        return Err(InvariantViolation::CountMismatch { count, reachable });
    }
    Ok(())
}

/// Audit of a single chain: the stored count, then placement, duplicates and
/// termination within `bucket` only. Cost is the chain length.
pub(crate) fn audit_bucket(
    buckets: &[Head],
    arena: &Arena,
    count: usize,
    bucket: usize,
) -> Result<(), InvariantViolation> {
    let stored = arena.len();
    if stored != count {
        return Err(InvariantViolation::StoredMismatch { count, stored });
    }

    let capacity = buckets.len();
    let mut seen: HashSet<&str> = HashSet::new();
    for (steps, k) in arena.chain(buckets[bucket]).keys().enumerate() {
        if steps >= stored {
            return Err(InvariantViolation::Cycle { bucket });
        }
        let key = arena.key(k);
        let expected = hash(key, capacity);
        if expected != bucket {
            return Err(InvariantViolation::Misplaced {
                key: key.to_string(),
                expected,
                found: bucket,
            });
        }
        if !seen.insert(key) {
            return Err(InvariantViolation::Duplicate {
                key: key.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::empty_heads;

    fn place(arena: &mut Arena, buckets: &mut [Head], key: &str, bucket: usize) {
        let k = arena.alloc(key.to_string(), 0);
        arena.push_back(&mut buckets[bucket], k);
    }

    #[test]
    fn consistent_table_passes() {
        let mut arena = Arena::new();
        let mut buckets = empty_heads(10).unwrap();
        for key in ["cat", "act", "dog"] {
            let b = hash(key, 10);
            place(&mut arena, &mut buckets, key, b);
        }
        assert_eq!(audit(&buckets, &arena, 3), Ok(()));
    }

    #[test]
    fn detects_stale_placement() {
        let mut arena = Arena::new();
        let mut buckets = empty_heads(10).unwrap();
        // 'a' = 97 -> bucket 7 at capacity 10
        place(&mut arena, &mut buckets, "a", 3);
        assert_eq!(
            audit(&buckets, &arena, 1),
            Err(InvariantViolation::Misplaced {
                key: "a".to_string(),
                expected: 7,
                found: 3
            })
        );
    }

    #[test]
    fn detects_count_drift() {
        let mut arena = Arena::new();
        let mut buckets = empty_heads(10).unwrap();
        place(&mut arena, &mut buckets, "a", 7);
        assert_eq!(
            audit(&buckets, &arena, 2),
            Err(InvariantViolation::StoredMismatch {
                count: 2,
                stored: 1
            })
        );
        assert_eq!(
            audit_bucket(&buckets, &arena, 2, 7),
            Err(InvariantViolation::StoredMismatch {
                count: 2,
                stored: 1
            })
        );
    }

    #[test]
    fn detects_unreachable_entry() {
        let mut arena = Arena::new();
        let mut buckets = empty_heads(10).unwrap();
        place(&mut arena, &mut buckets, "a", 7);
        let _orphan = arena.alloc("b".to_string(), 0);
        assert_eq!(
            audit(&buckets, &arena, 2),
            Err(InvariantViolation::CountMismatch {
                count: 2,
                reachable: 1
            })
        );
    }

    #[test]
    fn detects_cycle() {
        let mut arena = Arena::new();
        let mut buckets = empty_heads(10).unwrap();
        let k = arena.alloc("a".to_string(), 0);
        buckets[7] = Some(k);
        // Link the entry to itself.
        let mut tail = Some(k);
        let mut head = buckets[7];
        arena.push_back_at(&mut head, &mut tail, k);
        assert_eq!(
            audit(&buckets, &arena, 1),
            Err(InvariantViolation::Cycle { bucket: 7 })
        );
    }

    #[test]
    fn bucket_audit_checks_only_its_chain() {
        let mut arena = Arena::new();
        let mut buckets = empty_heads(10).unwrap();
        place(&mut arena, &mut buckets, "cat", 2);
        // 'a' belongs in bucket 7.
        place(&mut arena, &mut buckets, "a", 3);
        assert_eq!(audit_bucket(&buckets, &arena, 2, 2), Ok(()));
        assert_eq!(
            audit_bucket(&buckets, &arena, 2, 3),
            Err(InvariantViolation::Misplaced {
                key: "a".to_string(),
                expected: 7,
                found: 3
            })
        );
    }

    #[test]
    fn bucket_audit_detects_duplicate_and_cycle() {
        let mut arena = Arena::new();
        let mut buckets = empty_heads(10).unwrap();
        place(&mut arena, &mut buckets, "cat", 2);
        place(&mut arena, &mut buckets, "cat", 2);
        assert_eq!(
            audit_bucket(&buckets, &arena, 2, 2),
            Err(InvariantViolation::Duplicate {
                key: "cat".to_string()
            })
        );

        let mut arena = Arena::new();
        let mut buckets = empty_heads(10).unwrap();
        let k = arena.alloc("a".to_string(), 0);
        buckets[7] = Some(k);
        let mut tail = Some(k);
        let mut head = buckets[7];
        arena.push_back_at(&mut head, &mut tail, k);
        assert_eq!(
            audit_bucket(&buckets, &arena, 1, 7),
            Err(InvariantViolation::Cycle { bucket: 7 })
        );
    }
}
