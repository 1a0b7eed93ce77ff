//! ChainTable: bucket array of collision chains with explicit rehashing.

use crate::chain::{empty_heads, owned_key, Arena, Chain, Head};
use crate::config::{GrowthPolicy, TableConfig};
use crate::error::TableError;
use crate::hash::hash;
use crate::invariants::{audit, audit_bucket, InvariantViolation};
use crate::stats::TableStats;
use log::{debug, info, warn};

/// What an `insert` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// A new entry was appended to the chain of `bucket`. `collided` is set
    /// when that chain already held other entries.
    Inserted { bucket: usize, collided: bool },
    /// The key was present; its value was overwritten.
    Updated { bucket: usize, previous: i32 },
}

impl Insertion {
    pub fn bucket(&self) -> usize {
        match *self {
            Insertion::Inserted { bucket, .. } | Insertion::Updated { bucket, .. } => bucket,
        }
    }

    pub fn is_collision(&self) -> bool {
        matches!(self, Insertion::Inserted { collided: true, .. })
    }
}

/// Where a key lives: its bucket and its zero-based position in that chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub bucket: usize,
    pub position: usize,
}

#[derive(Debug)]
pub struct ChainTable {
    buckets: Vec<Head>,
    arena: Arena,
    count: usize,
    config: TableConfig,
}

impl Default for ChainTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainTable {
    /// Table with the default configuration (10 buckets, manual growth).
    pub fn new() -> Self {
        let config = TableConfig::default();
        Self {
            buckets: vec![None; config.initial_capacity],
            arena: Arena::new(),
            count: 0,
            config,
        }
    }

    /// Table with `capacity` buckets and otherwise default settings.
    pub fn with_capacity(capacity: usize) -> Result<Self, TableError> {
        Self::with_config(TableConfig::default().with_initial_capacity(capacity))
    }

    /// Table built from `config`; the config is validated first.
    pub fn with_config(config: TableConfig) -> Result<Self, TableError> {
        config.validate()?;
        let buckets = empty_heads(config.initial_capacity)?;
        Ok(Self {
            buckets,
            arena: Arena::new(),
            count: 0,
            config,
        })
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.count as f64 / self.capacity() as f64
    }

    /// Bucket `key` maps to at the current capacity.
    pub fn bucket_index(&self, key: &str) -> usize {
        hash(key, self.capacity())
    }

    fn check_key(&self, key: &str) -> Result<(), TableError> {
        if key.is_empty() {
            return Err(TableError::EmptyKey);
        }
        if key.len() > self.config.max_key_len {
            return Err(TableError::KeyTooLong {
                len: key.len(),
                max: self.config.max_key_len,
            });
        }
        Ok(())
    }

    /// Insert `key`, or overwrite its value if already present.
    ///
    /// New entries go to the tail of their chain. On error the table is left
    /// exactly as it was.
    pub fn insert(&mut self, key: &str, value: i32) -> Result<Insertion, TableError> {
        self.check_key(key)?;
        let bucket = self.bucket_index(key);
        if let Some((_, k)) = self.arena.find(self.buckets[bucket], key) {
            let previous = self.arena.replace_value(k, value);
            return Ok(Insertion::Updated { bucket, previous });
        }

        let owned = owned_key(key)?;
        let bucket = if self.grow_before_insert()? {
            self.bucket_index(key)
        } else {
            bucket
        };

        let collided = self.buckets[bucket].is_some();
        if collided {
            debug!("collision inserting {key:?} into bucket {bucket}");
        }
        let k = self.arena.alloc(owned, value);
        self.arena.push_back(&mut self.buckets[bucket], k);
        self.count += 1;
        self.debug_audit_bucket(bucket);
        Ok(Insertion::Inserted { bucket, collided })
    }

    /// Grow, in a single rehash, to the smallest doubling of the capacity
    /// that keeps one more entry under the load-factor limit. Stops at
    /// `max_capacity`. Returns whether the capacity changed.
    fn grow_before_insert(&mut self) -> Result<bool, TableError> {
        let GrowthPolicy::LoadFactor(limit) = self.config.growth else {
            return Ok(false);
        };
        let needed = (self.count + 1) as f64;
        let mut target = self.capacity();
        while needed / target as f64 > limit {
            match target.checked_mul(2).filter(|&c| c <= self.config.max_capacity) {
                Some(next) => target = next,
                None => {
                    warn!(
                        "not growing past {target} buckets (limit {})",
                        self.config.max_capacity
                    );
                    break;
                }
            }
        }
        if target == self.capacity() {
            return Ok(false);
        }
        debug!(
            "load factor would exceed {limit} at capacity {}, growing to {target}",
            self.capacity()
        );
        self.rehash_to(target)?;
        Ok(true)
    }

    /// Value stored under `key`, or `None` if absent.
    pub fn search(&self, key: &str) -> Option<i32> {
        let bucket = self.bucket_index(key);
        self.arena
            .find(self.buckets[bucket], key)
            .map(|(_, k)| self.arena.value(k))
    }

    /// Alias of `search`.
    pub fn get(&self, key: &str) -> Option<i32> {
        self.search(key)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.search(key).is_some()
    }

    /// Bucket and chain position of `key`, or `None` if absent.
    pub fn locate(&self, key: &str) -> Option<Location> {
        let bucket = self.bucket_index(key);
        self.arena
            .find(self.buckets[bucket], key)
            .map(|(position, _)| Location { bucket, position })
    }

    /// Remove `key`, returning its value.
    pub fn delete(&mut self, key: &str) -> Result<i32, TableError> {
        let bucket = self.bucket_index(key);
        let entry = self
            .arena
            .unlink(&mut self.buckets[bucket], key)
            .ok_or(TableError::KeyNotFound)?;
        self.count -= 1;
        self.debug_audit_bucket(bucket);
        Ok(entry.value)
    }

    /// Double the capacity and move every entry to its bucket at the new size.
    ///
    /// Fails with `CapacityOverflow` when doubling would overflow or pass
    /// `max_capacity`; the table is then unchanged.
    pub fn rehash(&mut self) -> Result<(), TableError> {
        let old_capacity = self.capacity();
        let limit = self.config.max_capacity;
        let new_capacity = old_capacity
            .checked_mul(2)
            .filter(|&c| c <= limit)
            .ok_or(TableError::CapacityOverflow {
                requested: old_capacity.saturating_mul(2),
                limit,
            })?;
        self.rehash_to(new_capacity)
    }

    /// Relink every entry into a fresh array of `new_capacity` buckets.
    ///
    /// Both the new bucket array and the scratch tail index are allocated
    /// before any entry is touched, so a failure leaves the table unchanged.
    /// Entries are relinked in old bucket order, then chain order, each one
    /// appended to its new chain's tail.
    fn rehash_to(&mut self, new_capacity: usize) -> Result<(), TableError> {
        let old_capacity = self.capacity();
        let new_buckets = empty_heads(new_capacity)?;
        let mut tails = empty_heads(new_capacity)?;
        let old_buckets = std::mem::replace(&mut self.buckets, new_buckets);

        for head in old_buckets {
            let mut cur = head;
            while let Some(k) = cur {
                cur = self.arena.detach_next(k);
                let i = hash(self.arena.key(k), new_capacity);
                self.arena
                    .push_back_at(&mut self.buckets[i], &mut tails[i], k);
            }
        }

        info!(
            "rehashed {} entries: {old_capacity} -> {new_capacity} buckets",
            self.count
        );
        self.debug_audit();
        Ok(())
    }

    /// Destroy every entry, keeping the current capacity.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.buckets.fill(None);
        self.count = 0;
    }

    /// Load, collision and chain-length figures for the current contents.
    pub fn stats(&self) -> TableStats {
        TableStats::from_chain_lengths(self.count, self.capacity(), self.chain_lengths())
    }

    /// Length of each bucket's chain, in bucket order.
    pub fn chain_lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.buckets.iter().map(|&h| self.arena.chain_len(h))
    }

    /// Entries of one bucket in chain order, or `None` past the last bucket.
    pub fn chain(&self, bucket: usize) -> Option<Chain<'_>> {
        self.buckets.get(bucket).map(|&h| self.arena.chain(h))
    }

    /// Every bucket with its chain, including empty ones.
    pub fn buckets(&self) -> Buckets<'_> {
        Buckets {
            heads: self.buckets.iter().enumerate(),
            arena: &self.arena,
        }
    }

    /// All entries, in bucket order then chain order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            buckets: self.buckets(),
            current: None,
        }
    }

    /// Check the structural invariants.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        audit(&self.buckets, &self.arena, self.count)
    }

    /// Debug builds: check the one chain a mutation touched. O(chain length).
    #[inline]
    fn debug_audit_bucket(&self, bucket: usize) {
        #[cfg(debug_assertions)]
        {
            if let Err(v) = audit_bucket(&self.buckets, &self.arena, self.count, bucket) {
                panic!("chain table corrupted: {v}");
            }
        }
        #[cfg(not(debug_assertions))]
        let _ = bucket;
    }

    /// Debug builds: full audit, used after a rehash (already O(n)).
    #[inline]
    fn debug_audit(&self) {
        #[cfg(debug_assertions)]
        {
            if let Err(v) = self.validate() {
                panic!("chain table corrupted: {v}");
            }
        }
    }
}

/// Iterator over `(bucket index, chain)` pairs.
#[derive(Debug)]
pub struct Buckets<'a> {
    heads: core::iter::Enumerate<core::slice::Iter<'a, Head>>,
    arena: &'a Arena,
}

impl<'a> Iterator for Buckets<'a> {
    type Item = (usize, Chain<'a>);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let arena = self.arena;
        self.heads.next().map(|(i, &h)| (i, arena.chain(h)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.heads.size_hint()
    }
}

/// Iterator over all `(key, value)` entries.
#[derive(Debug)]
pub struct Iter<'a> {
    buckets: Buckets<'a>,
    current: Option<Chain<'a>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, i32);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.current.as_mut().and_then(Iterator::next) {
                return Some(item);
            }
            let (_, chain) = self.buckets.next()?;
            self.current = Some(chain);
        }
    }
}

impl<'a> IntoIterator for &'a ChainTable {
    type Item = (&'a str, i32);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
