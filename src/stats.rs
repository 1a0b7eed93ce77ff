//! Read-only diagnostics over a table's chains.

use core::fmt;

/// Load factor at or above which the table is no longer considered efficient.
pub const EFFICIENT_LOAD_FACTOR: f64 = 0.75;

/// Chain length at or above which the table is no longer considered efficient.
pub const EFFICIENT_LONGEST_CHAIN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Efficiency {
    Good,
    /// A rehash is advisable.
    Degrading,
}

impl Efficiency {
    pub fn classify(load_factor: f64, longest_chain: usize) -> Self {
        if load_factor < EFFICIENT_LOAD_FACTOR && longest_chain < EFFICIENT_LONGEST_CHAIN {
            Efficiency::Good
        } else {
            Efficiency::Degrading
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Efficiency::Good => "good",
            Efficiency::Degrading => "degrading",
        }
    }
}

impl fmt::Display for Efficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a table's shape. Built by `ChainTable::stats`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStats {
    pub count: usize,
    pub capacity: usize,
    pub used_buckets: usize,
    /// Entries beyond the first in each occupied bucket.
    pub collisions: usize,
    pub longest_chain: usize,
    pub load_factor: f64,
    pub efficiency: Efficiency,
}

impl TableStats {
    pub(crate) fn from_chain_lengths<I>(count: usize, capacity: usize, lengths: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut used_buckets = 0;
        let mut collisions = 0;
        let mut longest_chain = 0;
        for len in lengths {
            if len == 0 {
                continue;
            }
            used_buckets += 1;
            collisions += len - 1;
            longest_chain = longest_chain.max(len);
        }
        let load_factor = if capacity == 0 {
            0.0
        } else {
            count as f64 / capacity as f64
        };
        Self {
            count,
            capacity,
            used_buckets,
            collisions,
            longest_chain,
            load_factor,
            efficiency: Efficiency::classify(load_factor, longest_chain),
        }
    }

    /// Fraction of buckets holding at least one entry.
    pub fn used_ratio(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.used_buckets as f64 / self.capacity as f64
        }
    }

    pub fn needs_rehash(&self) -> bool {
        self.efficiency == Efficiency::Degrading
    }
}
