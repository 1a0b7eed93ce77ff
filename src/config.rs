//! Table construction parameters.

use crate::error::TableError;

/// Bucket count of a table built with `ChainTable::new`.
pub const DEFAULT_CAPACITY: usize = 10;

/// Longest accepted key in bytes (a 64-byte buffer minus its terminator).
pub const DEFAULT_MAX_KEY_LEN: usize = 63;

/// Largest bucket array a table will grow to unless configured otherwise.
pub const DEFAULT_MAX_CAPACITY: usize = 1 << 30;

/// When the table grows on its own. `rehash` is available under every policy.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GrowthPolicy {
    /// Only explicit `rehash` calls grow the table.
    #[default]
    Manual,
    /// Double the capacity before an insert of a new key would push the load
    /// factor above the limit.
    LoadFactor(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableConfig {
    pub initial_capacity: usize,
    pub max_key_len: usize,
    pub max_capacity: usize,
    pub growth: GrowthPolicy,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            max_key_len: DEFAULT_MAX_KEY_LEN,
            max_capacity: DEFAULT_MAX_CAPACITY,
            growth: GrowthPolicy::Manual,
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn with_max_key_len(mut self, len: usize) -> Self {
        self.max_key_len = len;
        self
    }

    pub fn with_max_capacity(mut self, capacity: usize) -> Self {
        self.max_capacity = capacity;
        self
    }

    pub fn with_growth(mut self, growth: GrowthPolicy) -> Self {
        self.growth = growth;
        self
    }

    pub fn validate(&self) -> Result<(), TableError> {
        if self.initial_capacity == 0 {
            return Err(TableError::ZeroCapacity);
        }
        if self.max_capacity < self.initial_capacity {
            return Err(TableError::InvalidConfig(
                "max_capacity is smaller than initial_capacity",
            ));
        }
        if self.max_key_len == 0 {
            return Err(TableError::InvalidConfig("max_key_len must be positive"));
        }
        if let GrowthPolicy::LoadFactor(limit) = self.growth {
            if !limit.is_finite() || limit <= 0.0 {
                return Err(TableError::InvalidConfig(
                    "load factor limit must be finite and positive",
                ));
            }
        }
        Ok(())
    }
}
