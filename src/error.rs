//! Error taxonomy for table operations.

use std::collections::TryReserveError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// A bucket array or key buffer could not be allocated.
    #[error("memory allocation failed: {0}")]
    OutOfMemory(#[from] TryReserveError),

    /// Growing would overflow `usize` or pass the configured ceiling.
    #[error("bucket array of {requested} buckets exceeds the limit of {limit}")]
    CapacityOverflow { requested: usize, limit: usize },

    #[error("key not found")]
    KeyNotFound,

    #[error("key must not be empty")]
    EmptyKey,

    #[error("key is {len} bytes long, the limit is {max}")]
    KeyTooLong { len: usize, max: usize },

    #[error("table capacity must be at least one bucket")]
    ZeroCapacity,

    #[error("invalid table configuration: {0}")]
    InvalidConfig(&'static str),
}

impl TableError {
    /// True for the allocation-failure class: the attempted operation was
    /// abandoned and the table is in its prior state.
    pub fn is_allocation_failure(&self) -> bool {
        matches!(
            self,
            TableError::OutOfMemory(_) | TableError::CapacityOverflow { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_class() {
        let mut v: Vec<u8> = Vec::new();
        let oom = v.try_reserve_exact(usize::MAX).unwrap_err();
        assert!(TableError::from(oom).is_allocation_failure());
        assert!(TableError::CapacityOverflow {
            requested: 40,
            limit: 20
        }
        .is_allocation_failure());
        assert!(!TableError::KeyNotFound.is_allocation_failure());
        assert!(!TableError::EmptyKey.is_allocation_failure());
    }

    #[test]
    fn messages_name_the_limits() {
        let e = TableError::KeyTooLong { len: 70, max: 63 };
        assert_eq!(e.to_string(), "key is 70 bytes long, the limit is 63");
        let e = TableError::CapacityOverflow {
            requested: 40,
            limit: 20,
        };
        assert_eq!(
            e.to_string(),
            "bucket array of 40 buckets exceeds the limit of 20"
        );
    }
}
