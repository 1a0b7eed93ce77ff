//! Byte-sum hashing.
//!
//! The hash is deliberately weak: anagrams ("cat", "act") and any keys with
//! equal byte sums land in the same bucket. Statistics reported by the table
//! depend on this exact function, so it must not be swapped for a stronger one.

/// Wrapping sum of the key's bytes.
#[inline]
pub fn byte_sum(key: &str) -> u32 {
    key.bytes()
        .fold(0u32, |acc, b| acc.wrapping_add(u32::from(b)))
}

/// Bucket index of `key` in a table of `capacity` buckets.
///
/// The empty key hashes to 0. A zero capacity has no valid index; 0 is
/// returned instead of dividing by zero.
#[inline]
pub fn hash(key: &str, capacity: usize) -> usize {
    if capacity == 0 {
        return 0;
    }
    (byte_sum(key) as usize) % capacity
}
