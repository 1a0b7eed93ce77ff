//! chain-table: a single-threaded hash table with separate chaining,
//! byte-sum hashing, explicit rehashing and collision statistics.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small table whose collision behaviour is easy to provoke and
//!   measure, built in layers that can each be checked on their own.
//! - Layers:
//!   - `hash`: sum of the key's bytes modulo the capacity. Deliberately weak;
//!     anagrams always collide.
//!   - `chain`: entry arena (a generational `SlotMap`) plus singly-linked
//!     chains expressed as `EntryKey` links. No raw pointers, no per-link
//!     ownership juggling during unlink or relink.
//!   - `ChainTable`: bucket array of chain heads, entry count, config.
//!     Insert/update, search, delete, rehash, statistics, enumeration.
//!
//! Constraints
//! - Single-threaded. The table provides no synchronisation; callers that
//!   share it across threads serialise access themselves.
//! - Keys are non-empty text of at most `max_key_len` bytes (63 by default);
//!   values are `i32`. Keys are unique, a repeated insert overwrites.
//! - New entries are appended at the tail of their chain. Enumeration order
//!   (bucket order, then chain order) is observable and stable.
//! - Every entry sits in bucket `hash(key, capacity)` for the *current*
//!   capacity; `count` equals the number of entries the chains reach.
//!
//! Rehashing
//! - `rehash` doubles the capacity. All fallible allocation happens before
//!   any link is rewritten, so a failure leaves the table untouched.
//! - Entries are relinked, never copied: old bucket order, then chain order,
//!   each appended to the tail of its new chain.
//! - Growth is manual by default. `GrowthPolicy::LoadFactor` additionally
//!   grows before an insert would exceed the limit, jumping straight to the
//!   smallest sufficient doubling in one all-or-nothing rehash.
//!
//! Errors
//! - Every failure is a `TableError` value; nothing in the table prints or
//!   terminates the process. Absent keys are `None` from `search` and
//!   `KeyNotFound` from `delete`.
//!
//! Debug auditing
//! - Debug builds re-check the structure after each mutation and panic on
//!   violation. Insert and delete check only the chain they touched; rehash
//!   runs the full audit. `ChainTable::validate` runs the full audit on
//!   demand in any build.

mod chain;
mod chain_proptest;
pub mod config;
mod error;
pub mod hash;
mod invariants;
pub mod stats;
mod table;

// Public surface
pub use chain::Chain;
pub use config::{GrowthPolicy, TableConfig};
pub use error::TableError;
pub use invariants::InvariantViolation;
pub use stats::{Efficiency, TableStats};
pub use table::{Buckets, ChainTable, Insertion, Iter, Location};
