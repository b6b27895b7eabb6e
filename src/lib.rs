//! shard-map: an open-addressing hash map with a lock-guarded layer and a
//! hash-sharded concurrent layer on top.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: O(1) amortized lookup, insert and delete that stays correct and
//!   scales under concurrent use, built in layers that can each be reasoned
//!   about on their own.
//! - Layers:
//!   - Table<K, V, S>: single-threaded open-addressing map with linear
//!     probing and user-controlled growth. No synchronization at all.
//!   - GuardedTable<K, V, T>: wraps one `Storage` (a `Table` by default) in
//!     a reader/writer lock and implements the iteration protocol below.
//!   - ShardedMap<K, V, S>: a fixed list of `Segment`s (guarded tables by
//!     default); each key is routed to `segments[hash(key) % N]`.
//!
//! Constraints
//! - Lookups report absence with `Option`/`bool`; no runtime errors.
//! - Only construction can fail (`ConfigError`): zero capacity, zero
//!   concurrency level, a load factor outside [0.01, 1), a grow factor
//!   below 2.
//! - After every insert returns, `len / capacity <= max_load_factor`.
//!   Tables grow by `grow_factor` and never shrink.
//!
//! Iteration protocol
//! - Every `iterate` takes a handler `FnMut(&K, &V) -> bool`; returning
//!   `false` stops the walk and makes `iterate` return `false`.
//! - Tables are visited in a random permutation of slot positions and the
//!   sharded map visits segments in a random order, so no caller comes to
//!   depend on an order and no segment is systematically visited first.
//! - `GuardedTable::iterate` collects the keys under the shared lock, then
//!   looks each one up again under a fresh shared lock and calls the
//!   handler with no lock held. The handler therefore may reenter the same
//!   table, and writers are not blocked by slow handlers. Backward shifts
//!   and grows move entries between slots, so the walk is over keys rather
//!   than slot positions: every key present at the start and still present
//!   when reached is visited exactly once. The price: no snapshot
//!   isolation. Keys deleted before they are reached are skipped, keys
//!   inserted later are not visited, and values are read at visit time.
//!   `snapshot()` trades memory for a consistent per-segment view.
//! - `with_interruption` wraps a handler with a cancellation signal that
//!   is polled before each call.
//!
//! Deletion
//! - Linear probing without tombstones would make a key unreachable once
//!   an earlier member of its cluster is deleted. `Table::delete` shifts
//!   later cluster members back into the hole instead, so the slot array
//!   only ever holds live entries or empty slots.
//!
//! Keys and hashing
//! - Keys are `Eq + Hash` and must uphold `a == b => hash(a) == hash(b)`.
//!   Violations are not detected; they show up as missed lookups.
//! - Each table owns its hasher (`RandomState` by default, seeded per
//!   instance) and stores each entry's hash, so `K: Hash` never runs during
//!   a grow. The sharded map routes with a separate hasher; the two are
//!   decorrelated, so keys of one segment still spread over its table.
//! - Routing applies no extra bit mixing. A hasher with poor low bits
//!   leaves segments unbalanced; this is not corrected.

mod config;
mod error;
mod guarded_table;
mod handler;
mod sharded_map;
mod storage;
mod table;
mod table_proptest;

// Public surface
pub use config::{
    SegmentFactory, ShardedConfig, TableConfig, DEFAULT_CONCURRENCY_LEVEL, DEFAULT_GROW_FACTOR,
    DEFAULT_INITIAL_CAPACITY, DEFAULT_MAX_LOAD_FACTOR, MIN_MAX_LOAD_FACTOR,
};
pub use error::{ConfigError, Result};
pub use guarded_table::GuardedTable;
pub use handler::{with_interruption, CancelToken, Cancellation, Handler};
pub use sharded_map::ShardedMap;
pub use storage::{Segment, Storage};
pub use table::Table;
