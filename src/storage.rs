//! Capability traits the three layers program against.
//!
//! - [`Storage`] is the single-owner capability: mutation takes `&mut self`
//!   and there is no internal synchronization. [`Table`](crate::Table)
//!   implements it; [`GuardedTable`](crate::GuardedTable) wraps any
//!   implementation in a lock.
//! - [`Segment`] is the shared capability: mutation takes `&self` and the
//!   implementor must be `Send + Sync`. [`ShardedMap`](crate::ShardedMap)
//!   owns a fixed list of segments and routes to them by hash.
//!
//! Keys follow the usual `Eq + Hash` contract: `a == b` must imply equal
//! hashes and `Eq` must be an equivalence relation. Violations are not
//! detected; they surface as lookups that silently miss or hit the wrong
//! entry.

use crate::handler::Handler;

pub trait Storage<K, V> {
    fn get(&self, key: &K) -> Option<&V>;

    /// Insert or overwrite; returns the previous value when overwriting.
    fn set(&mut self, key: K, value: V) -> Option<V>;

    /// Returns `true` if the key was present.
    fn delete(&mut self, key: &K) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slot positions; `entry_at` accepts `0..capacity()`.
    fn capacity(&self) -> usize;

    /// All slot positions in a uniformly random order.
    fn shuffled_positions(&self) -> Vec<usize>;

    /// The entry stored at `position`, if that slot is occupied. Positions
    /// past the current capacity yield `None`.
    fn entry_at(&self, position: usize) -> Option<(&K, &V)>;

    /// Visit every live entry in random slot order. Stops and returns
    /// `false` as soon as the handler does; returns `true` otherwise.
    fn iterate(&self, handler: &mut Handler<'_, K, V>) -> bool {
        for position in self.shuffled_positions() {
            if let Some((key, value)) = self.entry_at(position) {
                if !handler(key, value) {
                    return false;
                }
            }
        }
        true
    }
}

/// An independently locked partition of a [`ShardedMap`](crate::ShardedMap).
///
/// Values are returned by clone since no lock is held once a call returns.
pub trait Segment<K, V>: Send + Sync {
    fn get(&self, key: &K) -> Option<V>;

    fn set(&self, key: K, value: V) -> Option<V>;

    fn delete(&self, key: &K) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn iterate(&self, handler: &mut Handler<'_, K, V>) -> bool;
}
