//! GuardedTable: one storage behind a reader/writer lock.
//!
//! Lookups take the shared lock, mutations take the exclusive lock, each
//! only for the duration of the single operation. Iteration holds the
//! shared lock only to collect the keys and to look each one up again, never
//! while the handler runs, so a handler may read or write this same table
//! (or block for a long time) without deadlocking or stalling writers.

use crate::config::TableConfig;
use crate::error::Result;
use crate::handler::Handler;
use crate::storage::{Segment, Storage};
use crate::table::Table;
use core::hash::Hash;
use core::marker::PhantomData;
use parking_lot::RwLock;

pub struct GuardedTable<K, V, T = Table<K, V>> {
    inner: RwLock<T>,
    _pd: PhantomData<fn(K) -> V>,
}

impl<K, V> GuardedTable<K, V>
where
    K: Eq + Hash,
{
    /// A guarded default-configured `Table`. Every call builds a new table.
    pub fn new() -> Self {
        Self::with_storage(Table::new())
    }

    pub fn with_config(config: TableConfig) -> Result<Self> {
        Ok(Self::with_storage(Table::with_config(config)?))
    }
}

impl<K, V> Default for GuardedTable<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, T> GuardedTable<K, V, T>
where
    T: Storage<K, V>,
{
    /// Guard an arbitrary storage implementation.
    pub fn with_storage(storage: T) -> Self {
        Self {
            inner: RwLock::new(storage),
            _pd: PhantomData,
        }
    }

    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
    pub fn capacity(&self) -> usize {
        self.inner.read().capacity()
    }

    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.inner.read().get(key).cloned()
    }

    /// Read the value in place under the shared lock, without cloning it.
    /// `f` must not write to this table: the shared lock is still held.
    pub fn get_with<R>(&self, key: &K, f: impl FnOnce(&V) -> R) -> Option<R> {
        self.inner.read().get(key).map(f)
    }

    pub fn set(&self, key: K, value: V) -> Option<V> {
        self.inner.write().set(key, value)
    }

    pub fn delete(&self, key: &K) -> bool {
        self.inner.write().delete(key)
    }

    /// Visit live entries in random slot order; returns `false` if the
    /// handler stopped the iteration.
    ///
    /// The keys are collected under the shared lock up front. Each key is
    /// then looked up again under a short shared lock and the handler gets
    /// clones of the current entry, running with no lock held. Deletes,
    /// including the handler's own, can move entries between slots without
    /// affecting which keys are visited. In exchange the iteration is not a
    /// snapshot: a key deleted before it is reached is skipped, a key
    /// inserted after the iteration started is not visited, and values
    /// reflect writes made up to the moment of the visit. Use
    /// [`snapshot`](Self::snapshot) when a consistent view is required.
    pub fn iterate<F>(&self, mut handler: F) -> bool
    where
        K: Clone,
        V: Clone,
        F: FnMut(&K, &V) -> bool,
    {
        let keys = {
            let guard = self.inner.read();
            let keys: Vec<K> = guard
                .shuffled_positions()
                .into_iter()
                .filter_map(|position| guard.entry_at(position).map(|(k, _)| k.clone()))
                .collect();
            keys
        };
        for key in keys {
            let Some(value) = self.inner.read().get(&key).cloned() else {
                continue;
            };
            if !handler(&key, &value) {
                return false;
            }
        }
        true
    }

    /// Clone every live entry under a single shared lock acquisition.
    pub fn snapshot(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        let guard = self.inner.read();
        let mut entries = Vec::with_capacity(guard.len());
        guard.iterate(&mut |k, v| {
            entries.push((k.clone(), v.clone()));
            true
        });
        entries
    }
}

impl<K, V, T> Segment<K, V> for GuardedTable<K, V, T>
where
    K: Clone + Send + Sync,
    V: Clone + Send + Sync,
    T: Storage<K, V> + Send + Sync,
{
    fn get(&self, key: &K) -> Option<V> {
        GuardedTable::get(self, key)
    }
    fn set(&self, key: K, value: V) -> Option<V> {
        GuardedTable::set(self, key, value)
    }
    fn delete(&self, key: &K) -> bool {
        GuardedTable::delete(self, key)
    }
    fn len(&self) -> usize {
        GuardedTable::len(self)
    }
    fn iterate(&self, handler: &mut Handler<'_, K, V>) -> bool {
        GuardedTable::iterate(self, handler)
    }
}
