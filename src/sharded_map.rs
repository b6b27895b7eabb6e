//! ShardedMap: a fixed set of independently locked segments.
//!
//! A key is routed to `segments[hash(key) % N]`. The hash goes straight
//! into the modulo without extra bit mixing, so a low-entropy hasher can
//! leave most segments idle while a few absorb all traffic. Pick a hasher
//! whose low bits are well distributed.
//!
//! Operations on keys in different segments never touch the same lock.
//! There is no operation that locks more than one segment at a time:
//! `len`, `iterate` and `snapshot` observe the segments one after another
//! and are therefore not atomic with respect to concurrent writers.

use crate::config::ShardedConfig;
use crate::error::Result;
use crate::storage::Segment;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use log::debug;
use rand::seq::SliceRandom;
use std::collections::hash_map::RandomState;

pub struct ShardedMap<K, V, S = RandomState> {
    hasher: S,
    segments: Box<[Box<dyn Segment<K, V>>]>,
}

impl<K, V> ShardedMap<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// 16 segments, each a guarded default-configured table.
    pub fn new() -> Self {
        Self::build(ShardedConfig::new(), RandomState::new())
    }
}

impl<K, V> Default for ShardedMap<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ShardedMap<K, V>
where
    K: Hash,
{
    pub fn with_config(config: ShardedConfig<K, V>) -> Result<Self> {
        Self::with_config_and_hasher(config, RandomState::new())
    }
}

impl<K, V, S> ShardedMap<K, V, S>
where
    K: Hash,
    S: BuildHasher,
{
    /// Build `config.concurrency_level` segments with the configured
    /// factory. `hasher` only routes keys to segments; each segment hashes
    /// keys with its own hasher.
    pub fn with_config_and_hasher(config: ShardedConfig<K, V>, hasher: S) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, hasher))
    }

    fn build(config: ShardedConfig<K, V>, hasher: S) -> Self {
        let segments: Box<[Box<dyn Segment<K, V>>]> = (0..config.concurrency_level)
            .map(|_| (config.segment_factory)())
            .collect();
        debug!("sharded map built with {} segments", segments.len());
        Self { hasher, segments }
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Index of the segment that owns `key`.
    pub fn segment_index(&self, key: &K) -> usize {
        (self.hasher.hash_one(key) % self.segments.len() as u64) as usize
    }

    fn segment(&self, key: &K) -> &dyn Segment<K, V> {
        self.segments[self.segment_index(key)].as_ref()
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.segment(key).get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    pub fn set(&self, key: K, value: V) -> Option<V> {
        self.segment(&key).set(key, value)
    }

    pub fn delete(&self, key: &K) -> bool {
        self.segment(key).delete(key)
    }

    /// Sum of the segment sizes, read one segment at a time.
    pub fn len(&self) -> usize {
        self.segments.iter().map(|s| s.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.is_empty())
    }

    /// Visit every segment in a uniformly random order, delegating to each
    /// segment's own `iterate`. Returns `false` as soon as one segment's
    /// iteration is stopped by the handler.
    ///
    /// Consistency is that of the segments: with the default segments the
    /// handler runs with no lock held and may observe concurrent writes.
    pub fn iterate<F>(&self, mut handler: F) -> bool
    where
        F: FnMut(&K, &V) -> bool,
    {
        let mut order: Vec<usize> = (0..self.segments.len()).collect();
        order.shuffle(&mut rand::thread_rng());
        for index in order {
            if !self.segments[index].iterate(&mut handler) {
                return false;
            }
        }
        true
    }

    /// Collect every entry, one segment at a time.
    pub fn snapshot(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        let mut entries = Vec::new();
        for segment in self.segments.iter() {
            segment.iterate(&mut |k, v| {
                entries.push((k.clone(), v.clone()));
                true
            });
        }
        entries
    }
}

impl<K, V, S> fmt::Debug for ShardedMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedMap")
            .field("segments", &self.segments.len())
            .finish_non_exhaustive()
    }
}
