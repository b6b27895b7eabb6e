//! Table: single-threaded open-addressing map with linear probing.
//!
//! Every entry stores the hash computed when it was inserted; probing,
//! growth and deletion only ever use the stored hash, so `K: Hash` runs
//! once per `set` and once per lookup, never during a grow.
//!
//! Deletion uses backward shifting instead of tombstones: after a slot is
//! cleared, later entries of the same cluster are moved back into the hole
//! when their home slot does not lie between the hole and their current
//! position. Every remaining key stays reachable from its home slot.

use crate::config::TableConfig;
use crate::error::Result;
use crate::storage::Storage;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::mem;
use log::trace;
use rand::seq::SliceRandom;
use std::collections::hash_map::RandomState;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
}

pub struct Table<K, V, S = RandomState> {
    hasher: S,
    slots: Box<[Option<Entry<K, V>>]>,
    len: usize,
    max_load_factor: f64,
    grow_factor: usize,
}

impl<K, V> Table<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::from_config(TableConfig::new(), RandomState::new())
    }

    /// Build a table from `config`; fails on a zero capacity or on growth
    /// parameters that could let the table fill up.
    pub fn with_config(config: TableConfig) -> Result<Self> {
        Self::with_config_and_hasher(config, RandomState::new())
    }
}

impl<K, V> Default for Table<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> Table<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_config_and_hasher(config: TableConfig, hasher: S) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_config(config, hasher))
    }

    fn from_config(config: TableConfig, hasher: S) -> Self {
        Self {
            hasher,
            slots: empty_slots(config.initial_capacity),
            len: 0,
            max_load_factor: config.max_load_factor,
            grow_factor: config.grow_factor,
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    fn home(&self, hash: u64) -> usize {
        (hash % self.slots.len() as u64) as usize
    }

    /// Index of the slot holding `q`, or of the first empty slot on its
    /// probe path. Terminates because the load factor keeps at least one
    /// slot empty.
    fn probe<Q>(&self, hash: u64, q: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let capacity = self.slots.len();
        let mut index = self.home(hash);
        loop {
            match &self.slots[index] {
                None => return index,
                Some(e) if e.hash == hash && e.key.borrow() == q => return index,
                Some(_) => index = (index + 1) % capacity,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.slots.len() as f64
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        let index = self.probe(hash, q);
        self.slots[index].as_ref().map(|e| &e.value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(q).is_some()
    }

    /// Insert `key -> value`, or overwrite the value of an existing key and
    /// return the old one. A new entry may grow the table before returning.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.make_hash(&key);
        let index = self.probe(hash, &key);
        if let Some(entry) = self.slots[index].as_mut() {
            return Some(mem::replace(&mut entry.value, value));
        }
        self.slots[index] = Some(Entry { key, value, hash });
        self.len += 1;
        while self.load_factor() > self.max_load_factor {
            self.grow();
        }
        None
    }

    /// Remove `q`; returns `true` if it was present.
    pub fn delete<Q>(&mut self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        let index = self.probe(hash, q);
        if self.slots[index].take().is_none() {
            return false;
        }
        self.len -= 1;
        self.close_hole(index);
        true
    }

    fn close_hole(&mut self, mut hole: usize) {
        let capacity = self.slots.len();
        let mut next = (hole + 1) % capacity;
        while let Some(entry) = &self.slots[next] {
            let home = self.home(entry.hash);
            // An entry whose home lies in (hole, next] is already reachable.
            if !cyclic_between(home, hole, next) {
                self.slots[hole] = self.slots[next].take();
                hole = next;
            }
            next = (next + 1) % capacity;
        }
    }

    fn grow(&mut self) {
        let old_capacity = self.slots.len();
        let new_capacity = grown_capacity(old_capacity, self.grow_factor);
        let mut slots = empty_slots(new_capacity);
        let old = mem::take(&mut self.slots);
        for entry in old.into_vec().into_iter().flatten() {
            place(&mut slots, entry);
        }
        self.slots = slots;
        trace!(
            "table grew from {} to {} slots ({} live entries)",
            old_capacity,
            new_capacity,
            self.len
        );
    }

    /// Slot positions `0..capacity` in a uniformly random order.
    pub fn shuffled_positions(&self) -> Vec<usize> {
        let mut positions: Vec<usize> = (0..self.slots.len()).collect();
        positions.shuffle(&mut rand::thread_rng());
        positions
    }

    pub fn entry_at(&self, position: usize) -> Option<(&K, &V)> {
        self.slots
            .get(position)?
            .as_ref()
            .map(|e| (&e.key, &e.value))
    }

    /// Visit live entries in a random permutation of slot positions. Stops
    /// as soon as `handler` returns `false` and reports `false`; reports
    /// `true` after visiting everything.
    pub fn iterate<F>(&self, mut handler: F) -> bool
    where
        F: FnMut(&K, &V) -> bool,
    {
        for position in self.shuffled_positions() {
            if let Some((key, value)) = self.entry_at(position) {
                if !handler(key, value) {
                    return false;
                }
            }
        }
        true
    }

    /// Entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.slots
            .iter()
            .filter_map(|s| s.as_ref().map(|e| (&e.key, &e.value)))
    }
}

impl<K, V, S> Storage<K, V> for Table<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn get(&self, key: &K) -> Option<&V> {
        Table::get(self, key)
    }
    fn set(&mut self, key: K, value: V) -> Option<V> {
        Table::set(self, key, value)
    }
    fn delete(&mut self, key: &K) -> bool {
        Table::delete(self, key)
    }
    fn len(&self) -> usize {
        self.len
    }
    fn capacity(&self) -> usize {
        self.slots.len()
    }
    fn shuffled_positions(&self) -> Vec<usize> {
        Table::shuffled_positions(self)
    }
    fn entry_at(&self, position: usize) -> Option<(&K, &V)> {
        Table::entry_at(self, position)
    }
}

/// Capacity after one growth step. Panics on overflow like the std
/// collections do; repeating a saturated step would never add a slot.
fn grown_capacity(capacity: usize, grow_factor: usize) -> usize {
    match capacity.checked_mul(grow_factor) {
        Some(grown) => grown,
        None => panic!("capacity overflow"),
    }
}

fn empty_slots<K, V>(capacity: usize) -> Box<[Option<Entry<K, V>>]> {
    core::iter::repeat_with(|| None).take(capacity).collect()
}

// Keys are unique during a grow, so only an empty slot is searched for.
fn place<K, V>(slots: &mut [Option<Entry<K, V>>], entry: Entry<K, V>) {
    let capacity = slots.len();
    let mut index = (entry.hash % capacity as u64) as usize;
    while slots[index].is_some() {
        index = (index + 1) % capacity;
    }
    slots[index] = Some(entry);
}

/// Whether `x` lies in the cyclic interval `(lo, hi]`.
fn cyclic_between(x: usize, lo: usize, hi: usize) -> bool {
    if lo <= hi {
        lo < x && x <= hi
    } else {
        lo < x || x <= hi
    }
}
