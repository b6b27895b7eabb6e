//! Construction options for tables and sharded maps.
//!
//! Both config types are plain values: every `default()` call builds a
//! fresh one, so no two instances ever share mutable defaults. Validation
//! happens in the constructor that consumes the config.

use crate::error::{ConfigError, Result};
use crate::guarded_table::GuardedTable;
use crate::storage::Segment;
use core::fmt;
use core::hash::Hash;

pub const DEFAULT_INITIAL_CAPACITY: usize = 16;
pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.75;
pub const DEFAULT_GROW_FACTOR: usize = 2;
pub const DEFAULT_CONCURRENCY_LEVEL: usize = 16;
/// Smallest accepted `max_load_factor`: at most 100 slots per live entry.
/// Anything lower makes the first insert allocate absurd capacities.
pub const MIN_MAX_LOAD_FACTOR: f64 = 0.01;

/// Growth parameters for a [`Table`](crate::Table).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    pub(crate) initial_capacity: usize,
    pub(crate) max_load_factor: f64,
    pub(crate) grow_factor: usize,
}

impl TableConfig {
    pub fn new() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            grow_factor: DEFAULT_GROW_FACTOR,
        }
    }

    /// Starting slot count. Must be positive.
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Occupancy ratio above which an insert grows the table. Must lie in
    /// `[MIN_MAX_LOAD_FACTOR, 1)`: below 1 so that at least one slot always
    /// stays empty, and not so small that a handful of entries demands a
    /// huge slot array.
    pub fn with_max_load_factor(mut self, max_load_factor: f64) -> Self {
        self.max_load_factor = max_load_factor;
        self
    }

    /// Capacity multiplier applied on each growth step. Must be at least 2.
    pub fn with_grow_factor(mut self, grow_factor: usize) -> Self {
        self.grow_factor = grow_factor;
        self
    }

    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }
    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }
    pub fn grow_factor(&self) -> usize {
        self.grow_factor
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.initial_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        // Written so that NaN is rejected as well.
        if !(self.max_load_factor >= MIN_MAX_LOAD_FACTOR && self.max_load_factor < 1.0) {
            return Err(ConfigError::InvalidLoadFactor(self.max_load_factor));
        }
        if self.grow_factor < 2 {
            return Err(ConfigError::InvalidGrowFactor(self.grow_factor));
        }
        Ok(())
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds one segment of a [`ShardedMap`](crate::ShardedMap). Called once
/// per segment at construction time.
pub type SegmentFactory<K, V> = Box<dyn Fn() -> Box<dyn Segment<K, V>> + Send + Sync>;

/// Segment count and segment constructor for a
/// [`ShardedMap`](crate::ShardedMap).
pub struct ShardedConfig<K, V> {
    pub(crate) concurrency_level: usize,
    pub(crate) segment_factory: SegmentFactory<K, V>,
}

impl<K, V> ShardedConfig<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Default config: 16 segments, each a `GuardedTable` over a fresh
    /// default-configured `Table`.
    pub fn new() -> Self {
        Self {
            concurrency_level: DEFAULT_CONCURRENCY_LEVEL,
            segment_factory: Box::new(|| -> Box<dyn Segment<K, V>> {
                Box::new(GuardedTable::<K, V>::new())
            }),
        }
    }
}

impl<K, V> ShardedConfig<K, V> {
    /// Number of segments. Must be positive.
    pub fn with_concurrency_level(mut self, concurrency_level: usize) -> Self {
        self.concurrency_level = concurrency_level;
        self
    }

    pub fn with_segment_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Segment<K, V>> + Send + Sync + 'static,
    {
        self.segment_factory = Box::new(factory);
        self
    }

    pub fn concurrency_level(&self) -> usize {
        self.concurrency_level
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.concurrency_level == 0 {
            return Err(ConfigError::ZeroConcurrencyLevel);
        }
        Ok(())
    }
}

impl<K, V> Default for ShardedConfig<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for ShardedConfig<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedConfig")
            .field("concurrency_level", &self.concurrency_level)
            .finish_non_exhaustive()
    }
}
