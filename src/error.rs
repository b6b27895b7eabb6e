//! Construction-time configuration errors.
//!
//! Lookups, inserts and deletes never fail; only building a table or a
//! sharded map from an invalid configuration does.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// `initial_capacity` was zero; probing modulo zero is undefined.
    #[error("initial capacity must be positive")]
    ZeroCapacity,

    /// `concurrency_level` was zero; there is no segment to route to.
    #[error("concurrency level must be positive")]
    ZeroConcurrencyLevel,

    /// `max_load_factor` was below `MIN_MAX_LOAD_FACTOR` or not below 1.
    #[error("max load factor must be in [0.01, 1), got {0}")]
    InvalidLoadFactor(f64),

    /// `grow_factor` was below 2, so growing would not add any slots.
    #[error("grow factor must be at least 2, got {0}")]
    InvalidGrowFactor(usize),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
