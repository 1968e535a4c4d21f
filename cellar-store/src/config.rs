//! Configuration Module - store tuning parameters
//!
//! Manages the parameters that control how a [`crate::Store`] reserves
//! address space, grows its backing file, and decides when to collect.

/// Configuration for opening or creating a struct-store.
///
/// Most applications can use [`StoreOptions::default`] unchanged; the
/// defaults mirror the original struct-store's constants.
///
/// # Examples
///
/// ```
/// use cellar_store::StoreOptions;
///
/// let opts = StoreOptions {
///     gc_threshold_words: 1024,
///     ..Default::default()
/// };
/// assert!(opts.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Size, in bytes, of the virtual address reservation made with the
    /// initial anonymous-ish `mmap` call. The backing file is grown with
    /// `ftruncate` underneath this reservation as objects are allocated;
    /// the reservation itself never moves.
    ///
    /// Default: 512 MiB.
    pub max_size: usize,

    /// Granularity, in bytes, at which the backing file is grown. Every
    /// `ftruncate` rounds the requested size up to a multiple of this
    /// value so that growth doesn't happen on every single allocation.
    ///
    /// Default: 2 MiB.
    pub grow_chunk: usize,

    /// Number of words allocated since the last garbage collection above
    /// which [`crate::Store::maybe_gc`] decides to collect.
    ///
    /// Default: 5 MiB worth of words (1,310,720 words).
    pub gc_threshold_words: usize,

    /// Maximum number of tab/dict nodes that may be queued on the
    /// collector's delayed list during one garbage collection. Guards
    /// against unbounded memory use if a store somehow accumulates more
    /// weak structures than expected.
    ///
    /// Default: 1024.
    pub max_delayed: usize,

    /// Open the store read-only. Mutating operations return
    /// [`crate::StoreError::Locked`] on a read-only store.
    ///
    /// Default: `false`.
    pub read_only: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        StoreOptions {
            max_size: 512 * MB,
            grow_chunk: 2 * MB,
            gc_threshold_words: (5 * MB) / 4,
            max_delayed: 1024,
            read_only: false,
        }
    }
}

impl StoreOptions {
    /// Validate that the configured values are internally consistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_size == 0 {
            return Err(ConfigError::InvalidSize(
                "max_size must be > 0".to_string(),
            ));
        }
        if self.grow_chunk == 0 || self.grow_chunk > self.max_size {
            return Err(ConfigError::InvalidSize(
                "grow_chunk must be > 0 and <= max_size".to_string(),
            ));
        }
        if self.gc_threshold_words == 0 {
            return Err(ConfigError::InvalidThreshold(
                "gc_threshold_words must be > 0".to_string(),
            ));
        }
        if self.max_delayed == 0 {
            return Err(ConfigError::InvalidThreshold(
                "max_delayed must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Error type for [`StoreOptions::validate`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid size: {0}")]
    InvalidSize(String),

    #[error("invalid threshold: {0}")]
    InvalidThreshold(String),
}

const MB: usize = 1024 * 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let opts = StoreOptions::default();
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn zero_max_size_is_invalid() {
        let opts = StoreOptions {
            max_size: 0,
            ..Default::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn grow_chunk_larger_than_max_size_is_invalid() {
        let opts = StoreOptions {
            max_size: 1024,
            grow_chunk: 2048,
            ..Default::default()
        };
        assert!(opts.validate().is_err());
    }
}
