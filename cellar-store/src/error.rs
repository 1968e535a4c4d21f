//! Error Module - struct-store error types
//!
//! Defines all error types used by the store.

use thiserror::Error;

/// Main error type for all struct-store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a struct-store file")]
    NotAStore { path: String },

    #[error("{path} has format version {found}, this build understands version {expected}")]
    VersionMismatch {
        path: String,
        found: u32,
        expected: u32,
    },

    #[error("store reached its maximum size of {max} bytes while growing to {requested} bytes")]
    SizeLimit { requested: usize, max: usize },

    #[error("{path} is already locked by another process")]
    Locked { path: String },

    #[error("reference at word offset {offset} in object at {object:#x} does not point at a valid object header")]
    CorruptReference { object: usize, offset: i64 },

    #[error("tag {tag} is out of range 0..127")]
    InvalidTag { tag: u32 },

    #[error("object length {len} does not fit in the 24-bit length field")]
    Capacity { len: usize },

    #[error("too many delayed table/dictionary nodes during garbage collection (max {max})")]
    TooManyDelayed { max: usize },

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl StoreError {
    /// Whether the operation can reasonably be retried (e.g. after growing
    /// the reservation or freeing disk space), as opposed to indicating
    /// that the store file itself is unusable.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StoreError::SizeLimit { .. } | StoreError::Locked { .. })
    }
}

/// Result type alias for struct-store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
