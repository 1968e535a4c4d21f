//! cellar-fetch - a small blocking HTTP(S) downloader
//!
//! [`Fetcher`] downloads a package index or archive to a local path over
//! HTTP(S), retrying transient failures (connection resets, 5xx responses)
//! with capped exponential backoff, and verifies a caller-supplied SHA-256
//! checksum against the downloaded file when one is given.
//!
//! Built on `reqwest`'s blocking client rather than its async one: nothing
//! else in this workspace runs an async runtime, and a struct-store itself
//! only ever has one writer at a time, so a fetch has no concurrency to
//! overlap with.
//!
//! Non-goals: parallel or multiplexed downloads, resumable downloads,
//! mirror selection.

pub mod checksum;
pub mod client;
pub mod error;
pub mod retry;

pub use client::Fetcher;
pub use error::{FetchError, Result};
pub use retry::RetryPolicy;
