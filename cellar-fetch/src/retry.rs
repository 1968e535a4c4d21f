//! Capped exponential backoff for transient fetch failures.

use std::thread::sleep;
use std::time::Duration;

use crate::error::{FetchError, Result};

/// Retry parameters: up to `count` attempts total, waiting `base * 2^n`
/// between attempt `n` and `n + 1`. Not configurable beyond construction in
/// this version -- a caller who needs different parameters builds its own
/// `RetryPolicy`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub count: u32,
    pub base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy { count: 3, base: Duration::from_millis(200) }
    }
}

impl RetryPolicy {
    /// Runs `attempt`, retrying up to `self.count - 1` more times on a
    /// transient error ([`FetchError::is_transient`]), sleeping for capped
    /// exponential backoff between tries. Returns the last error if every
    /// attempt is exhausted, or the first non-transient error immediately.
    pub fn run<T>(&self, mut attempt: impl FnMut() -> Result<T>) -> Result<T> {
        let mut last_err = None;

        for n in 0..self.count {
            match attempt() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && n + 1 < self.count => {
                    let delay = self.base * 2u32.pow(n);
                    tracing::warn!(attempt = n + 1, ?delay, error = %err, "retrying transient fetch failure");
                    sleep(delay);
                    last_err = Some(err);
                },
                Err(err) => return Err(err),
            }
        }

        Err(last_err.expect("loop runs at least once since count >= 1"))
    }
}
