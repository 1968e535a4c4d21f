//! A small blocking HTTP(S) downloader.

use std::fs::File;
use std::path::Path;

use crate::checksum;
use crate::error::{FetchError, Result};
use crate::retry::RetryPolicy;

/// A blocking fetcher, matching the store's single-writer, synchronous
/// character -- there is no async runtime anywhere in this workspace.
pub struct Fetcher {
    client: reqwest::blocking::Client,
    retry: RetryPolicy,
}

impl Fetcher {
    /// Builds a fetcher with the default retry policy (3 attempts, 200ms
    /// base backoff) and a client that follows up to 10 redirects.
    pub fn new() -> Result<Fetcher> {
        Fetcher::with_retry_policy(RetryPolicy::default())
    }

    pub fn with_retry_policy(retry: RetryPolicy) -> Result<Fetcher> {
        let client = reqwest::blocking::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(FetchError::ClientBuild)?;
        Ok(Fetcher { client, retry })
    }

    /// Downloads `url` to `dest`, retrying transient failures with capped
    /// exponential backoff, then verifies `checksum` (a lowercase hex
    /// SHA-256 digest) against the downloaded file if one is given.
    ///
    /// A checksum mismatch is not retried: a changed response body on retry
    /// is a server-side problem this client can't fix by asking again.
    pub fn fetch(&self, url: &str, dest: &Path, expected_checksum: Option<&str>) -> Result<()> {
        self.retry.run(|| self.download_once(url, dest))?;

        if let Some(expected) = expected_checksum {
            checksum::verify(dest, expected)?;
        }

        tracing::info!(url, path = %dest.display(), "fetched package file");
        Ok(())
    }

    fn download_once(&self, url: &str, dest: &Path) -> Result<()> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|source| FetchError::Request { url: url.to_string(), source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url: url.to_string(), status });
        }

        let mut file = File::create(dest).map_err(|source| FetchError::Io {
            path: dest.display().to_string(),
            source,
        })?;

        let mut body = response;
        std::io::copy(&mut body, &mut file).map_err(|source| FetchError::Io {
            path: dest.display().to_string(),
            source,
        })?;

        Ok(())
    }
}
