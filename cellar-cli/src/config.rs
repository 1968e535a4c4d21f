//! Configuration module for the cellar CLI.
//!
//! Settings are layered with the `config` crate: built-in defaults, then
//! `cellar.toml` (or whatever path `--config`/`CELLAR_CONFIG` names) if it
//! exists. A missing config file is not an error -- the defaults alone are
//! a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};

/// Default configuration file name, searched for in the current directory.
pub const CONFIG_FILE_NAME: &str = "cellar.toml";

/// Top-level CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Default store path used when a subcommand's `<store-path>` is
    /// omitted. Subcommands in this version always take the path
    /// explicitly, but the field exists for parity with a future
    /// `cellar.toml`-driven default.
    #[serde(default = "default_store_path")]
    pub store_path: String,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub gc: GcConfig,
}

/// `cellar-fetch` tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchConfig {
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,
}

/// Garbage-collection tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GcConfig {
    #[serde(default = "default_gc_threshold_words")]
    pub threshold_words: usize,
}

fn default_store_path() -> String {
    "cellar.store".to_string()
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_ms() -> u64 {
    200
}

fn default_gc_threshold_words() -> usize {
    cellar_store::StoreOptions::default().gc_threshold_words
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store_path: default_store_path(),
            fetch: FetchConfig::default(),
            gc: GcConfig::default(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            retry_count: default_retry_count(),
            retry_base_ms: default_retry_base_ms(),
        }
    }
}

impl Default for GcConfig {
    fn default() -> Self {
        GcConfig {
            threshold_words: default_gc_threshold_words(),
        }
    }
}

impl Config {
    /// Load configuration from `path` if given, the default location
    /// (`./cellar.toml`) otherwise, falling back to built-in defaults when
    /// neither exists.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let default = Path::new(CONFIG_FILE_NAME);
                default.exists().then(|| default.to_path_buf())
            },
        };

        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default()).map_err(|e| {
                CliError::Config(format!("failed to seed defaults: {e}"))
            })?);

        if let Some(path) = &path {
            builder = builder.add_source(config::File::from(path.as_path()));
        }

        let loaded = builder
            .build()
            .map_err(|e| CliError::Config(format!("failed to load configuration: {e}")))?;

        loaded
            .try_deserialize()
            .map_err(|e| CliError::Config(format!("failed to parse configuration: {e}")))
    }

    pub fn retry_policy(&self) -> cellar_fetch::RetryPolicy {
        cellar_fetch::RetryPolicy {
            count: self.fetch.retry_count,
            base: std::time::Duration::from_millis(self.fetch.retry_base_ms),
        }
    }

    pub fn store_options(&self) -> cellar_store::StoreOptions {
        cellar_store::StoreOptions {
            gc_threshold_words: self.gc.threshold_words,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_sensible_values() {
        let config = Config::default();
        assert_eq!(config.store_path, "cellar.store");
        assert_eq!(config.fetch.retry_count, 3);
        assert_eq!(config.fetch.retry_base_ms, 200);
        assert!(config.gc.threshold_words > 0);
    }

    #[test]
    fn loading_a_nonexistent_default_path_yields_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cellar.toml");
        std::fs::write(&path, "store_path = \"/tmp/other.store\"\n[fetch]\nretry_count = 5\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.store_path, "/tmp/other.store");
        assert_eq!(config.fetch.retry_count, 5);
        assert_eq!(config.fetch.retry_base_ms, 200);
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let result = Config::load(Some(Path::new("/nonexistent/cellar.toml")));
        assert!(result.is_err());
    }
}
