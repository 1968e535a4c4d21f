//! Error handling module for the cellar CLI.

use thiserror::Error;

/// Top-level error type for the `cellar` binary. Wraps every error kind the
/// surrounding crates can produce, plus a handful the CLI itself raises.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] cellar_store::StoreError),

    #[error(transparent)]
    Convert(#[from] cellar_parse::convert::ConvertError),

    #[error(transparent)]
    Resolve(#[from] cellar_resolve::ResolveError),

    #[error(transparent)]
    Fetch(#[from] cellar_fetch::FetchError),

    #[error("{0} has parse errors, see diagnostics above")]
    ControlFileInvalid(String),

    #[error("unknown package: {0}")]
    UnknownPackage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`CliError`].
pub type Result<T> = std::result::Result<T, CliError>;
