//! `cellar fetch` - download a file, verifying its checksum if one is given.

use std::path::PathBuf;

use cellar_fetch::{Fetcher, RetryPolicy};

use crate::error::Result;

pub struct FetchArgs {
    pub url: String,
    pub dest: PathBuf,
    pub checksum: Option<String>,
    pub retry: RetryPolicy,
}

pub fn run_fetch(args: FetchArgs) -> Result<()> {
    let fetcher = Fetcher::with_retry_policy(args.retry)?;
    fetcher.fetch(&args.url, &args.dest, args.checksum.as_deref())?;
    println!("fetched {} -> {}", args.url, args.dest.display());
    Ok(())
}
