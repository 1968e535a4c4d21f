//! `cellar gc` - run or conditionally run garbage collection on a store.

use std::path::PathBuf;

use cellar_store::{Store, StoreOptions};

use crate::error::Result;

pub struct GcArgs {
    pub store_path: PathBuf,
    pub force: bool,
    pub store_options: StoreOptions,
}

pub fn run_gc(args: GcArgs) -> Result<()> {
    let store = Store::open(&args.store_path, args.store_options)?;
    let before = store.len_words();

    let store = if args.force { store.gc()? } else { store.maybe_gc()? };

    let after = store.len_words();
    tracing::info!(before, after, forced = args.force, "garbage collection complete");
    println!("{} words -> {} words", before, after);
    Ok(())
}
