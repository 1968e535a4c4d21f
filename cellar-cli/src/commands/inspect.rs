//! `cellar inspect` - print header fields for debugging.

use std::path::PathBuf;

use cellar_store::{Store, StoreOptions};

use crate::error::Result;

pub struct InspectArgs {
    pub store_path: PathBuf,
}

const APPLICATION_TAGS: &[(u8, &str)] = &[(cellar_parse::convert::PACKAGE_TAG, "package")];

pub fn run_inspect(args: InspectArgs) -> Result<()> {
    let mut options = StoreOptions::default();
    options.read_only = true;
    let store = Store::open(&args.store_path, options)?;

    println!("path: {}", args.store_path.display());
    println!("root kind: {}", store.root_kind());
    println!("length (words): {}", store.len_words());
    println!("allocated since last gc (words): {}", store.words_allocated_since_gc());
    for (tag, label) in APPLICATION_TAGS {
        println!("tag {tag} ({label}) count: {}", store.tag_count(*tag));
    }

    Ok(())
}
