//! The CLI's own layout of a store's root value.
//!
//! `cellar-store` has no opinion on what a store's root points at; this
//! module is where the `cellar` binary decides. The root is a two-field
//! record: an intern table (deduplicating package name/version/depends
//! strings, written through by [`cellar_parse::convert::stanza_to_package`])
//! and a strong dictionary from package name to package record.

use cellar_store::dict::{Dict, DictKind};
use cellar_store::tab::Tab;
use cellar_store::{Store, Value};

/// Generic record tag for the root value itself. Outside both the
/// collector-reserved range (0x77..=0x7F) and the counted-tag range
/// (64..80) that package records use.
const ROOT_TAG: u8 = 1;

const FIELD_TAB: usize = 0;
const FIELD_PACKAGES: usize = 1;

/// A store's package database, opened over its current root (or a fresh,
/// empty one if the store has no root yet).
pub struct Db<'s> {
    pub tab: Tab<'s>,
    pub packages: Dict<'s>,
}

/// Opens the database rooted at `store`'s current root.
pub fn open(store: &Store) -> Db<'_> {
    let root = store.root();
    if root.is_null() {
        Db {
            tab: Tab::new(store),
            packages: Dict::new(store, DictKind::Strong),
        }
    } else {
        Db {
            tab: Tab::open(store, root.field(FIELD_TAB)),
            packages: Dict::open(store, DictKind::Strong, root.field(FIELD_PACKAGES)),
        }
    }
}

/// Materializes `db`'s tab and package dictionary and writes their final
/// roots into a fresh root record, committed as the store's new root.
/// Consumes `db`: there is nothing left to do with it once it's committed.
pub fn commit<'s>(store: &'s Store, db: Db<'s>) -> cellar_store::Result<()> {
    let tab_root = db.tab.finish()?;
    let packages_root = db.packages.finish()?;
    let record = store.new_record(ROOT_TAG, &[tab_root, packages_root])?;
    store.set_root(record)
}

/// Reads every package name -> package record pair currently committed.
pub fn all_packages<'s>(db: &Db<'s>) -> cellar_store::Result<Vec<(String, Value<'s>)>> {
    Ok(db
        .packages
        .entries()?
        .map(|(name, pkg)| (blob_to_string(name), pkg))
        .collect())
}

pub fn blob_to_string(value: Value<'_>) -> String {
    String::from_utf8_lossy(value.blob_bytes()).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellar_store::object::Unstored;
    use cellar_store::StoreOptions;

    #[test]
    fn opening_a_fresh_store_yields_an_empty_database() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::create(dir.path().join("t.store"), StoreOptions::default()).unwrap();
        let db = open(&store);
        assert_eq!(all_packages(&db).unwrap().len(), 0);
    }

    #[test]
    fn committed_packages_survive_a_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.store");
        {
            let store = Store::create(&path, StoreOptions::default()).unwrap();
            let mut db = open(&store);
            let name = db.tab.intern(&Unstored::string("curl")).unwrap();
            let pkg = store.store(&Unstored::string("curl package data")).unwrap();
            db.packages.set(name, pkg).unwrap();
            commit(&store, db).unwrap();
        }
        let store = Store::open(&path, StoreOptions::default()).unwrap();
        let db = open(&store);
        let packages = all_packages(&db).unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].0, "curl");
    }
}
