//! `cellar import` - parse a control file and merge its packages into a
//! store's package dictionary.

use std::path::PathBuf;

use cellar_parse::convert::{package_name, stanza_to_package};
use cellar_parse::{Lexer, StanzaParser};
use cellar_store::{Store, StoreOptions};
use cellar_util::diagnostic::Handler;

use crate::error::{CliError, Result};
use crate::schema;

pub struct ImportArgs {
    pub control_file: PathBuf,
    pub store_path: PathBuf,
    pub store_options: StoreOptions,
}

pub fn run_import(args: ImportArgs) -> Result<()> {
    let source = std::fs::read_to_string(&args.control_file)?;

    let mut handler = Handler::new();
    let lexer = Lexer::new(&source, &mut handler);
    let stanzas = StanzaParser::new(lexer).parse_all();

    if handler.has_errors() {
        for diagnostic in handler.diagnostics() {
            tracing::error!("{}", diagnostic.message);
        }
        return Err(CliError::ControlFileInvalid(
            args.control_file.display().to_string(),
        ));
    }

    let store = if args.store_path.exists() {
        Store::open(&args.store_path, args.store_options)?
    } else {
        Store::create(&args.store_path, args.store_options)?
    };

    let mut db = schema::open(&store);
    let mut imported = 0usize;
    for stanza in &stanzas {
        let package = stanza_to_package(&store, &mut db.tab, stanza)?;
        db.packages.set(package_name(package), package)?;
        imported += 1;
    }

    schema::commit(&store, db)?;
    tracing::info!(store = %args.store_path.display(), imported, "imported packages");
    println!(
        "imported {imported} package(s) from {} into {}",
        args.control_file.display(),
        args.store_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imports_a_minimal_control_file() {
        let dir = tempfile::tempdir().unwrap();
        let control_path = dir.path().join("control");
        std::fs::write(&control_path, "Package: curl\nVersion: 8.5.0-2\nDepends: libc6\n").unwrap();
        let store_path = dir.path().join("t.store");

        run_import(ImportArgs {
            control_file: control_path,
            store_path: store_path.clone(),
            store_options: StoreOptions::default(),
        })
        .unwrap();

        let store = Store::open(&store_path, StoreOptions::default()).unwrap();
        let db = schema::open(&store);
        let packages = schema::all_packages(&db).unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].0, "curl");
    }

    #[test]
    fn importing_twice_merges_rather_than_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let control_path = dir.path().join("control");
        std::fs::write(&control_path, "Package: curl\nVersion: 1.0\n").unwrap();
        let store_path = dir.path().join("t.store");

        for _ in 0..2 {
            run_import(ImportArgs {
                control_file: control_path.clone(),
                store_path: store_path.clone(),
                store_options: StoreOptions::default(),
            })
            .unwrap();
        }

        let store = Store::open(&store_path, StoreOptions::default()).unwrap();
        let db = schema::open(&store);
        assert_eq!(schema::all_packages(&db).unwrap().len(), 1);
    }

    #[test]
    fn a_malformed_control_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let control_path = dir.path().join("control");
        std::fs::write(&control_path, ": missing field name\n").unwrap();
        let store_path = dir.path().join("t.store");

        let result = run_import(ImportArgs {
            control_file: control_path,
            store_path,
            store_options: StoreOptions::default(),
        });
        assert!(result.is_err());
    }
}
