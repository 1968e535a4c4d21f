//! `cellar plan` - compute and print an install order for a set of packages.

use std::collections::VecDeque;
use std::path::PathBuf;

use cellar_parse::convert::package_depends;
use cellar_resolve::{depends, install_order, PackageGraph};
use cellar_store::{Store, StoreOptions, Value};
use indexmap::{IndexMap, IndexSet};

use crate::error::{CliError, Result};
use crate::schema;

pub struct PlanArgs {
    pub store_path: PathBuf,
    pub packages: Vec<String>,
    pub parallel: bool,
}

pub fn run_plan(args: PlanArgs) -> Result<()> {
    let mut options = StoreOptions::default();
    options.read_only = true;
    let store = Store::open(&args.store_path, options)?;
    let db = schema::open(&store);
    let universe: IndexMap<String, Value<'_>> = schema::all_packages(&db)?.into_iter().collect();

    for name in &args.packages {
        if !universe.contains_key(name) {
            return Err(CliError::UnknownPackage(name.clone()));
        }
    }

    let closure = dependency_closure(&universe, &args.packages);
    let graph = PackageGraph::build(closure.iter().filter_map(|name| universe.get(name).copied()));
    let batches = install_order(&graph)?;

    if args.parallel {
        for (i, batch) in batches.iter().enumerate() {
            println!("batch {i}: {}", batch.join(", "));
        }
    } else {
        for batch in &batches {
            for name in batch {
                println!("{name}");
            }
        }
    }

    Ok(())
}

/// Packages reachable from `roots` by following each `Depends` group's
/// first alternative present in `universe` -- the same selection
/// [`PackageGraph`] makes internally, computed here only to decide which
/// packages belong in the printed plan at all.
fn dependency_closure(universe: &IndexMap<String, Value<'_>>, roots: &[String]) -> IndexSet<String> {
    let mut seen = IndexSet::new();
    let mut queue: VecDeque<String> = roots.iter().cloned().collect();

    while let Some(name) = queue.pop_front() {
        if !seen.insert(name.clone()) {
            continue;
        }
        let Some(package) = universe.get(&name) else {
            continue;
        };
        let text = schema::blob_to_string(package_depends(*package));
        for alternatives in depends::parse(&text) {
            if let Some(chosen) = alternatives.into_iter().find(|alt| universe.contains_key(alt)) {
                queue.push_back(chosen);
            }
        }
    }

    seen
}
