use cellar_parse::convert::stanza_to_package;
use cellar_parse::{Lexer, StanzaParser};
use cellar_store::tab::Tab;
use cellar_store::{Store, StoreOptions, Value};
use cellar_util::diagnostic::Handler;

use crate::{install_order, PackageGraph, ResolveError};

fn build_graph<'s>(store: &'s Store, tab: &mut Tab<'s>, control: &str) -> PackageGraph<'s> {
    let mut handler = Handler::new();
    let lexer = Lexer::new(control, &mut handler);
    let stanzas = StanzaParser::new(lexer).parse_all();
    let packages: Vec<Value<'s>> = stanzas
        .iter()
        .map(|stanza| stanza_to_package(store, tab, stanza).unwrap())
        .collect();
    PackageGraph::build(packages)
}

#[test]
fn linear_chain_installs_leaf_first() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::create(dir.path().join("t.store"), StoreOptions::default()).unwrap();
    let mut tab = Tab::new(&store);

    let control = "Package: a\nDepends: b\n\nPackage: b\nDepends: c\n\nPackage: c\n";
    let graph = build_graph(&store, &mut tab, control);

    let batches = install_order(&graph).unwrap();
    assert_eq!(
        batches,
        vec![vec!["c".to_string()], vec!["b".to_string()], vec!["a".to_string()]]
    );
}

#[test]
fn independent_packages_batch_together() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::create(dir.path().join("t.store"), StoreOptions::default()).unwrap();
    let mut tab = Tab::new(&store);

    let control = "Package: a\n\nPackage: b\n\nPackage: c\n";
    let graph = build_graph(&store, &mut tab, control);

    let batches = install_order(&graph).unwrap();
    assert_eq!(batches.len(), 1);
    let mut names = batches[0].clone();
    names.sort();
    assert_eq!(names, vec!["a".to_string(), "b".to_string(), "c".to_string()]);
}

#[test]
fn first_present_alternative_is_chosen() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::create(dir.path().join("t.store"), StoreOptions::default()).unwrap();
    let mut tab = Tab::new(&store);

    let control = "Package: a\nDepends: missing | c\n\nPackage: c\n";
    let graph = build_graph(&store, &mut tab, control);

    let batches = install_order(&graph).unwrap();
    assert_eq!(batches, vec![vec!["c".to_string()], vec!["a".to_string()]]);
}

#[test]
fn dependency_outside_the_graph_is_dropped_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::create(dir.path().join("t.store"), StoreOptions::default()).unwrap();
    let mut tab = Tab::new(&store);

    let control = "Package: a\nDepends: does-not-exist\n";
    let graph = build_graph(&store, &mut tab, control);

    let batches = install_order(&graph).unwrap();
    assert_eq!(batches, vec![vec!["a".to_string()]]);
}

#[test]
fn direct_cycle_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::create(dir.path().join("t.store"), StoreOptions::default()).unwrap();
    let mut tab = Tab::new(&store);

    let control = "Package: a\nDepends: b\n\nPackage: b\nDepends: a\n";
    let graph = build_graph(&store, &mut tab, control);

    let err = install_order(&graph).unwrap_err();
    match err {
        ResolveError::Cycle(members) => {
            assert_eq!(members.len(), 2);
            assert!(members.contains(&"a".to_string()));
            assert!(members.contains(&"b".to_string()));
        },
    }
}

#[test]
fn a_cycle_does_not_block_packages_outside_it() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::create(dir.path().join("t.store"), StoreOptions::default()).unwrap();
    let mut tab = Tab::new(&store);

    let control = "Package: a\nDepends: b\n\nPackage: b\nDepends: a\n\nPackage: c\n";
    let graph = build_graph(&store, &mut tab, control);

    assert!(install_order(&graph).is_err());
    assert_eq!(graph.len(), 3);
    assert!(graph.contains("c"));
}

#[test]
fn graph_lookups_see_every_package() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::create(dir.path().join("t.store"), StoreOptions::default()).unwrap();
    let mut tab = Tab::new(&store);

    let control = "Package: a\nVersion: 1.0\n";
    let graph = build_graph(&store, &mut tab, control);

    assert_eq!(graph.len(), 1);
    assert!(graph.package("a").is_some());
    assert!(graph.package("missing").is_none());
}
