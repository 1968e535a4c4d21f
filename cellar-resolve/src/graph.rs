//! The dependency graph built over a set of store-backed package records.

use cellar_parse::convert::{package_depends, package_name};
use cellar_store::Value;
use indexmap::IndexMap;

use crate::depends;

/// A package dependency graph: nodes are package names, edges are the
/// dependency chosen from each `Depends` alternative group.
///
/// Built from an `IndexMap` rather than a `HashMap` so iteration (and thus
/// the install batches computed over it) is deterministic and matches
/// insertion order across runs of the same package set.
pub struct PackageGraph<'s> {
    packages: IndexMap<String, Value<'s>>,
}

impl<'s> PackageGraph<'s> {
    /// Builds a graph over `packages` (as produced by
    /// [`cellar_parse::convert::stanza_to_package`]). Later entries with a
    /// name already seen overwrite earlier ones.
    pub fn build(packages: impl IntoIterator<Item = Value<'s>>) -> Self {
        let packages = packages
            .into_iter()
            .map(|pkg| (value_str(package_name(pkg)), pkg))
            .collect();
        Self { packages }
    }

    /// Number of packages in the graph.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    /// The stored record for `name`, if it's part of this graph.
    pub fn package(&self, name: &str) -> Option<Value<'s>> {
        self.packages.get(name).copied()
    }

    /// Package names, in the order they were added.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    /// For each package, the dependency chosen from each `Depends`
    /// alternative group: the first alternative that names a package
    /// present in this graph. A group with no alternative present in the
    /// graph is dropped rather than reported as an error -- this graph only
    /// resolves within its own closed package set, the way a single
    /// `Packages` file does.
    pub(crate) fn resolved_edges(&self) -> IndexMap<String, Vec<String>> {
        self.packages
            .iter()
            .map(|(name, pkg)| {
                let text = value_str(package_depends(*pkg));
                let chosen = depends::parse(&text)
                    .into_iter()
                    .filter_map(|alternatives| {
                        alternatives
                            .into_iter()
                            .find(|alt| self.packages.contains_key(alt))
                    })
                    .collect();
                (name.clone(), chosen)
            })
            .collect()
    }
}

fn value_str(v: Value<'_>) -> String {
    String::from_utf8_lossy(v.blob_bytes()).into_owned()
}
