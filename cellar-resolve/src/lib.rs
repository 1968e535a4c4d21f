//! cellar-resolve - dependency graph construction and install ordering
//!
//! Given a set of store-backed package records (produced by
//! [`cellar_parse::convert::stanza_to_package`]), [`PackageGraph`] builds a
//! dependency graph from each package's `Depends` field -- a list of
//! alternative groups, the first alternative present in the graph winning
//! each group -- and [`install_order`] computes an install order over it via
//! Kahn's algorithm, batched so a driver can install independent packages
//! concurrently. A dependency cycle is reported as [`ResolveError::Cycle`]
//! rather than silently broken.
//!
//! This crate does no I/O and performs no installation itself: it only
//! orders a set of package records a caller has already loaded.
//!
//! Non-goals: version-constraint solving (an alternative is chosen purely
//! by presence in the graph, not by comparing version ranges); anything
//! beyond a closed package set (a `Depends` entry naming a package outside
//! the graph is simply dropped from that group, not reported).

mod cycle;
pub mod depends;
pub mod error;
pub mod graph;
pub mod topo;

pub use error::ResolveError;
pub use graph::PackageGraph;
pub use topo::install_order;

#[cfg(test)]
mod tests;
