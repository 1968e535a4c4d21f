//! Error types for dependency resolution.

/// Errors computing an install order over a [`crate::graph::PackageGraph`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResolveError {
    /// No install order exists: following the listed packages' dependency
    /// edges in order leads back to the first one.
    #[error("dependency cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),
}
