//! Install ordering via Kahn's algorithm.

use indexmap::{IndexMap, IndexSet};

use crate::cycle;
use crate::error::ResolveError;
use crate::graph::PackageGraph;

/// Computes an install order for `graph`.
///
/// Each element of the returned vector is a batch of packages whose
/// dependencies are all satisfied by earlier batches (or have none at all):
/// a driver may install the members of one batch concurrently, but must
/// wait for the whole batch to finish before starting the next.
pub fn install_order(graph: &PackageGraph<'_>) -> Result<Vec<Vec<String>>, ResolveError> {
    let edges = graph.resolved_edges();

    let mut remaining: IndexMap<String, IndexSet<String>> = edges
        .iter()
        .map(|(name, deps)| (name.clone(), deps.iter().cloned().collect()))
        .collect();

    let mut dependents: IndexMap<String, Vec<String>> = IndexMap::new();
    for (name, deps) in &edges {
        for dep in deps {
            dependents.entry(dep.clone()).or_default().push(name.clone());
        }
    }

    let mut batches = Vec::new();
    let mut installed = 0usize;

    loop {
        let ready: Vec<String> = remaining
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(name, _)| name.clone())
            .collect();

        if ready.is_empty() {
            break;
        }

        for name in &ready {
            remaining.shift_remove(name);
        }
        for name in &ready {
            if let Some(waiting) = dependents.get(name) {
                for dependent in waiting {
                    if let Some(deps) = remaining.get_mut(dependent) {
                        deps.shift_remove(name);
                    }
                }
            }
        }

        installed += ready.len();
        batches.push(ready);
    }

    if installed < edges.len() {
        let stuck: Vec<String> = remaining.keys().cloned().collect();
        let cycle = cycle::find_cycle(&edges, &stuck).unwrap_or(stuck);
        return Err(ResolveError::Cycle(cycle));
    }

    Ok(batches)
}
