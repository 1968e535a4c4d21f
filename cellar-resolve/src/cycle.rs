//! Cycle detection over a stuck dependency graph.

use indexmap::IndexMap;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    White,
    Gray,
    Black,
}

/// Finds one cycle among `candidates` -- packages [`crate::topo::install_order`]
/// could not reduce to zero remaining dependencies. Walks a depth-first
/// search with white/gray/black coloring (white: unvisited, gray: on the
/// current search path, black: fully explored) and reports the path from a
/// back edge's target to the node that closed it.
pub(crate) fn find_cycle(
    edges: &IndexMap<String, Vec<String>>,
    candidates: &[String],
) -> Option<Vec<String>> {
    let mut marks: IndexMap<String, Mark> = candidates
        .iter()
        .map(|name| (name.clone(), Mark::White))
        .collect();
    let mut stack: Vec<String> = Vec::new();

    for name in candidates {
        if marks.get(name) == Some(&Mark::White) {
            if let Some(cycle) = visit(name, edges, &mut marks, &mut stack) {
                return Some(cycle);
            }
        }
    }

    None
}

fn visit(
    node: &str,
    edges: &IndexMap<String, Vec<String>>,
    marks: &mut IndexMap<String, Mark>,
    stack: &mut Vec<String>,
) -> Option<Vec<String>> {
    marks.insert(node.to_string(), Mark::Gray);
    stack.push(node.to_string());

    if let Some(deps) = edges.get(node) {
        for dep in deps {
            match marks.get(dep.as_str()) {
                Some(Mark::Gray) => {
                    let start = stack
                        .iter()
                        .position(|n| n == dep)
                        .expect("a gray node is always on the active stack");
                    return Some(stack[start..].to_vec());
                },
                Some(Mark::White) => {
                    if let Some(cycle) = visit(dep, edges, marks, stack) {
                        return Some(cycle);
                    }
                },
                _ => {},
            }
        }
    }

    stack.pop();
    marks.insert(node.to_string(), Mark::Black);
    None
}
