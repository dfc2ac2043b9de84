//! Traversal and filtering shared by the builders.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::{DirectedGraph, EdgeKind};

/// Shortest distance of every node from a set of roots, walking edges in
/// the given direction.
///
/// Roots are nodes with no edge arriving from another node. Nodes left
/// unreached (members of pure cycles) seed further walks at depth 0, in id
/// order, so every node gets a depth and the result never depends on the
/// limit later applied to it.
pub(crate) fn depths(graph: &DirectedGraph, kind: EdgeKind, reversed: bool) -> BTreeMap<String, usize> {
    let mut adjacency: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    let mut has_incoming: BTreeSet<&str> = BTreeSet::new();
    for edge in graph.edges().filter(|e| e.kind == kind) {
        let (from, to) = if reversed {
            (edge.target.as_str(), edge.source.as_str())
        } else {
            (edge.source.as_str(), edge.target.as_str())
        };
        adjacency.entry(from).or_default().push(to);
        if from != to {
            has_incoming.insert(to);
        }
    }

    let roots: Vec<&str> = graph
        .nodes()
        .map(|n| n.id.as_str())
        .filter(|id| !has_incoming.contains(id))
        .collect();
    let mut result = bfs(&roots, &adjacency, BTreeMap::new());
    for node in graph.nodes() {
        if !result.contains_key(&node.id) {
            result = bfs(&[node.id.as_str()], &adjacency, result);
        }
    }
    result
}

/// Multi-source BFS from `roots` at depth 0, skipping nodes already in
/// `seen`.
pub(crate) fn bfs(
    roots: &[&str],
    adjacency: &BTreeMap<&str, Vec<&str>>,
    mut seen: BTreeMap<String, usize>,
) -> BTreeMap<String, usize> {
    let mut queue = VecDeque::new();
    for root in roots {
        if !seen.contains_key(*root) {
            seen.insert(root.to_string(), 0);
            queue.push_back((*root, 0));
        }
    }
    while let Some((id, depth)) = queue.pop_front() {
        for next in adjacency.get(id).into_iter().flatten() {
            if !seen.contains_key(*next) {
                seen.insert(next.to_string(), depth + 1);
                queue.push_back((*next, depth + 1));
            }
        }
    }
    seen
}

/// Record depths on nodes and drop nodes beyond `limit` with their edges.
pub(crate) fn apply_depths(
    graph: &mut DirectedGraph,
    depths: &BTreeMap<String, usize>,
    limit: Option<usize>,
) {
    for (id, depth) in depths {
        if let Some(node) = graph.node_mut(id) {
            node.depth = Some(*depth);
        }
    }
    if let Some(limit) = limit {
        graph.retain_nodes(|n| n.depth.map_or(true, |d| d <= limit));
    }
}

/// Whether a simple name is private by the leading-underscore convention.
pub(crate) fn is_private_name(name: &str) -> bool {
    name.starts_with('_')
}

/// Whether any segment of a dotted module or package name is private.
pub(crate) fn is_private_module(dotted: &str) -> bool {
    dotted.split('.').any(is_private_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphKind, Node, NodeKind};

    fn chain(ids: &[&str], edges: &[(&str, &str)]) -> DirectedGraph {
        let mut g = DirectedGraph::new(GraphKind::CallGraph);
        for id in ids {
            g.add_node(Node::new(*id, *id, NodeKind::Function));
        }
        for (s, t) in edges {
            g.add_edge(s, t, EdgeKind::Calls);
        }
        g
    }

    #[test]
    fn depths_from_roots() {
        let g = chain(&["a", "b", "c", "d"], &[("a", "b"), ("b", "c"), ("a", "c")]);
        let d = depths(&g, EdgeKind::Calls, false);
        assert_eq!(d["a"], 0);
        assert_eq!(d["b"], 1);
        assert_eq!(d["c"], 1);
        assert_eq!(d["d"], 0);
    }

    #[test]
    fn reversed_walk() {
        // child -> parent edges, depth measured from the top parent
        let g = chain(&["base", "mid", "leaf"], &[("mid", "base"), ("leaf", "mid")]);
        let d = depths(&g, EdgeKind::Calls, true);
        assert_eq!(d["base"], 0);
        assert_eq!(d["mid"], 1);
        assert_eq!(d["leaf"], 2);
    }

    #[test]
    fn pure_cycle_is_seeded_in_id_order() {
        let g = chain(&["x", "y", "z"], &[("x", "y"), ("y", "z"), ("z", "x")]);
        let d = depths(&g, EdgeKind::Calls, false);
        assert_eq!(d["x"], 0);
        assert_eq!(d["y"], 1);
        assert_eq!(d["z"], 2);
    }

    #[test]
    fn self_loop_does_not_hide_root() {
        let g = chain(&["r", "s"], &[("r", "r"), ("r", "s")]);
        let d = depths(&g, EdgeKind::Calls, false);
        assert_eq!(d["r"], 0);
        assert_eq!(d["s"], 1);
    }

    #[test]
    fn limit_drops_deep_nodes_and_edges() {
        let mut g = chain(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let d = depths(&g, EdgeKind::Calls, false);
        apply_depths(&mut g, &d, Some(1));
        assert_eq!(g.node_ids(), BTreeSet::from(["a", "b"]));
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.node("b").unwrap().depth, Some(1));
    }
}
