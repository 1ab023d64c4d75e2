//! Forward/inverse BFS over a built call graph.

use std::collections::VecDeque;

use dexopt_core::types::collections::FxHashSet;

use super::types::{Graph, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Inverse,
}

/// All nodes reachable from `start` along successor edges, `start`
/// excluded. `max_depth` bounds the search; `None` walks the whole graph.
pub fn reachable_forward(
    graph: &Graph,
    start: NodeId,
    max_depth: Option<u32>,
) -> FxHashSet<NodeId> {
    bfs(graph, start, Direction::Forward, max_depth)
}

/// All nodes that can reach `start` along successor edges, `start`
/// excluded.
pub fn reachable_inverse(
    graph: &Graph,
    start: NodeId,
    max_depth: Option<u32>,
) -> FxHashSet<NodeId> {
    bfs(graph, start, Direction::Inverse, max_depth)
}

fn bfs(
    graph: &Graph,
    start: NodeId,
    direction: Direction,
    max_depth: Option<u32>,
) -> FxHashSet<NodeId> {
    let mut reachable = FxHashSet::default();
    let mut queue = VecDeque::new();
    queue.push_back((start, 0u32));
    let mut seen = FxHashSet::default();
    seen.insert(start);

    while let Some((node, depth)) = queue.pop_front() {
        if let Some(limit) = max_depth {
            if depth == limit {
                continue;
            }
        }
        let neighbors: Vec<NodeId> = match direction {
            Direction::Forward => graph.successors(node).map(|e| e.callee).collect(),
            Direction::Inverse => graph.predecessors(node).map(|e| e.caller).collect(),
        };
        for neighbor in neighbors {
            if seen.insert(neighbor) {
                reachable.insert(neighbor);
                queue.push_back((neighbor, depth + 1));
            }
        }
    }

    reachable
}
