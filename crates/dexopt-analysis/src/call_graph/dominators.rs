//! Immediate dominators of a call graph, rooted at the entry ghost.
//!
//! The computation itself is delegated to petgraph's simple-fast dominator
//! algorithm; this module only maps the arena graph onto a petgraph view
//! and back. Parallel edges are irrelevant to dominance and collapse
//! naturally.

use dexopt_core::types::collections::FxHashMap;
use petgraph::graph::{DiGraph, NodeIndex};

use super::types::{EdgeId, Graph, NodeId};

/// Immediate dominator of every node reachable from the entry ghost.
///
/// The entry ghost dominates itself and is absent from the result; so are
/// nodes unreachable from entry.
pub fn immediate_dominators(graph: &Graph) -> FxHashMap<NodeId, NodeId> {
    let mut view: DiGraph<NodeId, ()> = DiGraph::with_capacity(graph.node_count(), graph.edge_count());
    let mut indices: FxHashMap<NodeId, NodeIndex> = FxHashMap::default();

    for index in 0..graph.node_count() as u32 {
        let id = NodeId(index);
        indices.insert(id, view.add_node(id));
    }
    for index in 0..graph.edge_count() as u32 {
        let edge = graph.edge(EdgeId(index));
        view.add_edge(indices[&edge.caller], indices[&edge.callee], ());
    }

    let dominators = petgraph::algo::dominators::simple_fast(&view, indices[&graph.entry()]);

    let mut result = FxHashMap::default();
    for (&id, &index) in &indices {
        if id == graph.entry() {
            continue;
        }
        if let Some(idom) = dominators.immediate_dominator(index) {
            result.insert(id, view[idom]);
        }
    }
    result
}
