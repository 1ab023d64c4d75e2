//! Call-graph model: arena-stored nodes and edges, ghost entry/exit
//! sentinels, ordered adjacency.
//!
//! Nodes and edges live in two vectors owned by [`Graph`] and are addressed
//! by [`NodeId`] / [`EdgeId`] indices; adjacency lists hold edge indices in
//! insertion order. The graph is a multigraph: distinct invoke sites to the
//! same callee yield distinct edges, and cycles (recursion) are expected.
//! Once built, a graph is read-only.

use dexopt_core::ir::MethodId;
use dexopt_core::types::collections::FxHashMap;
use smallvec::SmallVec;

/// Index of a node in its graph's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Index of an edge in its graph's edge arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeId(pub u32);

/// What a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Synthetic source: every root method is a successor of this node.
    Entry,
    /// Synthetic sink: every method without call sites points here.
    Exit,
    /// A unique method of the program.
    Method(MethodId),
}

/// A node plus its ordered adjacency.
#[derive(Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub(crate) preds: SmallVec<[EdgeId; 4]>,
    pub(crate) succs: SmallVec<[EdgeId; 4]>,
}

/// Locator of an invoke instruction inside a caller's instruction stream.
///
/// Opaque except for identity; edges touching the ghost nodes carry none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InvokeSite {
    pub method: MethodId,
    pub index: u32,
}

/// A caller→callee edge, tagged with its invoke site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub caller: NodeId,
    pub callee: NodeId,
    pub site: Option<InvokeSite>,
}

/// Summary counts for a built graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    /// Method nodes (the two ghosts are not counted).
    pub methods: usize,
    pub edges: usize,
    /// Direct successors of the entry ghost.
    pub roots: usize,
    /// Direct predecessors of the exit ghost.
    pub leaves: usize,
}

/// The call graph. Built once by a strategy, read-only afterwards.
#[derive(Debug)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    entry: NodeId,
    exit: NodeId,
    method_nodes: FxHashMap<MethodId, NodeId>,
}

impl Graph {
    pub(crate) fn new() -> Self {
        let mut nodes = Vec::with_capacity(2);
        nodes.push(Node {
            kind: NodeKind::Entry,
            preds: SmallVec::new(),
            succs: SmallVec::new(),
        });
        nodes.push(Node {
            kind: NodeKind::Exit,
            preds: SmallVec::new(),
            succs: SmallVec::new(),
        });
        Self {
            nodes,
            edges: Vec::new(),
            entry: NodeId(0),
            exit: NodeId(1),
            method_nodes: FxHashMap::default(),
        }
    }

    /// The synthetic entry node.
    pub fn entry(&self) -> NodeId {
        self.entry
    }

    /// The synthetic exit node.
    pub fn exit(&self) -> NodeId {
        self.exit
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0 as usize]
    }

    /// The unique node of a method, if the method is part of the graph.
    /// Lookup only; nodes are never created after construction.
    pub fn node_for(&self, method: MethodId) -> Option<NodeId> {
        self.method_nodes.get(&method).copied()
    }

    /// The method a node stands for; `None` for the ghosts.
    pub fn method_of(&self, id: NodeId) -> Option<MethodId> {
        match self.node(id).kind {
            NodeKind::Method(method) => Some(method),
            _ => None,
        }
    }

    /// Outgoing edges of a node, in insertion order.
    pub fn successors(&self, id: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.node(id).succs.iter().map(|&e| self.edge(e))
    }

    /// Incoming edges of a node, in insertion order.
    pub fn predecessors(&self, id: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.node(id).preds.iter().map(|&e| self.edge(e))
    }

    pub fn out_edges(&self, id: NodeId) -> &[EdgeId] {
        &self.node(id).succs
    }

    pub fn in_edges(&self, id: NodeId) -> &[EdgeId] {
        &self.node(id).preds
    }

    /// All edges from `caller` to `callee`. Not guaranteed unique; parallel
    /// edges carry distinct invoke sites (or, for override expansion, the
    /// same site with different callees elsewhere).
    pub fn edges_between<'a>(
        &'a self,
        caller: NodeId,
        callee: NodeId,
    ) -> impl Iterator<Item = &'a Edge> + 'a {
        self.successors(caller).filter(move |e| e.callee == callee)
    }

    /// Every method in the graph with its node, in node-creation order.
    pub fn method_nodes(&self) -> impl Iterator<Item = (MethodId, NodeId)> + '_ {
        self.nodes.iter().enumerate().filter_map(|(index, node)| {
            match node.kind {
                NodeKind::Method(method) => Some((method, NodeId(index as u32))),
                _ => None,
            }
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            methods: self.method_nodes.len(),
            edges: self.edges.len(),
            roots: self.node(self.entry).succs.len(),
            leaves: self.node(self.exit).preds.len(),
        }
    }

    /// Fetch or create the unique node of a method.
    pub(crate) fn ensure_method_node(&mut self, method: MethodId) -> NodeId {
        if let Some(&existing) = self.method_nodes.get(&method) {
            return existing;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind: NodeKind::Method(method),
            preds: SmallVec::new(),
            succs: SmallVec::new(),
        });
        self.method_nodes.insert(method, id);
        id
    }

    pub(crate) fn add_edge(
        &mut self,
        caller: NodeId,
        callee: NodeId,
        site: Option<InvokeSite>,
    ) -> EdgeId {
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(Edge {
            caller,
            callee,
            site,
        });
        self.nodes[caller.0 as usize].succs.push(id);
        self.nodes[callee.0 as usize].preds.push(id);
        id
    }
}
