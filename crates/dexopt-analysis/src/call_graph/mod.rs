//! Call-graph construction: ghost-bracketed directed multigraph, two build
//! strategies (single resolved callee, complete with overrides).

pub mod builder;
pub mod dominators;
pub mod traversal;
pub mod types;

pub use builder::{
    build_call_graph, complete_call_graph, single_callee_graph, BuildStrategy, CallSite,
    CompleteCallGraphStrategy, SingleCalleeStrategy,
};
pub use types::{Edge, EdgeId, Graph, GraphStats, InvokeSite, Node, NodeId, NodeKind};
