//! # dexopt-analysis
//!
//! The optimizer core: inliner policy resolution, method-reference
//! resolution, the override relation and call-graph construction over a
//! `dexopt-core` program view.

pub mod call_graph;
pub mod hierarchy;
pub mod inliner;
pub mod resolver;

pub use call_graph::{build_call_graph, complete_call_graph, single_callee_graph, Graph};
pub use inliner::InlinerPolicy;
