//! Call-graph build configuration.

use serde::{Deserialize, Serialize};

/// Which build strategy the call-graph builder uses.
///
/// The choice is fixed for the whole graph: whether a virtual call expands
/// into edges to its overriding methods is a property of the strategy, never
/// of an individual call site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphStrategy {
    /// Only statically-known single targets; true-virtual callees are skipped.
    #[default]
    SingleCallee,
    /// Every resolved callee plus all of its overriding methods.
    Complete,
}

/// Configuration for the call-graph subsystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CallGraphConfig {
    pub strategy: GraphStrategy,
}
