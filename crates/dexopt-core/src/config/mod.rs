//! Configuration system for dexopt.
//! TOML-based; supplied by the enclosing pass manager or loaded from disk.

pub mod call_graph_config;
pub mod dexopt_config;
pub mod inliner_config;

pub use call_graph_config::{CallGraphConfig, GraphStrategy};
pub use dexopt_config::DexoptConfig;
pub use inliner_config::InlinerConfig;
