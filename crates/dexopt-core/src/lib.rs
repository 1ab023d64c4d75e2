//! # dexopt-core
//!
//! Foundation crate for the dexopt bytecode optimizer.
//! Defines the program-view IR, configuration, errors and shared collections.
//! The analysis crate builds on top of this; nothing here depends on it.

pub mod config;
pub mod errors;
pub mod ir;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::{DexoptConfig, InlinerConfig};
pub use errors::{ConfigError, IrError};
pub use ir::{ClassId, MethodId, Program, ProgramBuilder};
