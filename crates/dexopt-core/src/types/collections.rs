//! Hash collections used throughout the workspace.
//!
//! All keys are interned symbols or small indices, so the non-cryptographic
//! FxHash is used everywhere.

pub use rustc_hash::{FxHashMap, FxHashSet};
