//! Program-assembly errors.

use super::error_code::{self, DexoptErrorCode};

/// Errors raised while assembling a program view.
///
/// A program view that builds successfully is structurally sound; the
/// analysis crates never re-validate it and never fail on its contents.
#[derive(Debug, thiserror::Error)]
pub enum IrError {
    #[error("class {descriptor} defined twice")]
    DuplicateClass { descriptor: String },

    #[error("method {name}{proto} defined twice on {class}")]
    DuplicateMethod {
        class: String,
        name: String,
        proto: String,
    },

    #[error("invalid class descriptor {descriptor:?}: expected internal form `Lpath/Name;`")]
    InvalidDescriptor { descriptor: String },
}

impl DexoptErrorCode for IrError {
    fn error_code(&self) -> &'static str {
        error_code::IR_ERROR
    }
}
