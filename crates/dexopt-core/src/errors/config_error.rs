//! Configuration errors.

use super::error_code::{self, DexoptErrorCode};

/// Errors raised when validating or loading optimizer configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An empty prefix would match every class in the program.
    #[error("empty prefix in `{list}`: an empty string is a prefix of every class name")]
    EmptyPrefix { list: &'static str },

    #[error("invalid annotation descriptor {descriptor:?} in `{list}`: expected internal form `Lpath/Name;`")]
    InvalidAnnotationDescriptor {
        list: &'static str,
        descriptor: String,
    },

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

impl DexoptErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        error_code::CONFIG_ERROR
    }
}
