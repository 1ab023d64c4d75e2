//! Top-level optimizer configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ConfigError;

use super::call_graph_config::CallGraphConfig;
use super::inliner_config::InlinerConfig;

/// Configuration for the optimizer core, as handed down by the enclosing
/// pass manager.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DexoptConfig {
    pub inliner: InlinerConfig,
    pub call_graph: CallGraphConfig,
}

impl DexoptConfig {
    /// Load and validate a configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        debug!(path = %path.display(), "loaded optimizer configuration");
        Ok(config)
    }

    /// Validate all subsystem configurations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.inliner.validate()
    }
}
