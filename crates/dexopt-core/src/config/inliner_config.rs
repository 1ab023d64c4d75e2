//! Inliner policy configuration.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Annotations that mark a method (or a whole class) as never-inline when no
/// explicit configuration is given.
static DEFAULT_NO_INLINE_ANNOS: Lazy<Vec<String>> = Lazy::new(|| {
    vec!["Ldalvik/annotation/optimization/NeverInline;".to_string()]
});

/// Annotations that mark a method as always-inline when no explicit
/// configuration is given.
static DEFAULT_FORCE_INLINE_ANNOS: Lazy<Vec<String>> = Lazy::new(|| {
    vec!["Ldalvik/annotation/optimization/AlwaysInline;".to_string()]
});

/// Configuration for the inliner policy resolver.
///
/// Prefixes match byte-wise against a class's internal name
/// (`Lcom/example/Foo;`); matching is exact and case-sensitive, no
/// normalization. Annotation lists hold annotation type descriptors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InlinerConfig {
    /// Classes whose methods must never be inlined anywhere.
    pub blacklist_prefixes: Vec<String>,
    /// Classes into whose methods nothing may be inlined.
    pub caller_blacklist_prefixes: Vec<String>,
    /// Classes whose methods should only be inlined within their own dex.
    pub intradex_whitelist_prefixes: Vec<String>,
    /// Annotation descriptors forcing `dont_inline`.
    pub no_inline_annos: Vec<String>,
    /// Annotation descriptors forcing `force_inline`.
    pub force_inline_annos: Vec<String>,
}

impl Default for InlinerConfig {
    fn default() -> Self {
        Self {
            blacklist_prefixes: Vec::new(),
            caller_blacklist_prefixes: Vec::new(),
            intradex_whitelist_prefixes: Vec::new(),
            no_inline_annos: DEFAULT_NO_INLINE_ANNOS.clone(),
            force_inline_annos: DEFAULT_FORCE_INLINE_ANNOS.clone(),
        }
    }
}

impl InlinerConfig {
    /// Validate the configuration.
    ///
    /// An empty prefix is rejected: `starts_with("")` holds for every class
    /// name, so it would silently blacklist the whole program. Annotation
    /// descriptors must be in internal form.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_prefixes("blacklist_prefixes", &self.blacklist_prefixes)?;
        check_prefixes("caller_blacklist_prefixes", &self.caller_blacklist_prefixes)?;
        check_prefixes("intradex_whitelist_prefixes", &self.intradex_whitelist_prefixes)?;
        check_annos("no_inline_annos", &self.no_inline_annos)?;
        check_annos("force_inline_annos", &self.force_inline_annos)?;
        Ok(())
    }
}

fn check_prefixes(list: &'static str, prefixes: &[String]) -> Result<(), ConfigError> {
    if prefixes.iter().any(|p| p.is_empty()) {
        return Err(ConfigError::EmptyPrefix { list });
    }
    Ok(())
}

fn check_annos(list: &'static str, descriptors: &[String]) -> Result<(), ConfigError> {
    for descriptor in descriptors {
        if !descriptor.starts_with('L') || !descriptor.ends_with(';') {
            return Err(ConfigError::InvalidAnnotationDescriptor {
                list,
                descriptor: descriptor.clone(),
            });
        }
    }
    Ok(())
}
