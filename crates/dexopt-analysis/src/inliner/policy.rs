//! The inliner policy resolver.
//!
//! Two data-parallel passes over the program view. The class pass matches
//! name prefixes into the three type sets and applies class-level no-inline
//! annotations to every method of the class; the method pass applies
//! per-method annotations. The passes are separate rayon regions; the join
//! between them is the barrier that keeps a class-level `dont_inline` from
//! being overridden by a method-level `force_inline`.

use dexopt_core::config::InlinerConfig;
use dexopt_core::errors::ConfigError;
use dexopt_core::ir::{Class, Program, TypeId};
use dexopt_core::types::collections::FxHashSet;
use rayon::prelude::*;
use tracing::debug;

/// Whether `annotations` carries any annotation from `set`.
///
/// Missing annotation metadata (an empty set, or descriptors the program
/// never interned) yields "no match".
pub fn has_any_annotation(annotations: &FxHashSet<TypeId>, set: &[TypeId]) -> bool {
    set.iter().any(|anno| annotations.contains(anno))
}

/// Resolves the inliner configuration against a program view, stamping
/// per-method policy records and collecting the three class-type sets.
#[derive(Debug)]
pub struct InlinerPolicy {
    config: InlinerConfig,
    blacklisted_types: FxHashSet<TypeId>,
    caller_blacklisted_types: FxHashSet<TypeId>,
    intradex_whitelisted_types: FxHashSet<TypeId>,
    populated: bool,
}

/// Per-worker partial type sets, union-reduced after the class pass.
#[derive(Default)]
struct TypeSets {
    blacklisted: FxHashSet<TypeId>,
    caller_blacklisted: FxHashSet<TypeId>,
    intradex_whitelisted: FxHashSet<TypeId>,
}

impl TypeSets {
    fn union(mut self, other: TypeSets) -> TypeSets {
        self.blacklisted.extend(other.blacklisted);
        self.caller_blacklisted.extend(other.caller_blacklisted);
        self.intradex_whitelisted.extend(other.intradex_whitelisted);
        self
    }
}

impl InlinerPolicy {
    /// Create a resolver from a validated configuration.
    pub fn new(config: InlinerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            blacklisted_types: FxHashSet::default(),
            caller_blacklisted_types: FxHashSet::default(),
            intradex_whitelisted_types: FxHashSet::default(),
            populated: false,
        })
    }

    /// Apply the configuration to the program: stamp policy records and
    /// populate the type sets. Runs at most once per resolver instance;
    /// re-entry returns immediately with no side effects.
    pub fn populate(&mut self, program: &Program) {
        if self.populated {
            return;
        }

        // Annotation descriptors the program never interned cannot match.
        let no_inline = lookup_annos(program, &self.config.no_inline_annos);
        let force_inline = lookup_annos(program, &self.config.force_inline_annos);

        let sets = program
            .classes()
            .par_iter()
            .fold(TypeSets::default, |mut sets, class| {
                self.classify(class, &mut sets);
                if has_any_annotation(&class.annotations, &no_inline) {
                    for method_id in class.methods() {
                        program.method(method_id).state.set_dont_inline();
                    }
                }
                sets
            })
            .reduce(TypeSets::default, TypeSets::union);

        self.blacklisted_types = sets.blacklisted;
        self.caller_blacklisted_types = sets.caller_blacklisted;
        self.intradex_whitelisted_types = sets.intradex_whitelisted;

        // The class pass has fully joined at this point; method-level
        // annotations may now observe every class-level `dont_inline`.
        program.methods().par_iter().for_each(|method| {
            if method.state.dont_inline() {
                return;
            }
            if has_any_annotation(&method.annotations, &no_inline) {
                method.state.set_dont_inline();
            } else if has_any_annotation(&method.annotations, &force_inline) {
                method.state.set_force_inline();
            }
        });

        self.populated = true;
        debug!(
            blacklisted = self.blacklisted_types.len(),
            caller_blacklisted = self.caller_blacklisted_types.len(),
            intradex_whitelisted = self.intradex_whitelisted_types.len(),
            "populated inliner policy"
        );
    }

    /// Match the class name against the three prefix lists. Each list is
    /// scanned independently: the first matching prefix ends the scan of
    /// that list only, so a class may land in all three sets.
    fn classify(&self, class: &Class, sets: &mut TypeSets) {
        let name = class.name.as_bytes();
        if matches_any_prefix(name, &self.config.blacklist_prefixes) {
            sets.blacklisted.insert(class.type_id);
        }
        if matches_any_prefix(name, &self.config.caller_blacklist_prefixes) {
            sets.caller_blacklisted.insert(class.type_id);
        }
        if matches_any_prefix(name, &self.config.intradex_whitelist_prefixes) {
            sets.intradex_whitelisted.insert(class.type_id);
        }
    }

    pub fn populated(&self) -> bool {
        self.populated
    }

    /// Methods of these classes must never be inlined anywhere.
    pub fn blacklisted_types(&self) -> &FxHashSet<TypeId> {
        &self.blacklisted_types
    }

    /// Nothing may be inlined into methods of these classes.
    pub fn caller_blacklisted_types(&self) -> &FxHashSet<TypeId> {
        &self.caller_blacklisted_types
    }

    /// Methods of these classes are only inlined within their own dex.
    pub fn intradex_whitelisted_types(&self) -> &FxHashSet<TypeId> {
        &self.intradex_whitelisted_types
    }

    pub fn is_blacklisted(&self, type_id: TypeId) -> bool {
        self.blacklisted_types.contains(&type_id)
    }

    pub fn is_caller_blacklisted(&self, type_id: TypeId) -> bool {
        self.caller_blacklisted_types.contains(&type_id)
    }

    pub fn is_intradex_whitelisted(&self, type_id: TypeId) -> bool {
        self.intradex_whitelisted_types.contains(&type_id)
    }
}

fn matches_any_prefix(name: &[u8], prefixes: &[String]) -> bool {
    prefixes.iter().any(|p| name.starts_with(p.as_bytes()))
}

fn lookup_annos(program: &Program, descriptors: &[String]) -> Vec<TypeId> {
    descriptors
        .iter()
        .filter_map(|d| program.types().get_type(d))
        .collect()
}
