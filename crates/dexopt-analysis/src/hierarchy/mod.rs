//! Class hierarchy and the method override relation.
//!
//! The override graph records, for every virtual method, the methods that
//! override it anywhere in the program, at any depth of the hierarchy.
//! Matching is by (name, proto) along superclass chains and transitive
//! interface lists; types without a program definition (library types) end
//! the walk.

use dexopt_core::ir::{ClassId, MethodId, Program, Symbol};
use dexopt_core::types::collections::{FxHashMap, FxHashSet};
use tracing::debug;

/// The program-wide override relation.
pub struct OverrideGraph {
    /// Overridden method → methods overriding it, in program order.
    overriding: FxHashMap<MethodId, Vec<MethodId>>,
}

impl OverrideGraph {
    /// Build the override relation for the whole program.
    pub fn build(program: &Program) -> Self {
        let mut overriding: FxHashMap<MethodId, Vec<MethodId>> = FxHashMap::default();

        for class_id in program.class_ids() {
            let class = program.class(class_id);
            if class.virtual_methods.is_empty() {
                continue;
            }
            let ancestors = ancestors_of(program, class_id);
            for &method_id in &class.virtual_methods {
                let method = program.method(method_id);
                for &ancestor_id in &ancestors {
                    if let Some(parent) =
                        find_virtual(program, ancestor_id, method.name, method.proto)
                    {
                        overriding.entry(parent).or_default().push(method_id);
                    }
                }
            }
        }

        debug!(overridden_methods = overriding.len(), "built override graph");
        Self { overriding }
    }

    /// All methods overriding `method`, at any depth, in program order.
    pub fn overriding_methods(&self, method: MethodId) -> &[MethodId] {
        self.overriding
            .get(&method)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// A true virtual has at least one override anywhere in the program.
    pub fn is_true_virtual(&self, method: MethodId) -> bool {
        !self.overriding_methods(method).is_empty()
    }
}

/// The set of methods that are declared virtual but are overridden nowhere.
///
/// Calls to these methods have exactly one possible target, so the
/// single-callee strategy treats them like direct calls.
pub fn non_true_virtuals(program: &Program) -> FxHashSet<MethodId> {
    let overrides = OverrideGraph::build(program);
    program
        .method_ids()
        .filter(|&id| program.method(id).is_virtual() && !overrides.is_true_virtual(id))
        .collect()
}

/// Program-defined ancestors of a class: the superclass chain plus all
/// transitively implemented interfaces, deduplicated.
fn ancestors_of(program: &Program, class_id: ClassId) -> Vec<ClassId> {
    let mut ancestors = Vec::new();
    let mut seen = FxHashSet::default();
    let mut work = Vec::new();

    let class = program.class(class_id);
    work.extend(class.super_type);
    work.extend(class.interfaces.iter().rev().copied());

    while let Some(type_id) = work.pop() {
        let Some(ancestor_id) = program.class_of_type(type_id) else {
            continue;
        };
        if !seen.insert(ancestor_id) {
            continue;
        }
        ancestors.push(ancestor_id);
        let ancestor = program.class(ancestor_id);
        work.extend(ancestor.super_type);
        work.extend(ancestor.interfaces.iter().rev().copied());
    }

    ancestors
}

fn find_virtual(
    program: &Program,
    class_id: ClassId,
    name: Symbol,
    proto: Symbol,
) -> Option<MethodId> {
    program
        .class(class_id)
        .virtual_methods
        .iter()
        .copied()
        .find(|&id| {
            let method = program.method(id);
            method.name == name && method.proto == proto
        })
}
