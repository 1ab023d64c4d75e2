//! Method-reference resolution under a dispatch discipline.
//!
//! An invoke site carries a symbolic [`MethodRef`] and a dispatch kind; the
//! resolver turns that into a concrete [`MethodId`] by walking the class
//! hierarchy the way the dispatch discipline prescribes. Failure to resolve
//! is not an error: library references and malformed programs simply yield
//! `None` and callers prune the call site.

use dashmap::DashMap;
use dexopt_core::ir::{ClassId, InvokeKind, MethodId, MethodKind, MethodRef, Program, Symbol};

/// Search discipline for a resolution, derived from the invoke's dispatch
/// kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodSearch {
    Static,
    Direct,
    Virtual,
    Interface,
    Super,
}

/// Map an invoke's dispatch kind to its resolution discipline.
pub fn search_for(kind: InvokeKind) -> MethodSearch {
    match kind {
        InvokeKind::Static => MethodSearch::Static,
        InvokeKind::Direct => MethodSearch::Direct,
        InvokeKind::Virtual => MethodSearch::Virtual,
        InvokeKind::Interface => MethodSearch::Interface,
        InvokeKind::Super => MethodSearch::Super,
    }
}

/// Shared memoization of resolution results, misses included.
///
/// Backed by a concurrent map so a future parallel builder can share one
/// cache; the current builder only ever touches it from one thread.
/// Super-dispatch lookups depend on the calling method and are never cached.
#[derive(Debug, Default)]
pub struct MethodRefCache {
    map: DashMap<(MethodRef, MethodSearch), Option<MethodId>>,
}

impl MethodRefCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Resolve `reference` under `search`, memoizing through `cache`.
///
/// `caller` is required for `MethodSearch::Super` and ignored otherwise.
pub fn resolve_method(
    program: &Program,
    reference: MethodRef,
    search: MethodSearch,
    cache: &MethodRefCache,
    caller: Option<MethodId>,
) -> Option<MethodId> {
    if search == MethodSearch::Super {
        return resolve_super(program, reference, caller);
    }
    if let Some(hit) = cache.map.get(&(reference, search)) {
        return *hit;
    }
    let resolved = resolve_uncached(program, reference, search);
    cache.map.insert((reference, search), resolved);
    resolved
}

fn resolve_uncached(
    program: &Program,
    reference: MethodRef,
    search: MethodSearch,
) -> Option<MethodId> {
    let owner = program.class_of_type(reference.owner)?;
    match search {
        MethodSearch::Static => {
            find_in_chain(program, owner, reference.name, reference.proto, MethodKind::Direct)
        }
        MethodSearch::Direct => {
            find_in_class(program, owner, reference.name, reference.proto, MethodKind::Direct)
        }
        MethodSearch::Virtual | MethodSearch::Interface => {
            find_in_chain(program, owner, reference.name, reference.proto, MethodKind::Virtual)
        }
        MethodSearch::Super => unreachable!("super dispatch is resolved via the caller"),
    }
}

/// Super dispatch starts the search above the calling method's class.
fn resolve_super(
    program: &Program,
    reference: MethodRef,
    caller: Option<MethodId>,
) -> Option<MethodId> {
    let caller_class = program.method(caller?).owner;
    let super_type = program.class(caller_class).super_type?;
    let start = program.class_of_type(super_type)?;
    find_in_chain(program, start, reference.name, reference.proto, MethodKind::Virtual)
}

/// Search a single class.
fn find_in_class(
    program: &Program,
    class_id: ClassId,
    name: Symbol,
    proto: Symbol,
    kind: MethodKind,
) -> Option<MethodId> {
    let class = program.class(class_id);
    let pool = match kind {
        MethodKind::Direct => &class.direct_methods,
        MethodKind::Virtual => &class.virtual_methods,
    };
    pool.iter().copied().find(|&id| {
        let method = program.method(id);
        method.name == name && method.proto == proto
    })
}

/// Search a class and its program-defined ancestors, nearest definition
/// wins. Interfaces are searched after the superclass chain.
fn find_in_chain(
    program: &Program,
    class_id: ClassId,
    name: Symbol,
    proto: Symbol,
    kind: MethodKind,
) -> Option<MethodId> {
    let mut current = Some(class_id);
    let mut interfaces = Vec::new();
    while let Some(id) = current {
        if let Some(found) = find_in_class(program, id, name, proto, kind) {
            return Some(found);
        }
        let class = program.class(id);
        interfaces.extend(class.interfaces.iter().copied());
        current = class.super_type.and_then(|t| program.class_of_type(t));
    }
    // Interface defaults come after every class in the chain.
    let mut index = 0;
    while index < interfaces.len() {
        if let Some(iface_id) = program.class_of_type(interfaces[index]) {
            if let Some(found) = find_in_class(program, iface_id, name, proto, kind) {
                return Some(found);
            }
            interfaces.extend(program.class(iface_id).interfaces.iter().copied());
        }
        index += 1;
    }
    None
}
