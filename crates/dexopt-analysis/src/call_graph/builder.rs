//! Call-graph assembly under a pluggable build strategy.
//!
//! A strategy answers two questions: which methods root the graph, and what
//! a given method calls. Assembly is the same for every strategy: ghost
//! edges to all roots, then a depth-first walk that adds one edge per call
//! site and a leaf edge to the exit ghost for methods without call sites.
//! Unresolved references and skipped callees prune silently; the builder
//! itself never fails.

use std::time::Instant;

use dexopt_core::config::{CallGraphConfig, GraphStrategy};
use dexopt_core::ir::{MethodId, Program};
use dexopt_core::types::collections::FxHashSet;
use tracing::debug;

use crate::hierarchy::{non_true_virtuals, OverrideGraph};
use crate::resolver::{resolve_method, search_for, MethodRefCache};

use super::types::{Graph, InvokeSite};

/// One resolved call site: the callee plus the invoke's locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub callee: MethodId,
    pub site: InvokeSite,
}

/// How a call graph is populated.
///
/// Whether a virtual call expands to several callees is a property of the
/// strategy; it holds uniformly across the whole graph.
pub trait BuildStrategy {
    /// Root methods, in program order.
    fn roots(&self, program: &Program) -> Vec<MethodId>;

    /// Resolved call sites of `caller`, in instruction order.
    fn callsites(&self, program: &Program, caller: MethodId) -> Vec<CallSite>;
}

/// Captures only statically-known single targets. Calls that resolve to a
/// true virtual are skipped: their dispatch is polymorphic and this
/// strategy intentionally leaves polymorphism out of the graph.
pub struct SingleCalleeStrategy {
    non_true_virtuals: FxHashSet<MethodId>,
    cache: MethodRefCache,
}

impl SingleCalleeStrategy {
    pub fn new(program: &Program) -> Self {
        Self {
            non_true_virtuals: non_true_virtuals(program),
            cache: MethodRefCache::new(),
        }
    }

    fn is_definitely_virtual(&self, program: &Program, method: MethodId) -> bool {
        program.method(method).is_virtual() && !self.non_true_virtuals.contains(&method)
    }
}

impl BuildStrategy for SingleCalleeStrategy {
    fn roots(&self, program: &Program) -> Vec<MethodId> {
        let mut roots = Vec::new();
        for class in program.classes() {
            for method_id in class.methods() {
                let method = program.method(method_id);
                if !method.is_concrete() {
                    continue;
                }
                if self.is_definitely_virtual(program, method_id)
                    || method.is_root
                    || program.is_clinit(method_id)
                {
                    roots.push(method_id);
                }
            }
        }
        roots
    }

    fn callsites(&self, program: &Program, caller: MethodId) -> Vec<CallSite> {
        let mut callsites = Vec::new();
        for (index, instruction) in program.method(caller).instructions().iter().enumerate() {
            let Some((kind, target)) = instruction.invoke() else {
                continue;
            };
            let Some(callee) =
                resolve_method(program, target, search_for(kind), &self.cache, Some(caller))
            else {
                continue;
            };
            if self.is_definitely_virtual(program, callee) {
                continue;
            }
            if program.method(callee).is_concrete() {
                callsites.push(CallSite {
                    callee,
                    site: InvokeSite {
                        method: caller,
                        index: index as u32,
                    },
                });
            }
        }
        callsites
    }
}

/// Expands every resolved callee with its full override set, so a virtual
/// call yields one edge per possible target. All edges of one invoke share
/// the same site locator.
pub struct CompleteCallGraphStrategy {
    overrides: OverrideGraph,
    cache: MethodRefCache,
}

impl CompleteCallGraphStrategy {
    pub fn new(program: &Program) -> Self {
        Self {
            overrides: OverrideGraph::build(program),
            cache: MethodRefCache::new(),
        }
    }
}

impl BuildStrategy for CompleteCallGraphStrategy {
    fn roots(&self, program: &Program) -> Vec<MethodId> {
        let mut roots = Vec::new();
        for class in program.classes() {
            for method_id in class.methods() {
                if program.method(method_id).is_root || program.is_clinit(method_id) {
                    roots.push(method_id);
                }
            }
        }
        roots
    }

    fn callsites(&self, program: &Program, caller: MethodId) -> Vec<CallSite> {
        let mut callsites = Vec::new();
        for (index, instruction) in program.method(caller).instructions().iter().enumerate() {
            let Some((kind, target)) = instruction.invoke() else {
                continue;
            };
            let Some(callee) =
                resolve_method(program, target, search_for(kind), &self.cache, Some(caller))
            else {
                continue;
            };
            let site = InvokeSite {
                method: caller,
                index: index as u32,
            };
            if program.method(callee).is_concrete() {
                callsites.push(CallSite { callee, site });
            }
            for &overriding in self.overrides.overriding_methods(callee) {
                callsites.push(CallSite {
                    callee: overriding,
                    site,
                });
            }
        }
        callsites
    }
}

/// Build a graph under `strategy`.
pub fn build<S: BuildStrategy>(program: &Program, strategy: &S) -> Graph {
    let start = Instant::now();
    let mut graph = Graph::new();

    let roots = strategy.roots(program);
    for &root in &roots {
        let node = graph.ensure_method_node(root);
        let entry = graph.entry();
        graph.add_edge(entry, node, None);
    }

    let mut visited: FxHashSet<MethodId> = FxHashSet::default();
    let mut work: Vec<MethodId> = Vec::new();
    for &root in &roots {
        work.push(root);
        while let Some(caller) = work.pop() {
            if !visited.insert(caller) {
                continue;
            }
            let callsites = strategy.callsites(program, caller);
            let caller_node = graph.ensure_method_node(caller);
            if callsites.is_empty() {
                let exit = graph.exit();
                graph.add_edge(caller_node, exit, None);
                continue;
            }
            for callsite in &callsites {
                let callee_node = graph.ensure_method_node(callsite.callee);
                graph.add_edge(caller_node, callee_node, Some(callsite.site));
            }
            // Reverse push keeps the walk depth-first in call-site order.
            for callsite in callsites.iter().rev() {
                if !visited.contains(&callsite.callee) {
                    work.push(callsite.callee);
                }
            }
        }
    }

    let stats = graph.stats();
    debug!(
        methods = stats.methods,
        edges = stats.edges,
        roots = stats.roots,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "built call graph"
    );
    graph
}

/// Build the graph that captures only statically-known single call targets.
pub fn single_callee_graph(program: &Program) -> Graph {
    build(program, &SingleCalleeStrategy::new(program))
}

/// Build the graph that expands virtual calls over the override relation.
pub fn complete_call_graph(program: &Program) -> Graph {
    build(program, &CompleteCallGraphStrategy::new(program))
}

/// Build the graph selected by configuration.
pub fn build_call_graph(program: &Program, config: &CallGraphConfig) -> Graph {
    match config.strategy {
        GraphStrategy::SingleCallee => single_callee_graph(program),
        GraphStrategy::Complete => complete_call_graph(program),
    }
}
