//! Immediate-dominator tests over small call graphs.
//!
//! The graphs are chains/diamonds of static calls so the call-graph shape is
//! exactly the adjacency written in each fixture.

use dexopt_core::ir::{Program, ProgramBuilder};
use dexopt_analysis::call_graph::{dominators::immediate_dominators, single_callee_graph, Graph, NodeId};

/// Build a program whose single-callee call graph has exactly the given
/// adjacency over methods `m0..mN`, with `m0` as the only root.
fn graph_program(node_count: usize, edges: &[(usize, usize)]) -> Program {
    let mut builder = ProgramBuilder::new();
    builder.class("Ld/G;", |c| {
        for index in 0..node_count {
            c.direct_method(&format!("m{index}"), "()V", |m| {
                if index == 0 {
                    m.root();
                }
                for &(from, to) in edges {
                    if from == index {
                        m.invoke_static("Ld/G;", &format!("m{to}"), "()V");
                    }
                }
                m.ret_void();
            });
        }
    });
    builder.build().unwrap()
}

fn node(graph: &Graph, program: &Program, index: usize) -> NodeId {
    let method = program
        .method_ids()
        .find(|&id| program.describe(id) == format!("Ld/G;.m{index}()V"))
        .unwrap();
    graph.node_for(method).unwrap()
}

#[test]
fn simple() {
    let program = graph_program(5, &[(0, 1), (0, 2), (1, 3), (1, 4), (4, 2)]);
    let graph = single_callee_graph(&program);
    let idoms = immediate_dominators(&graph);

    let n = |i: usize| node(&graph, &program, i);
    assert_eq!(idoms[&n(1)], n(0));
    assert_eq!(idoms[&n(2)], n(0));
    assert_eq!(idoms[&n(3)], n(1));
    assert_eq!(idoms[&n(4)], n(1));
    // The sole root is dominated by the entry ghost.
    assert_eq!(idoms[&n(0)], graph.entry());
}

#[test]
fn r#loop() {
    let program = graph_program(4, &[(0, 1), (0, 2), (1, 3), (2, 3), (3, 0)]);
    let graph = single_callee_graph(&program);
    let idoms = immediate_dominators(&graph);

    let n = |i: usize| node(&graph, &program, i);
    assert_eq!(idoms[&n(1)], n(0));
    assert_eq!(idoms[&n(2)], n(0));
    assert_eq!(idoms[&n(3)], n(0));
}

#[test]
fn double_loop() {
    //                 +---------+
    //                 v         |
    //     +---+     +---+     +---+     +---+
    //  +- | 0 | --> | 1 | --> | 2 | --> | 5 |
    //  |  +---+     +---+     +---+     +---+
    //  |                                  ^
    //  |    +---------+                   |
    //  |    v         |                   |
    //  |  +---+     +---+                 |
    //  +> | 3 | --> | 4 | ----------------+
    //     +---+     +---+
    let program = graph_program(
        6,
        &[(0, 1), (1, 2), (2, 1), (0, 3), (3, 4), (4, 3), (4, 5), (2, 5)],
    );
    let graph = single_callee_graph(&program);
    let idoms = immediate_dominators(&graph);

    let n = |i: usize| node(&graph, &program, i);
    assert_eq!(idoms[&n(1)], n(0));
    assert_eq!(idoms[&n(3)], n(0));
    assert_eq!(idoms[&n(2)], n(1));
    assert_eq!(idoms[&n(4)], n(3));
    assert_eq!(idoms[&n(5)], n(0));
}

#[test]
fn double_loop_nested_entry() {
    //                 +---------+
    //                 v         |
    //     +---+     +---+     +---+     +---+
    //     | 0 | --> | 1 | --> | 2 | --> | 5 |
    //     +---+     +---+     +---+     +---+
    //                |                    ^
    //  +-------------+                    |
    //  |    +---------+                   |
    //  |    v         |                   |
    //  |  +---+     +---+                 |
    //  +> | 3 | --> | 4 | ----------------+
    //     +---+     +---+
    let program = graph_program(
        6,
        &[(0, 1), (1, 2), (2, 1), (1, 3), (3, 4), (4, 3), (4, 5), (2, 5)],
    );
    let graph = single_callee_graph(&program);
    let idoms = immediate_dominators(&graph);

    let n = |i: usize| node(&graph, &program, i);
    assert_eq!(idoms[&n(1)], n(0));
    assert_eq!(idoms[&n(3)], n(1));
    assert_eq!(idoms[&n(2)], n(1));
    assert_eq!(idoms[&n(4)], n(3));
    assert_eq!(idoms[&n(5)], n(1));
}

#[test]
fn unreachable_nodes_have_no_dominator() {
    // m0 is the root; m1 exists but is never called.
    let mut builder = ProgramBuilder::new();
    builder.class("Ld/G;", |c| {
        c.direct_method("m0", "()V", |m| {
            m.root().ret_void();
        });
        c.direct_method("m1", "()V", |m| {
            m.ret_void();
        });
    });
    let program = builder.build().unwrap();
    let graph = single_callee_graph(&program);
    let idoms = immediate_dominators(&graph);

    // m1 never became a node at all; the map only covers reachable nodes.
    assert_eq!(graph.method_nodes().count(), 1);
    assert!(idoms.keys().all(|&node_id| node_id != graph.entry()));
}
