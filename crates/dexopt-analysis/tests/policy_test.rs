//! Inliner policy resolver tests: prefix classification, annotation rules,
//! idempotence and the class-over-method priority.

use dexopt_core::config::InlinerConfig;
use dexopt_core::errors::ConfigError;
use dexopt_core::ir::{MethodId, Program, ProgramBuilder};
use dexopt_analysis::inliner::InlinerPolicy;

const NO_INLINE: &str = "Ldalvik/annotation/optimization/NeverInline;";
const FORCE_INLINE: &str = "Ldalvik/annotation/optimization/AlwaysInline;";

fn policy(config: InlinerConfig) -> InlinerPolicy {
    InlinerPolicy::new(config).unwrap()
}

fn method(program: &Program, description: &str) -> MethodId {
    program
        .method_ids()
        .find(|&id| program.describe(id) == description)
        .unwrap_or_else(|| panic!("no method {description}"))
}

#[test]
fn prefix_blacklist_selects_matching_classes() {
    let mut builder = ProgramBuilder::new();
    builder
        .class("Lcom/a/Foo;", |_| {})
        .class("Lcom/b/Bar;", |_| {});
    let program = builder.build().unwrap();

    let mut policy = policy(InlinerConfig {
        blacklist_prefixes: vec!["Lcom/a/".to_string()],
        ..Default::default()
    });
    policy.populate(&program);

    let foo = program.types().get_type("Lcom/a/Foo;").unwrap();
    let bar = program.types().get_type("Lcom/b/Bar;").unwrap();
    assert!(policy.is_blacklisted(foo));
    assert!(!policy.is_blacklisted(bar));
    assert!(policy.caller_blacklisted_types().is_empty());
    assert!(policy.intradex_whitelisted_types().is_empty());
}

#[test]
fn prefix_matching_is_byte_exact() {
    let mut builder = ProgramBuilder::new();
    builder
        .class("Lcom/a/Foo;", |_| {})
        .class("Lcom/A/Foo;", |_| {});
    let program = builder.build().unwrap();

    let mut policy = policy(InlinerConfig {
        blacklist_prefixes: vec!["Lcom/a".to_string()],
        ..Default::default()
    });
    policy.populate(&program);

    assert!(policy.is_blacklisted(program.types().get_type("Lcom/a/Foo;").unwrap()));
    // Case differs in one byte: no match, no normalization.
    assert!(!policy.is_blacklisted(program.types().get_type("Lcom/A/Foo;").unwrap()));
}

#[test]
fn lists_are_scanned_independently() {
    let mut builder = ProgramBuilder::new();
    builder.class("Lcom/x/All;", |_| {});
    let program = builder.build().unwrap();

    let mut policy = policy(InlinerConfig {
        blacklist_prefixes: vec!["Lcom/x/".to_string()],
        caller_blacklist_prefixes: vec!["Lcom/".to_string()],
        intradex_whitelist_prefixes: vec!["Lcom/x/All".to_string()],
        ..Default::default()
    });
    policy.populate(&program);

    // A class may land in all three sets at once.
    let all = program.types().get_type("Lcom/x/All;").unwrap();
    assert!(policy.is_blacklisted(all));
    assert!(policy.is_caller_blacklisted(all));
    assert!(policy.is_intradex_whitelisted(all));
}

#[test]
fn several_matching_prefixes_insert_once() {
    let mut builder = ProgramBuilder::new();
    builder.class("Lcom/a/Foo;", |_| {});
    let program = builder.build().unwrap();

    let mut policy = policy(InlinerConfig {
        blacklist_prefixes: vec!["Lcom/".to_string(), "Lcom/a/".to_string()],
        ..Default::default()
    });
    policy.populate(&program);
    assert_eq!(policy.blacklisted_types().len(), 1);
}

#[test]
fn class_no_inline_annotation_flags_all_methods() {
    let mut builder = ProgramBuilder::new();
    builder.class("Lcom/a/A;", |c| {
        c.annotation(NO_INLINE);
        c.direct_method("m1", "()V", |m| {
            m.ret_void();
        });
        c.virtual_method("m2", "()V", |m| {
            m.ret_void();
        });
    });
    let program = builder.build().unwrap();

    let mut policy = policy(InlinerConfig::default());
    policy.populate(&program);

    for description in ["Lcom/a/A;.m1()V", "Lcom/a/A;.m2()V"] {
        let state = &program.method(method(&program, description)).state;
        assert!(state.dont_inline(), "{description} should be dont_inline");
        assert!(!state.force_inline());
    }
}

#[test]
fn method_force_inline_annotation() {
    let mut builder = ProgramBuilder::new();
    builder.class("Lcom/a/A;", |c| {
        c.virtual_method("m", "()V", |m| {
            m.annotation(FORCE_INLINE).ret_void();
        });
    });
    let program = builder.build().unwrap();

    let mut policy = policy(InlinerConfig::default());
    policy.populate(&program);

    let state = &program.method(method(&program, "Lcom/a/A;.m()V")).state;
    assert!(state.force_inline());
    assert!(!state.dont_inline());
}

#[test]
fn class_no_inline_beats_method_force_inline() {
    let mut builder = ProgramBuilder::new();
    builder.class("Lcom/a/A;", |c| {
        c.annotation(NO_INLINE);
        c.virtual_method("m", "()V", |m| {
            m.annotation(FORCE_INLINE).ret_void();
        });
    });
    let program = builder.build().unwrap();

    let mut policy = policy(InlinerConfig::default());
    policy.populate(&program);

    let state = &program.method(method(&program, "Lcom/a/A;.m()V")).state;
    assert!(state.dont_inline());
    assert!(!state.force_inline());
}

#[test]
fn method_no_inline_beats_its_own_force_inline() {
    let mut builder = ProgramBuilder::new();
    builder.class("Lcom/a/A;", |c| {
        c.virtual_method("m", "()V", |m| {
            m.annotation(NO_INLINE).annotation(FORCE_INLINE).ret_void();
        });
    });
    let program = builder.build().unwrap();

    let mut policy = policy(InlinerConfig::default());
    policy.populate(&program);

    let state = &program.method(method(&program, "Lcom/a/A;.m()V")).state;
    assert!(state.dont_inline());
    assert!(!state.force_inline());
}

#[test]
fn preexisting_dont_inline_is_never_promoted() {
    let mut builder = ProgramBuilder::new();
    builder.class("Lcom/a/A;", |c| {
        c.virtual_method("m", "()V", |m| {
            m.annotation(FORCE_INLINE).ret_void();
        });
    });
    let program = builder.build().unwrap();

    let m = method(&program, "Lcom/a/A;.m()V");
    program.method(m).state.set_dont_inline();

    let mut policy = policy(InlinerConfig::default());
    policy.populate(&program);

    let state = &program.method(m).state;
    assert!(state.dont_inline());
    assert!(!state.force_inline());
}

#[test]
fn unknown_annotation_descriptors_match_nothing() {
    let mut builder = ProgramBuilder::new();
    builder.class("Lcom/a/A;", |c| {
        c.virtual_method("m", "()V", |m| {
            m.ret_void();
        });
    });
    let program = builder.build().unwrap();

    let mut policy = policy(InlinerConfig {
        no_inline_annos: vec!["Lnever/Applied;".to_string()],
        ..Default::default()
    });
    policy.populate(&program);

    assert!(!program.method(method(&program, "Lcom/a/A;.m()V")).state.dont_inline());
}

#[test]
fn populate_is_idempotent() {
    let mut builder = ProgramBuilder::new();
    builder.class("Lcom/a/Foo;", |c| {
        c.annotation(NO_INLINE);
        c.virtual_method("m", "()V", |m| {
            m.ret_void();
        });
    });
    let program = builder.build().unwrap();

    let mut policy = policy(InlinerConfig {
        blacklist_prefixes: vec!["Lcom/a/".to_string()],
        ..Default::default()
    });
    policy.populate(&program);
    let first = policy.blacklisted_types().clone();

    policy.populate(&program);
    assert_eq!(policy.blacklisted_types(), &first);
    assert!(program.method(method(&program, "Lcom/a/Foo;.m()V")).state.dont_inline());
}

#[test]
fn second_populate_has_no_side_effects() {
    let mut empty = ProgramBuilder::new();
    empty.class("Lcom/other/X;", |_| {});
    let first_program = empty.build().unwrap();

    let mut builder = ProgramBuilder::new();
    builder.class("Lcom/a/Foo;", |_| {});
    let second_program = builder.build().unwrap();

    let mut policy = policy(InlinerConfig {
        blacklist_prefixes: vec!["Lcom/a/".to_string()],
        ..Default::default()
    });
    policy.populate(&first_program);
    assert!(policy.populated());
    assert!(policy.blacklisted_types().is_empty());

    // The resolver is single-shot: a second program view is ignored.
    policy.populate(&second_program);
    assert!(policy.blacklisted_types().is_empty());
}

#[test]
fn empty_prefix_is_a_configuration_error() {
    let config = InlinerConfig {
        caller_blacklist_prefixes: vec![String::new()],
        ..Default::default()
    };
    let err = InlinerPolicy::new(config).unwrap_err();
    assert!(matches!(err, ConfigError::EmptyPrefix { .. }));
}
