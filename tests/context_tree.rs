//! Integration tests for the context tree
//!
//! Covers:
//! - Child-list bookkeeping under creation and clearing
//! - Property inheritance and shadowing across the tree
//! - Activation-stack nesting through the registry

use serde_json::json;
use std::sync::Arc;
use weft::config::WeftConfig;
use weft::context::{stack, ContextRegistry};

fn create_test_registry() -> ContextRegistry {
    ContextRegistry::new(WeftConfig::default())
}

#[test]
fn test_child_list_matches_non_cleared_children() {
    let reg = create_test_registry();
    let parent = reg.create_context(Some("P"), None);

    let children: Vec<_> = (0..5)
        .map(|i| {
            let label = format!("c{}", i);
            reg.create_context(Some(label.as_str()), Some(&parent))
        })
        .collect();
    assert_eq!(parent.children().len(), 5);

    children[1].clear();
    children[3].clear();

    let remaining: Vec<_> = parent
        .children()
        .iter()
        .map(|c| c.id().unwrap())
        .collect();
    assert_eq!(remaining, vec!["c0", "c2", "c4"]);
}

#[test]
fn test_clear_removes_exactly_once_and_preserves_subtree() {
    let reg = create_test_registry();
    let parent = reg.create_context(Some("P"), None);
    let mid = reg.create_context(Some("mid"), Some(&parent));
    let leaf = reg.create_context(Some("leaf"), Some(&mid));
    mid.set_property("zone", json!("edge"));

    mid.clear();
    assert!(parent.children().is_empty());

    // The orphaned subtree is gone from root traversal but still answers.
    assert_eq!(leaf.get_property("zone"), Some(json!("edge")));
    assert_eq!(leaf.all_property_names().len(), 1);
    assert!(Arc::ptr_eq(&leaf.parent().unwrap(), &mid));
}

#[test]
fn test_inheritance_scenario() {
    // R -> A(X=1) -> B: B inherits, then shadows without mutating upward.
    let reg = create_test_registry();
    let a = reg.create_context(Some("A"), None);
    a.set_property("X", json!("1"));
    let b = reg.create_context(Some("B"), Some(&a));

    assert_eq!(b.get_property("X"), Some(json!("1")));
    b.set_property("X", json!("2"));
    assert_eq!(b.get_property("X"), Some(json!("2")));
    assert_eq!(a.get_property("X"), Some(json!("1")));
}

#[test]
fn test_request_ids_are_distinct_across_the_tree() {
    let reg = create_test_registry();
    let a = reg.create_context(None, None);
    let b = reg.create_context(None, None);
    let c = reg.create_context(None, Some(&a));

    assert_ne!(a.request_id(), b.request_id());
    assert_ne!(a.request_id(), c.request_id());
    assert_ne!(reg.root().request_id(), a.request_id());
}

#[test]
fn test_activation_nesting_and_unwinding() {
    let reg = create_test_registry();
    stack::reset_current();

    let outer = reg.create_and_activate();
    outer.set_property("depth", json!(1));
    let inner = reg.create_and_activate();

    // The inner context inherits through the activation chain.
    assert_eq!(inner.get_property("depth"), Some(json!(1)));
    assert!(Arc::ptr_eq(&stack::current().unwrap(), &inner));

    let popped = stack::pop_current().unwrap();
    assert!(Arc::ptr_eq(&popped, &inner));
    assert!(Arc::ptr_eq(&stack::current().unwrap(), &outer));

    stack::reset_current();
    assert!(stack::current().is_none());
}

#[test]
fn test_locked_property_survives_overwrite_attempts() {
    let reg = create_test_registry();
    let ctx = reg.create_context(Some("sealed"), None);

    assert!(ctx.set_property_locked("tenant", json!("acme")));
    assert!(!ctx.set_property("tenant", json!("intruder")));
    ctx.del_property("tenant");
    assert_eq!(ctx.get_property("tenant"), Some(json!("acme")));

    // A child may still shadow the locked value locally.
    let child = reg.create_context(None, Some(&ctx));
    assert!(child.set_property("tenant", json!("sub")));
    assert_eq!(child.get_property("tenant"), Some(json!("sub")));
    assert_eq!(ctx.get_property("tenant"), Some(json!("acme")));
}

#[test]
fn test_enumeration_local_versus_chain() {
    let reg = create_test_registry();
    let parent = reg.create_context(Some("P"), None);
    parent.set_property("shared", json!("x"));
    let child = reg.create_context(Some("C"), Some(&parent));
    child.set_property("own", json!("y"));

    let local: Vec<_> = child.local_property_names().into_iter().collect();
    assert_eq!(local, vec!["OWN".to_string()]);

    let all = child.all_property_names();
    assert!(all.contains("OWN"));
    assert!(all.contains("SHARED"));
}
