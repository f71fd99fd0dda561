//! Concurrency tests for the shared context tree
//!
//! The tree is shared whenever a parent created on one thread grows children
//! on others; the per-node child-list mutex must keep sibling creation and
//! detachment race-free, and chained property reads must stay safe against
//! concurrent ancestor writes.

use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use weft::config::WeftConfig;
use weft::context::ContextRegistry;

fn create_test_registry() -> Arc<ContextRegistry> {
    Arc::new(ContextRegistry::new(WeftConfig::default()))
}

#[test]
fn test_concurrent_child_creation_under_shared_parent() {
    let reg = create_test_registry();
    let parent = reg.create_context(Some("shared"), None);

    let mut handles = Vec::new();
    for worker in 0..2 {
        let reg = Arc::clone(&reg);
        let parent = parent.clone();
        handles.push(thread::spawn(move || {
            for i in 0..1000 {
                let label = format!("w{}-{}", worker, i);
                reg.create_context(Some(label.as_str()), Some(&parent));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let children = parent.children();
    assert_eq!(children.len(), 2000);

    // No child lost, duplicated, or double-linked.
    let labels: HashSet<String> = children.iter().map(|c| c.id().unwrap()).collect();
    assert_eq!(labels.len(), 2000);
    let request_ids: HashSet<String> =
        children.iter().map(|c| c.request_id().to_string()).collect();
    assert_eq!(request_ids.len(), 2000);
}

#[test]
fn test_concurrent_create_and_clear_siblings() {
    let reg = create_test_registry();
    let parent = reg.create_context(Some("churn"), None);

    // One thread appends persistent children while another creates and
    // immediately detaches its own; only the persistent ones must remain.
    let creator = {
        let reg = Arc::clone(&reg);
        let parent = parent.clone();
        thread::spawn(move || {
            for i in 0..500 {
                let label = format!("keep-{}", i);
                reg.create_context(Some(label.as_str()), Some(&parent));
            }
        })
    };
    let churner = {
        let reg = Arc::clone(&reg);
        let parent = parent.clone();
        thread::spawn(move || {
            for i in 0..500 {
                let label = format!("drop-{}", i);
                let ctx = reg.create_context(Some(label.as_str()), Some(&parent));
                ctx.clear();
            }
        })
    };
    creator.join().unwrap();
    churner.join().unwrap();

    let children = parent.children();
    assert_eq!(children.len(), 500);
    assert!(children
        .iter()
        .all(|c| c.id().unwrap().starts_with("keep-")));
}

#[test]
fn test_chain_reads_race_ancestor_writes() {
    let reg = create_test_registry();
    let parent = reg.create_context(Some("hot"), None);
    parent.set_property("stable", json!("base"));
    let child = reg.create_context(Some("reader"), Some(&parent));

    let writer = {
        let parent = parent.clone();
        thread::spawn(move || {
            for i in 0..2000 {
                parent.set_property(&format!("k{}", i % 17), json!(i));
            }
        })
    };
    let reader = {
        let child = child.clone();
        thread::spawn(move || {
            for _ in 0..2000 {
                // Point lookups and enumeration must never observe torn
                // state while the ancestor churns.
                assert_eq!(child.get_property("stable"), Some(json!("base")));
                let _ = child.all_property_names();
            }
        })
    };
    writer.join().unwrap();
    reader.join().unwrap();

    assert!(child.all_property_names().len() >= 18);
}
