//! Property-based tests for suite execution order
//!
//! Random section trees are registered lazily (each section registers its children from inside its own
//! operation) and the observed execution order is compared against a pre-order walk of the same tree.

use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use testit::{BoxError, EventKind, Suite, SuiteResult, TestOptions};

#[derive(Debug, Clone)]
struct Node {
    children: Vec<Node>,
}

fn tree() -> impl Strategy<Value = Vec<Node>> {
    let leaf = Just(Node { children: Vec::new() });
    let node = leaf.prop_recursive(4, 40, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(|children| Node { children })
    });
    prop::collection::vec(node, 0..5)
}

fn pre_order(nodes: &[Node], prefix: &str, out: &mut Vec<String>) {
    for (i, node) in nodes.iter().enumerate() {
        let name = format!("{prefix}{i}");
        out.push(name.clone());
        pre_order(&node.children, &format!("{name}."), out);
    }
}

fn register(suite: &Suite, nodes: &[Node], prefix: &str, log: &Arc<Mutex<Vec<String>>>) -> SuiteResult<()> {
    for (i, node) in nodes.iter().enumerate() {
        let name = format!("{prefix}{i}");
        let s = suite.clone();
        let children = node.children.clone();
        let log = log.clone();
        let own = name.clone();
        suite.register_section(
            name,
            move || async move {
                log.lock().unwrap().push(own.clone());
                register(&s, &children, &format!("{own}."), &log)?;
                Ok::<(), BoxError>(())
            },
            TestOptions::default(),
        )?;
    }
    Ok(())
}

fn run_tree(nodes: &[Node], fail_at: Option<usize>) -> (Vec<String>, Vec<EventKind>, bool) {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
    runtime.block_on(async {
        let suite = Suite::new();
        let executed = Arc::new(Mutex::new(Vec::new()));
        let kinds = Arc::new(Mutex::new(Vec::new()));
        let sink = kinds.clone();
        suite.subscribe(move |event| sink.lock().unwrap().push(event.kind()));

        if let Some(position) = fail_at {
            register_failing(&suite, nodes, "", &executed, position).unwrap();
        } else {
            register(&suite, nodes, "", &executed).unwrap();
        }

        let passed = suite.run().await.is_ok();
        let executed = executed.lock().unwrap().clone();
        let kinds = kinds.lock().unwrap().clone();
        (executed, kinds, passed)
    })
}

/// Like [`register`], but the section that executes at `fail_at` (0-based) fails.
fn register_failing(
    suite: &Suite,
    nodes: &[Node],
    prefix: &str,
    log: &Arc<Mutex<Vec<String>>>,
    fail_at: usize,
) -> SuiteResult<()> {
    for (i, node) in nodes.iter().enumerate() {
        let name = format!("{prefix}{i}");
        let s = suite.clone();
        let children = node.children.clone();
        let log = log.clone();
        let own = name.clone();
        suite.register_section(
            name,
            move || async move {
                let position = {
                    let mut log = log.lock().unwrap();
                    log.push(own.clone());
                    log.len() - 1
                };
                if position == fail_at {
                    return Err(BoxError::from(format!("{own} failed")));
                }
                register_failing(&s, &children, &format!("{own}."), &log, fail_at)?;
                Ok(())
            },
            TestOptions::default(),
        )?;
    }
    Ok(())
}

proptest! {
    /// Property: sections execute in pre-order of the tree they register
    #[test]
    fn execution_order_is_pre_order(nodes in tree()) {
        let mut expected = Vec::new();
        pre_order(&nodes, "", &mut expected);

        let (executed, kinds, passed) = run_tree(&nodes, None);
        prop_assert!(passed);
        prop_assert_eq!(executed, expected.clone());

        let starts = kinds.iter().filter(|k| **k == EventKind::Start).count();
        let ends = kinds.iter().filter(|k| **k == EventKind::End).count();
        prop_assert_eq!(starts, expected.len());
        prop_assert_eq!(ends, expected.len());
        prop_assert_eq!(kinds.last(), Some(&EventKind::SuitePass));
    }

    /// Property: a failure stops execution exactly at the failing section
    #[test]
    fn failure_truncates_the_pre_order(nodes in tree(), pick in any::<prop::sample::Index>()) {
        let mut expected = Vec::new();
        pre_order(&nodes, "", &mut expected);
        prop_assume!(!expected.is_empty());
        let fail_at = pick.index(expected.len());

        let (executed, kinds, passed) = run_tree(&nodes, Some(fail_at));
        prop_assert!(!passed);
        prop_assert_eq!(&executed[..], &expected[..=fail_at]);
        prop_assert_eq!(kinds.iter().filter(|k| k.is_terminal()).count(), 1);
        prop_assert_eq!(kinds.last(), Some(&EventKind::SuiteFail));
    }
}
