//! Integration tests for tree resolution against an in-memory store

mod common;

use std::time::Duration;

use ::common::testkit::MemoryDag;
use ::common::tree::{IssueKind, ResolveError, ResolveOptions, Resolver};
use tokio::time::Instant;

use crate::common::{balanced_dag, cid, sample_dag, shape};

#[tokio::test]
async fn test_resolve_sample_tree() {
    let dag = sample_dag();
    let mut resolver = Resolver::new(dag.clone());

    let resolution = resolver.resolve(&cid("Qroot")).await.unwrap();
    assert!(resolution.is_complete());

    let root = &resolution.root;
    assert_eq!(root.path(), "/");
    assert!(root.is_dir());
    assert_eq!(root.size(), 30);
    assert_eq!(root.children().len(), 2);

    let a = &root.children()[0];
    assert_eq!((a.name(), a.path(), a.size(), a.is_dir()), ("a", "/Qa", 10, false));
    assert!(a.children().is_empty());

    let b = &root.children()[1];
    assert_eq!((b.name(), b.path(), b.is_dir()), ("b", "/Qb", true));
    assert_eq!(b.children().len(), 1);

    let c = &b.children()[0];
    assert_eq!((c.name(), c.path(), c.size(), c.is_dir()), ("c", "/Qb/Qc", 20, false));
    assert_eq!(c.deep(), 2);
}

#[tokio::test]
async fn test_leaves_are_never_expanded() {
    let dag = sample_dag();
    let mut resolver = Resolver::new(dag.clone());
    resolver.resolve(&cid("Qroot")).await.unwrap();

    // root and b only
    assert_eq!(dag.links_calls(), 2);
    // root, a, b, c
    assert_eq!(dag.stat_calls(), 4);
}

#[tokio::test]
async fn test_failed_links_keep_directory_without_children() {
    let dag = sample_dag();
    dag.fail_links("Qb");

    let mut resolver = Resolver::new(dag);
    let resolution = resolver.resolve(&cid("Qroot")).await.unwrap();

    let root = &resolution.root;
    assert_eq!(root.children().len(), 2);
    assert_eq!(root.children()[0].name(), "a");
    let b = &root.children()[1];
    assert!(b.is_dir());
    assert!(b.children().is_empty());

    assert_eq!(resolution.issues.len(), 1);
    assert_eq!(resolution.issues[0].cid, cid("Qb"));
    assert_eq!(resolution.issues[0].kind, IssueKind::Links);
}

#[tokio::test]
async fn test_failed_links_pruned_when_asked() {
    let dag = MemoryDag::new();
    dag.file("Qf", 1);
    dag.file("Qg", 2);
    dag.dir("Qd1", &[("f", "Qf")]);
    dag.dir("Qd2", &[("g", "Qg")]);
    dag.dir("Qd3", &[("f", "Qf"), ("g", "Qg")]);
    dag.dir("Qroot", &[("d1", "Qd1"), ("d2", "Qd2"), ("d3", "Qd3")]);
    dag.fail_links("Qd2");

    let mut resolver = Resolver::new(dag).with_options(ResolveOptions {
        prune_unexpanded: true,
        ..Default::default()
    });
    let resolution = resolver.resolve(&cid("Qroot")).await.unwrap();

    let names: Vec<&str> = resolution.root.children().iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["d1", "d3"]);
    assert_eq!(resolution.root.children()[0].children().len(), 1);
    assert_eq!(resolution.root.children()[1].children().len(), 2);
    assert!(resolution.root.find(&cid("Qd2")).is_none());
}

#[tokio::test]
async fn test_unresolvable_child_is_absent_and_siblings_expand() {
    let dag = MemoryDag::new();
    dag.file("Qx", 3);
    dag.dir("Qd1", &[("x", "Qx")]);
    dag.dir("Qd2", &[("x", "Qx")]);
    dag.dir("Qd3", &[("x", "Qx")]);
    dag.dir("Qroot", &[("d1", "Qd1"), ("d2", "Qd2"), ("d3", "Qd3")]);
    dag.fail_stat("Qd2");

    let mut resolver = Resolver::new(dag);
    let resolution = resolver.resolve(&cid("Qroot")).await.unwrap();

    let names: Vec<&str> = resolution.root.children().iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["d1", "d3"]);
    for child in resolution.root.children() {
        assert_eq!(child.children().len(), 1);
        assert_eq!(child.children()[0].hash(), &cid("Qx"));
    }
    assert_eq!(resolution.issues.len(), 1);
    assert_eq!(resolution.issues[0].kind, IssueKind::Stat);
    assert_eq!(resolution.issues[0].path, "/Qd2");
}

#[tokio::test]
async fn test_unknown_type_child_is_skipped() {
    let dag = sample_dag();
    dag.raw("Qlink", "symlink", 4);
    dag.dir("Qroot2", &[("a", "Qa"), ("weird", "Qlink")]);

    let mut resolver = Resolver::new(dag);
    let resolution = resolver.resolve(&cid("Qroot2")).await.unwrap();

    assert_eq!(resolution.root.children().len(), 1);
    assert_eq!(
        resolution.issues[0].kind,
        IssueKind::UnknownType("symlink".to_string())
    );
}

#[tokio::test]
async fn test_root_failures_are_fatal() {
    let dag = sample_dag();
    dag.fail_stat("Qroot");
    let mut resolver = Resolver::new(dag.clone());
    assert!(matches!(
        resolver.resolve(&cid("Qroot")).await,
        Err(ResolveError::RootUnavailable { .. })
    ));

    dag.heal("Qroot");
    dag.fail_links("Qroot");
    assert!(matches!(
        resolver.resolve(&cid("Qroot")).await,
        Err(ResolveError::RootLinksUnavailable { .. })
    ));

    dag.raw("Qodd", "symlink", 1);
    assert!(matches!(
        resolver.resolve(&cid("Qodd")).await,
        Err(ResolveError::RootUnknownType { .. })
    ));
}

#[tokio::test]
async fn test_file_root_is_a_single_leaf() {
    let dag = sample_dag();
    let mut resolver = Resolver::new(dag.clone());
    let resolution = resolver.resolve(&cid("Qa")).await.unwrap();

    assert!(!resolution.root.is_dir());
    assert_eq!(resolution.root.len(), 1);
    assert_eq!(dag.links_calls(), 0);
}

#[tokio::test]
async fn test_balanced_tree_reaches_exactly_every_node() {
    for (depth, fanout) in [(1, 3), (2, 2), (3, 3), (4, 2)] {
        let dag = MemoryDag::new();
        let (root, count) = balanced_dag(&dag, &format!("Qt{}x{}", depth, fanout), depth, fanout);

        let mut resolver = Resolver::new(dag);
        let resolution = resolver.resolve(&cid(&root)).await.unwrap();

        assert!(resolution.is_complete());
        assert_eq!(resolution.root.len(), count, "depth {} fanout {}", depth, fanout);
        for node in resolution.root.walk() {
            if !node.is_dir() {
                assert!(node.children().is_empty());
            }
        }
    }
}

#[tokio::test]
async fn test_resolution_is_repeatable() {
    let dag = MemoryDag::new();
    let (root, _) = balanced_dag(&dag, "Qrep", 3, 2);

    let mut resolver = Resolver::new(dag);
    let first = resolver.resolve(&cid(&root)).await.unwrap();
    let second = resolver.resolve(&cid(&root)).await.unwrap();

    assert_eq!(shape(&first.root), shape(&second.root));
    assert_eq!(first.root, second.root);
}

#[tokio::test]
async fn test_max_depth_stops_expansion() {
    let dag = MemoryDag::new();
    dag.file("Qleaf", 1);
    dag.dir("Q3", &[("leaf", "Qleaf")]);
    dag.dir("Q2", &[("three", "Q3")]);
    dag.dir("Q1", &[("two", "Q2")]);
    dag.dir("Q0", &[("one", "Q1")]);

    let mut resolver = Resolver::new(dag).with_options(ResolveOptions {
        max_depth: 2,
        ..Default::default()
    });
    let resolution = resolver.resolve(&cid("Q0")).await.unwrap();

    // Q1 (depth 1) expands, Q2 (depth 2) is recorded but not expanded
    let q2 = resolution.root.find(&cid("Q2")).unwrap();
    assert!(q2.children().is_empty());
    assert!(resolution.root.find(&cid("Q3")).is_none());
    assert_eq!(resolution.issues.len(), 1);
    assert_eq!(resolution.issues[0].kind, IssueKind::TooDeep);
}

#[tokio::test(start_paused = true)]
async fn test_call_timeout_counts_as_failure() {
    let dag = sample_dag();
    dag.set_latency(Duration::from_secs(10));

    let mut resolver = Resolver::new(dag).with_options(ResolveOptions {
        call_timeout: Some(Duration::from_secs(1)),
        ..Default::default()
    });
    match resolver.resolve(&cid("Qroot")).await {
        Err(ResolveError::RootUnavailable { source, .. }) => {
            assert_eq!(source, ::common::dag::DagError::Timeout)
        }
        other => panic!("expected a timeout, got {:?}", other.map(|r| r.root)),
    }
}

#[tokio::test(start_paused = true)]
async fn test_deadline_abandons_the_rest_of_the_walk() {
    let dag = sample_dag();
    dag.set_latency(Duration::from_secs(1));

    // root stat, root links, stat a finish; stat b is in flight at the deadline
    let mut resolver = Resolver::new(dag).with_options(ResolveOptions {
        deadline: Some(Instant::now() + Duration::from_millis(3500)),
        ..Default::default()
    });
    let resolution = resolver.resolve(&cid("Qroot")).await.unwrap();

    assert!(resolution.was_cancelled());
    let names: Vec<&str> = resolution.root.children().iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["a"]);
}

#[tokio::test]
async fn test_cancel_before_start() {
    let dag = sample_dag();
    let (tx, rx) = tokio::sync::watch::channel(());
    tx.send(()).unwrap();

    let mut resolver = Resolver::new(dag).with_cancel(rx);
    assert!(matches!(
        resolver.resolve(&cid("Qroot")).await,
        Err(ResolveError::Cancelled(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_walk_keeps_what_resolved() {
    let dag = sample_dag();
    dag.set_latency(Duration::from_secs(1));
    let (tx, rx) = tokio::sync::watch::channel(());

    // root stat, root links, stat a finish; stat b is in flight when the signal lands
    let signal = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(3500)).await;
        tx.send(()).unwrap();
    });

    let mut resolver = Resolver::new(dag.clone()).with_cancel(rx);
    let resolution = resolver.resolve(&cid("Qroot")).await.unwrap();
    signal.await.unwrap();

    assert!(resolution.was_cancelled());
    assert_eq!(
        shape(&resolution.root),
        vec![
            ("/".to_string(), "".to_string(), 30, true),
            ("/Qa".to_string(), "a".to_string(), 10, false),
        ]
    );
    assert_eq!(resolution.issues.len(), 1);
    assert_eq!(resolution.issues[0].kind, IssueKind::Cancelled);
    assert_eq!(resolution.issues[0].cid, cid("Qb"));
    // nothing is fetched once the walk has stopped
    assert_eq!(dag.links_calls(), 1);
}

#[tokio::test]
async fn test_dropped_cancel_sender_never_cancels() {
    let dag = sample_dag();
    let (tx, rx) = tokio::sync::watch::channel(());
    drop(tx);

    let mut resolver = Resolver::new(dag).with_cancel(rx);
    let resolution = resolver.resolve(&cid("Qroot")).await.unwrap();
    assert_eq!(resolution.root.len(), 4);
}
