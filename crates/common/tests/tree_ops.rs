//! Integration tests for querying and editing resolved trees

mod common;

use ::common::tree::{Resolver, TreeError, TreeNode};

use crate::common::{cid, sample_dag};

async fn resolved() -> TreeNode {
    let mut resolver = Resolver::new(sample_dag());
    resolver.resolve(&cid("Qroot")).await.unwrap().root
}

#[tokio::test]
async fn test_find_in_resolved_tree() {
    let root = resolved().await;

    let c = root.find(&cid("Qc")).unwrap();
    assert_eq!(c.name(), "c");
    assert_eq!(c.size(), 20);
    assert!(root.find(&cid("Qz")).is_none());
}

#[tokio::test]
async fn test_find_only_sees_inserted_nodes() {
    let mut root = resolved().await;
    assert!(root.find(&cid("Qnew")).is_none());

    root.insert(&cid("Qb"), TreeNode::new(cid("Qnew"), "/Qb/Qnew", "new", 7, false))
        .unwrap();
    let found = root.find(&cid("Qnew")).unwrap();
    assert_eq!(found.deep(), 2);

    root.del(&cid("Qnew")).unwrap();
    assert!(root.find(&cid("Qnew")).is_none());
}

#[tokio::test]
async fn test_edit_through_find_mut() {
    let mut root = resolved().await;

    let b = root.find_mut(&cid("Qb")).unwrap();
    b.add_child(TreeNode::new(cid("Qd"), "/Qb/Qd", "d", 1, false))
        .unwrap();

    let order: Vec<&str> = root.walk().map(|n| n.name()).collect();
    assert_eq!(order, vec!["", "a", "b", "c", "d"]);
}

#[tokio::test]
async fn test_insert_miss_is_reported() {
    let mut root = resolved().await;
    let before = root.clone();

    let result = root.insert(&cid("Qz"), TreeNode::new(cid("Qd"), "/Qd", "d", 1, false));
    assert_eq!(result, Err(TreeError::NotFound(cid("Qz"))));
    assert_eq!(root, before);
}

#[tokio::test]
async fn test_print_all_of_resolved_tree() {
    let root = resolved().await;
    let listing = root.print_all();
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(
        lines,
        vec![
            "/",
            "|---a (Hash:Qa Size:10)",
            "|---b (Hash:Qb Size:20)",
            "    |---c (Hash:Qc Size:20)",
        ]
    );
}
