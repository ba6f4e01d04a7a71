//! Shared fixtures for tree resolution tests
#![allow(dead_code)]

use common::linked_data::DataCid;
use common::testkit::MemoryDag;
use common::tree::TreeNode;

pub fn cid(value: &str) -> DataCid {
    DataCid::parse(value).unwrap()
}

/// root -> [a (file, 10), b (dir) -> [c (file, 20)]]
pub fn sample_dag() -> MemoryDag {
    let dag = MemoryDag::new();
    dag.file("Qa", 10);
    dag.file("Qc", 20);
    dag.dir("Qb", &[("c", "Qc")]);
    dag.dir("Qroot", &[("a", "Qa"), ("b", "Qb")]);
    dag
}

/// Build a directory tree `depth` levels deep where every directory
///  holds one file and `fanout` subdirectories (none at the bottom level).
///
/// Returns the root cid and the number of nodes reachable from it.
pub fn balanced_dag(dag: &MemoryDag, prefix: &str, depth: usize, fanout: usize) -> (String, usize) {
    let file = format!("{}-f", prefix);
    dag.file(&file, 1);

    let mut entries = vec![("f".to_string(), file)];
    let mut count = 1;
    if depth > 1 {
        for i in 0..fanout {
            let (sub, sub_count) = balanced_dag(dag, &format!("{}-{}", prefix, i), depth - 1, fanout);
            entries.push((format!("d{}", i), sub));
            count += sub_count;
        }
    }

    let borrowed: Vec<(&str, &str)> = entries
        .iter()
        .map(|(name, target)| (name.as_str(), target.as_str()))
        .collect();
    let hash = format!("{}-dir", prefix);
    dag.dir(&hash, &borrowed);
    (hash, count + 1)
}

/// Everything about a tree except object identity, in pre-order
pub fn shape(root: &TreeNode) -> Vec<(String, String, u64, bool)> {
    root.walk()
        .map(|node| {
            (
                node.path().to_string(),
                node.name().to_string(),
                node.size(),
                node.is_dir(),
            )
        })
        .collect()
}
