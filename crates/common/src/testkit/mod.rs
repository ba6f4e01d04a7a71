/// In-process stand-ins for the store, for tests that should not
///  need a running node.
///
/// # Example
///
/// ```rust,ignore
/// use common::testkit::MemoryDag;
///
/// let dag = MemoryDag::new();
/// dag.file("Qa", 10);
/// dag.file("Qc", 20);
/// dag.dir("Qb", &[("c", "Qc")]);
/// dag.dir("Qroot", &[("a", "Qa"), ("b", "Qb")]);
/// dag.fail_links("Qb");
/// ```
mod memory_dag;

pub use memory_dag::MemoryDag;
