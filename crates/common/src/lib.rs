/**
 * The content store as seen from the tree builder.
 *  A small async trait over "stat a node" and
 *  "list a node's links", plus the types that cross it.
 */
pub mod dag;
/**
 * Content identifiers and the path helpers
 *  used to place them in a tree.
 */
pub mod linked_data;
/**
 * Records exchanged with the meta server.
 *  These are pure data: JSON-RPC envelopes,
 *  source files, their splits and storage deals.
 */
pub mod meta;
/**
 * In-memory implementations of the store seams,
 *  used by tests here and in downstream crates.
 */
pub mod testkit;
/**
 * Reconstruction of directory hierarchies from
 *  the store's DAG, and the tree they produce.
 */
pub mod tree;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::dag::{DagAccessor, DagError, DagLink, NodeKind, NodeStat};
    pub use crate::linked_data::{path_join, DataCid, DataCidError};
    pub use crate::meta::{DownloadFileInfo, ListOptions, SourceFile, SourceFilePage};
    pub use crate::tree::{
        Resolution, ResolveError, ResolveIssue, ResolveOptions, Resolver, TreeError, TreeNode,
    };
    pub use crate::version::build_info;
}
