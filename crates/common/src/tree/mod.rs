//! Directory trees reconstructed from the store
//!
//! - **[`TreeNode`]**: one file or directory, owning its children
//! - **[`Resolver`]**: walks the store's DAG beneath a root identifier
//!   and builds the [`TreeNode`] hierarchy it describes
//!
//! # Shape of a resolved tree
//!
//! ```text
//! /                       (root, path "/")
//! |---a                   (leaf, path "/Qa")
//! |---b                   (dir,  path "/Qb")
//!     |---c               (leaf, path "/Qb/Qc")
//! ```
//!
//! Node paths are built from content identifiers, not link names,
//!  so they stay unique even when two entries share a name.
//!
//! # Failure containment
//!
//! The walk never aborts because a single node is unreachable. A child
//!  that cannot be stat'ed is left out; a directory whose links cannot
//!  be fetched stays in the tree without children (or is pruned, see
//!  [`ResolveOptions::prune_unexpanded`]). Each of these is reported as a
//!  [`ResolveIssue`] alongside the tree.

mod node;
mod render;
mod resolver;

pub use node::{TreeError, TreeNode, Walk};
pub use resolver::{
    IssueKind, Resolution, ResolveError, ResolveIssue, ResolveOptions, Resolver,
    DEFAULT_MAX_DEPTH,
};
