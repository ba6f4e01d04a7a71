use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::linked_data::DataCid;

/// What the store reports a content identifier to be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    File,
    Directory,
    /// Any type string the store returned that we do not understand
    Other(String),
}

impl NodeKind {
    pub fn from_type_str(kind: &str) -> Self {
        match kind {
            "file" => NodeKind::File,
            "directory" => NodeKind::Directory,
            other => NodeKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::File => f.write_str("file"),
            NodeKind::Directory => f.write_str("directory"),
            NodeKind::Other(other) => write!(f, "{}", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStat {
    pub kind: NodeKind,
    /// Size of the node and everything beneath it
    pub cumulative_size: u64,
}

/// A named, sized reference from a directory to one of its entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DagLink {
    pub target: DataCid,
    pub name: String,
    pub size: u64,
}

/// Failure of a single store call.
///
/// Callers inside a tree walk never branch on the variant;
///  any of these just means "this node could not be resolved".
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum DagError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("malformed store response: {0}")]
    Malformed(String),
    #[error("store call timed out")]
    Timeout,
}

#[async_trait]
pub trait DagAccessor: Send + Sync {
    /// Stat a content identifier
    async fn stat(&self, cid: &DataCid) -> Result<NodeStat, DagError>;

    /// Fetch the direct links of a directory identifier,
    ///  in the order the store lists them
    async fn links(&self, cid: &DataCid) -> Result<Vec<DagLink>, DagError>;
}

#[async_trait]
impl<T: DagAccessor + ?Sized> DagAccessor for &T {
    async fn stat(&self, cid: &DataCid) -> Result<NodeStat, DagError> {
        (**self).stat(cid).await
    }

    async fn links(&self, cid: &DataCid) -> Result<Vec<DagLink>, DagError> {
        (**self).links(cid).await
    }
}

#[async_trait]
impl<T: DagAccessor + ?Sized> DagAccessor for std::sync::Arc<T> {
    async fn stat(&self, cid: &DataCid) -> Result<NodeStat, DagError> {
        (**self).stat(cid).await
    }

    async fn links(&self, cid: &DataCid) -> Result<Vec<DagLink>, DagError> {
        (**self).links(cid).await
    }
}
