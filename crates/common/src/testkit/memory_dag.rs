use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::dag::{DagAccessor, DagError, DagLink, NodeKind, NodeStat};
use crate::linked_data::DataCid;

/// In-memory DAG with failure injection
#[derive(Debug, Clone, Default)]
pub struct MemoryDag {
    inner: Arc<RwLock<MemoryDagInner>>,
}

#[derive(Debug, Default)]
struct MemoryDagInner {
    /// cid -> (type string, cumulative size)
    stats: HashMap<DataCid, (String, u64)>,
    /// directory cid -> ordered links
    links: HashMap<DataCid, Vec<DagLink>>,
    failing_stats: HashSet<DataCid>,
    failing_links: HashSet<DataCid>,
    /// artificial latency applied to every call
    latency: Option<Duration>,
    stat_calls: usize,
    links_calls: usize,
}

fn cid(value: &str) -> DataCid {
    DataCid::parse(value).unwrap_or_else(|err| panic!("bad test cid {:?}: {}", value, err))
}

impl MemoryDag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(&self, hash: &str, size: u64) -> &Self {
        self.inner
            .write()
            .stats
            .insert(cid(hash), ("file".to_string(), size));
        self
    }

    /// Add a directory whose size is the sum of its already added entries
    pub fn dir(&self, hash: &str, entries: &[(&str, &str)]) -> &Self {
        let mut inner = self.inner.write();
        let links: Vec<DagLink> = entries
            .iter()
            .map(|(name, target)| {
                let target = cid(target);
                let size = inner.stats.get(&target).map(|(_, s)| *s).unwrap_or(0);
                DagLink {
                    target,
                    name: name.to_string(),
                    size,
                }
            })
            .collect();
        let size = links.iter().map(|link| link.size).sum();
        inner
            .stats
            .insert(cid(hash), ("directory".to_string(), size));
        inner.links.insert(cid(hash), links);
        self
    }

    /// Register a node the store reports with an arbitrary type string
    pub fn raw(&self, hash: &str, kind: &str, size: u64) -> &Self {
        self.inner
            .write()
            .stats
            .insert(cid(hash), (kind.to_string(), size));
        self
    }

    pub fn fail_stat(&self, hash: &str) -> &Self {
        self.inner.write().failing_stats.insert(cid(hash));
        self
    }

    pub fn fail_links(&self, hash: &str) -> &Self {
        self.inner.write().failing_links.insert(cid(hash));
        self
    }

    pub fn heal(&self, hash: &str) -> &Self {
        let mut inner = self.inner.write();
        inner.failing_stats.remove(&cid(hash));
        inner.failing_links.remove(&cid(hash));
        self
    }

    pub fn set_latency(&self, latency: Duration) -> &Self {
        self.inner.write().latency = Some(latency);
        self
    }

    pub fn stat_calls(&self) -> usize {
        self.inner.read().stat_calls
    }

    pub fn links_calls(&self) -> usize {
        self.inner.read().links_calls
    }

    async fn delay(&self) {
        let latency = self.inner.read().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl DagAccessor for MemoryDag {
    async fn stat(&self, cid: &DataCid) -> Result<NodeStat, DagError> {
        self.inner.write().stat_calls += 1;
        self.delay().await;

        let inner = self.inner.read();
        if inner.failing_stats.contains(cid) {
            return Err(DagError::Unavailable(format!("stat {} failed", cid)));
        }
        let (kind, size) = inner
            .stats
            .get(cid)
            .ok_or_else(|| DagError::Unavailable(format!("{} not found", cid)))?;
        Ok(NodeStat {
            kind: NodeKind::from_type_str(kind),
            cumulative_size: *size,
        })
    }

    async fn links(&self, cid: &DataCid) -> Result<Vec<DagLink>, DagError> {
        self.inner.write().links_calls += 1;
        self.delay().await;

        let inner = self.inner.read();
        if inner.failing_links.contains(cid) {
            return Err(DagError::Unavailable(format!("links {} failed", cid)));
        }
        match inner.links.get(cid) {
            Some(links) => Ok(links.clone()),
            None if inner.stats.contains_key(cid) => Ok(Vec::new()),
            None => Err(DagError::Unavailable(format!("{} not found", cid))),
        }
    }
}
