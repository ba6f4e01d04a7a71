use std::future::{pending, Future};
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::dag::{DagAccessor, DagError, DagLink, NodeKind, NodeStat};
use crate::linked_data::{path_join, DataCid};

use super::node::TreeNode;

/// Deepest directory level expanded unless told otherwise.
pub const DEFAULT_MAX_DEPTH: usize = 256;

#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Directories at or below this depth are recorded but not expanded.
    /// The root sits at depth 0.
    pub max_depth: usize,
    /// Upper bound on any single stat or link fetch
    pub call_timeout: Option<Duration>,
    /// Once passed, the walk stops and returns what it has
    pub deadline: Option<Instant>,
    /// Drop directories whose link list could not be fetched instead
    ///  of leaving them in the tree without children
    pub prune_unexpanded: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            call_timeout: None,
            deadline: None,
            prune_unexpanded: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// The node could not be stat'ed
    Stat,
    /// The store reported a type we cannot place in a tree
    UnknownType(String),
    /// A directory's links could not be fetched
    Links,
    /// A directory sat deeper than `max_depth`
    TooDeep,
    /// The walk was cancelled or ran past its deadline here
    Cancelled,
}

/// Something that went wrong below the root, but did not
///  stop the rest of the tree from resolving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveIssue {
    pub cid: DataCid,
    /// Where the node would have been placed
    pub path: String,
    pub kind: IssueKind,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub root: TreeNode,
    pub issues: Vec<ResolveIssue>,
}

impl Resolution {
    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn was_cancelled(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| issue.kind == IssueKind::Cancelled)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("root {cid} is unavailable: {source}")]
    RootUnavailable { cid: DataCid, source: DagError },
    #[error("root {cid} has unsupported type {kind}")]
    RootUnknownType { cid: DataCid, kind: NodeKind },
    #[error("links of root {cid} are unavailable: {source}")]
    RootLinksUnavailable { cid: DataCid, source: DagError },
    #[error("resolution of {0} was cancelled before the root resolved")]
    Cancelled(DataCid),
}

enum CallError {
    Dag(DagError),
    Cancelled,
}

/// Builds trees out of the store's DAG.
///
/// A resolver walks depth first, one remote call at a time, and keeps
///  going past any node it cannot resolve. Everything it had to skip
///  is reported back in the [`Resolution`].
pub struct Resolver<A> {
    accessor: A,
    options: ResolveOptions,
    cancel: Option<watch::Receiver<()>>,
    issues: Vec<ResolveIssue>,
    stopped: bool,
}

impl<A: DagAccessor> Resolver<A> {
    pub fn new(accessor: A) -> Self {
        Self {
            accessor,
            options: ResolveOptions::default(),
            cancel: None,
            issues: Vec::new(),
            stopped: false,
        }
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Stop the walk as soon as anything is sent on `cancel`
    pub fn with_cancel(mut self, cancel: watch::Receiver<()>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Issues gathered since the last call to [`Resolver::resolve`]
    pub fn issues(&self) -> &[ResolveIssue] {
        &self.issues
    }

    /// Resolve the full tree beneath `root`.
    ///
    /// Only the root itself is fail-fast: if it cannot be stat'ed, or
    ///  it is a directory whose links cannot be listed, there is no
    ///  tree to return.
    pub async fn resolve(&mut self, root: &DataCid) -> Result<Resolution, ResolveError> {
        self.issues.clear();
        self.stopped = false;

        tracing::debug!(cid = %root, "resolving tree");
        let stat = match self.guarded_stat(root).await {
            Ok(stat) => stat,
            Err(CallError::Dag(source)) => {
                return Err(ResolveError::RootUnavailable {
                    cid: root.clone(),
                    source,
                })
            }
            Err(CallError::Cancelled) => return Err(ResolveError::Cancelled(root.clone())),
        };

        let dir = match &stat.kind {
            NodeKind::Directory => true,
            NodeKind::File => false,
            NodeKind::Other(_) => {
                return Err(ResolveError::RootUnknownType {
                    cid: root.clone(),
                    kind: stat.kind.clone(),
                })
            }
        };

        let mut node = TreeNode::new(root.clone(), "/", "", stat.cumulative_size, dir);
        if dir {
            let links = match self.guarded_links(root).await {
                Ok(links) => links,
                Err(CallError::Dag(source)) => {
                    return Err(ResolveError::RootLinksUnavailable {
                        cid: root.clone(),
                        source,
                    })
                }
                Err(CallError::Cancelled) => {
                    return Err(ResolveError::Cancelled(root.clone()))
                }
            };
            self.attach_links(&mut node, links).await;
            self.build_child_tree(&mut node).await;
        }

        Ok(Resolution {
            root: node,
            issues: std::mem::take(&mut self.issues),
        })
    }

    /// Stat `cid` and build an unexpanded node for it beneath `base_path`.
    ///
    /// A node that cannot be resolved comes back as `None` with an issue
    ///  recorded; callers skip it and carry on with its siblings.
    pub async fn new_node_by_data_cid(
        &mut self,
        cid: &DataCid,
        base_path: &str,
        name: &str,
    ) -> Option<TreeNode> {
        let path = path_join(base_path, &[cid.as_str()]);
        if self.stopped {
            return None;
        }

        match self.guarded_stat(cid).await {
            Ok(stat) => match stat.kind {
                NodeKind::File => Some(TreeNode::new(
                    cid.clone(),
                    path,
                    name,
                    stat.cumulative_size,
                    false,
                )),
                NodeKind::Directory => Some(TreeNode::new(
                    cid.clone(),
                    path,
                    name,
                    stat.cumulative_size,
                    true,
                )),
                NodeKind::Other(kind) => {
                    let message = format!("unknown node type {:?}", kind);
                    self.record(cid, path, IssueKind::UnknownType(kind), message);
                    None
                }
            },
            Err(CallError::Dag(err)) => {
                self.record(cid, path, IssueKind::Stat, err.to_string());
                None
            }
            Err(CallError::Cancelled) => {
                self.halt(cid, path);
                None
            }
        }
    }

    /// Expand every directory child of `node`, depth first.
    ///
    /// `node`'s own children must already be attached; leaves and
    ///  childless nodes are left alone. A child whose links cannot be
    ///  fetched is skipped and its siblings still expand.
    pub fn build_child_tree<'a>(&'a mut self, node: &'a mut TreeNode) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            if !node.is_dir() || node.children().is_empty() {
                return;
            }

            let mut unexpanded = Vec::new();
            for index in 0..node.children().len() {
                if self.stopped {
                    break;
                }

                let child = &mut node.children_mut()[index];
                if !child.is_dir() {
                    continue;
                }

                if child.deep() >= self.options.max_depth {
                    let message = format!(
                        "depth {} reaches the limit of {}",
                        child.deep(),
                        self.options.max_depth
                    );
                    self.record(
                        child.hash(),
                        child.path().to_string(),
                        IssueKind::TooDeep,
                        message,
                    );
                    continue;
                }

                let links = match self.guarded_links(child.hash()).await {
                    Ok(links) => links,
                    Err(CallError::Dag(err)) => {
                        self.record(
                            child.hash(),
                            child.path().to_string(),
                            IssueKind::Links,
                            err.to_string(),
                        );
                        unexpanded.push(index);
                        continue;
                    }
                    Err(CallError::Cancelled) => {
                        self.halt(child.hash(), child.path().to_string());
                        unexpanded.push(index);
                        break;
                    }
                };

                self.attach_links(child, links).await;
                self.build_child_tree(child).await;
            }

            if self.options.prune_unexpanded {
                for index in unexpanded.into_iter().rev() {
                    let pruned = node.children_mut().remove(index);
                    tracing::debug!(cid = %pruned.hash(), "pruned unexpanded directory");
                }
            }
        })
    }

    async fn attach_links(&mut self, parent: &mut TreeNode, links: Vec<DagLink>) {
        let base_path = parent.path().to_string();
        for link in links {
            let Some(child) = self
                .new_node_by_data_cid(&link.target, &base_path, &link.name)
                .await
            else {
                continue;
            };
            if let Err(err) = parent.add_child(child) {
                tracing::error!(%err, "failed to attach resolved link");
            }
        }
    }

    fn record(&mut self, cid: &DataCid, path: String, kind: IssueKind, message: String) {
        tracing::warn!(%cid, %path, ?kind, %message, "skipping unresolvable node");
        self.issues.push(ResolveIssue {
            cid: cid.clone(),
            path,
            kind,
            message,
        });
    }

    fn halt(&mut self, cid: &DataCid, path: String) {
        if !self.stopped {
            self.stopped = true;
            self.record(
                cid,
                path,
                IssueKind::Cancelled,
                "walk cancelled or deadline passed".to_string(),
            );
        }
    }

    async fn guarded_stat(&mut self, cid: &DataCid) -> Result<NodeStat, CallError> {
        tracing::debug!(%cid, "stat");
        guarded(&self.options, self.cancel.as_mut(), self.accessor.stat(cid)).await
    }

    async fn guarded_links(&mut self, cid: &DataCid) -> Result<Vec<DagLink>, CallError> {
        tracing::debug!(%cid, "links");
        guarded(&self.options, self.cancel.as_mut(), self.accessor.links(cid)).await
    }
}

/// Run one store call under the walk's timeout, deadline and cancel signal
async fn guarded<T>(
    options: &ResolveOptions,
    cancel: Option<&mut watch::Receiver<()>>,
    call: impl Future<Output = Result<T, DagError>>,
) -> Result<T, CallError> {
    if options.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
        return Err(CallError::Cancelled);
    }
    let cancel = match cancel {
        Some(rx) if rx.has_changed().unwrap_or(false) => return Err(CallError::Cancelled),
        other => other,
    };

    let timed = async {
        match options.call_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or(Err(DagError::Timeout)),
            None => call.await,
        }
    };
    let deadline = async {
        match options.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => pending::<()>().await,
        }
    };
    let cancelled = async {
        if let Some(rx) = cancel {
            if rx.changed().await.is_ok() {
                return;
            }
        }
        // no receiver, or a dropped sender, can never cancel us
        pending::<()>().await
    };

    tokio::select! {
        result = timed => result.map_err(CallError::Dag),
        _ = deadline => Err(CallError::Cancelled),
        _ = cancelled => Err(CallError::Cancelled),
    }
}
