use std::time::Duration;

use clap::Args;
use tokio::sync::watch;
use tokio::time::Instant;

use cidtrack::store::StoreError;
use common::linked_data::DataCid;
use common::tree::{ResolveOptions, DEFAULT_MAX_DEPTH};

use crate::cli::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct Tree {
    /// Root CID to resolve
    #[arg(long)]
    pub cid: DataCid,

    /// Directories this deep are listed but not expanded
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Give up on any single node lookup after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Stop the whole walk after this many seconds and print what was found
    #[arg(long)]
    pub deadline_secs: Option<u64>,

    /// Leave out directories whose contents could not be listed
    #[arg(long)]
    pub prune: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error("tree failed: {0}")]
    Store(#[from] StoreError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Tree {
    type Error = TreeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let store = ctx.store()?;
        let options = ResolveOptions {
            max_depth: self.max_depth,
            call_timeout: self.timeout_secs.map(Duration::from_secs),
            deadline: self
                .deadline_secs
                .map(|secs| Instant::now() + Duration::from_secs(secs)),
            prune_unexpanded: self.prune,
        };

        // Ctrl-C stops the walk and prints the partial tree
        let (cancel_tx, cancel_rx) = watch::channel(());
        let ctrl_c = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::debug!("interrupted, stopping tree walk");
                let _ = cancel_tx.send(());
            }
        });
        let result = store.tree(&self.cid, options, Some(cancel_rx)).await;
        ctrl_c.abort();
        let resolution = result?;

        let mut output = resolution.root.print_all();
        if !resolution.is_complete() {
            output.push_str(&format!(
                "\n\n{} node(s) could not be resolved:",
                resolution.issues.len()
            ));
            for issue in &resolution.issues {
                output.push_str(&format!(
                    "\n  {} at {}: {}",
                    issue.cid, issue.path, issue.message
                ));
            }
        }
        Ok(output)
    }
}
