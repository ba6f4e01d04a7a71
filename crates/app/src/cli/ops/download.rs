use std::path::PathBuf;

use clap::Args;

use cidtrack::store::{Delivery, DownloadOutcome, StoreError};
use common::linked_data::DataCid;

use crate::cli::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct Download {
    /// Data CID to download
    #[arg(long, required_unless_present = "name", conflicts_with = "name")]
    pub cid: Option<DataCid>,

    /// Download every CID registered under this name
    #[arg(long)]
    pub name: Option<String>,

    /// Directory to download into
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error("download failed: {0}")]
    Store(#[from] StoreError),
    #[error("pass either --cid or --name")]
    NoTarget,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Download {
    type Error = DownloadError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let store = ctx.store()?;

        let outcomes = match (&self.cid, &self.name) {
            (Some(cid), _) => vec![store.download(cid, &self.out_dir).await?],
            (None, Some(name)) => store.download_by_name(name, &self.out_dir).await?,
            (None, None) => return Err(DownloadError::NoTarget),
        };

        Ok(outcomes
            .iter()
            .map(describe)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

fn describe(outcome: &DownloadOutcome) -> String {
    outcome
        .deliveries
        .iter()
        .map(|delivery| match delivery {
            Delivery::Store { path, issues } if issues.is_empty() => {
                format!("{} -> {}", outcome.data_cid, path.display())
            }
            Delivery::Store { path, issues } => format!(
                "{} -> {} ({} entries could not be fetched)",
                outcome.data_cid,
                path.display(),
                issues.len()
            ),
            Delivery::Manager { path, gid } => format!(
                "{} -> {} (queued with aria2, gid: {})",
                outcome.data_cid,
                path.display(),
                gid
            ),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
