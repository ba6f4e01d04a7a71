use clap::Args;

use cidtrack::store::StoreError;
use common::linked_data::DataCid;

use crate::cli::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct Info {
    /// Data CID to look up
    #[arg(long)]
    pub cid: DataCid,
}

#[derive(Debug, thiserror::Error)]
pub enum InfoError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error("info failed: {0}")]
    Store(#[from] StoreError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Info {
    type Error = InfoError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let store = ctx.store()?;
        let file = store.info(&self.cid).await?;

        let mut lines = vec![
            format!("Name: {}", file.source_name),
            format!("Data CID: {}", file.data_cid),
            format!("Size: {}", file.source_size),
            format!("Directory: {}", file.is_director),
            format!(
                "Download URL: {}",
                if file.download_url.is_empty() {
                    "none"
                } else {
                    file.download_url.as_str()
                }
            ),
        ];
        for split in &file.storage_list {
            lines.push(format!(
                "Split: {} ({}, {} bytes)",
                split.file_name, split.data_cid, split.file_size
            ));
            for provider in &split.storage_providers {
                lines.push(format!(
                    "  {} {} (deal {}, {})",
                    provider.storage_provider_id,
                    provider.storage_status,
                    provider.deal_id,
                    provider.deal_cid
                ));
            }
        }
        Ok(lines.join("\n"))
    }
}
