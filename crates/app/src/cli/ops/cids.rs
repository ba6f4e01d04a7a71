use clap::Args;

use cidtrack::store::StoreError;

use crate::cli::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct Cids {
    /// Source name to look up
    #[arg(long)]
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CidsError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error("lookup failed: {0}")]
    Store(#[from] StoreError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Cids {
    type Error = CidsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let store = ctx.store()?;
        let cids = store.cids_by_name(&self.name).await?;

        if cids.is_empty() {
            Ok(format!("No CIDs registered under {}", self.name))
        } else {
            Ok(cids
                .iter()
                .map(|cid| cid.to_string())
                .collect::<Vec<_>>()
                .join("\n"))
        }
    }
}
