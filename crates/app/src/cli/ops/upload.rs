use std::path::PathBuf;

use clap::Args;
use url::Url;

use cidtrack::store::StoreError;

use crate::cli::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct Upload {
    /// File or directory to upload
    #[arg(long)]
    pub path: PathBuf,

    /// URL to register instead of a gateway link
    #[arg(long)]
    pub download_url: Option<Url>,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error("upload failed: {0}")]
    Store(#[from] StoreError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Upload {
    type Error = UploadError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let store = ctx.store()?;
        let receipt = store.upload(&self.path, self.download_url.clone()).await?;

        Ok(format!(
            "Uploaded {} ({})\n\
             - Data CID: {}\n\
             - Size: {} bytes\n\
             - Download URL: {}",
            receipt.source_name,
            if receipt.is_dir { "directory" } else { "file" },
            receipt.data_cid,
            receipt.source_size,
            receipt.download_url.as_deref().unwrap_or("none"),
        ))
    }
}
