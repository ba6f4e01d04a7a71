use clap::Args;

use cidtrack::store::StoreError;
use common::meta::{ListOptions, SourceFile};

use crate::cli::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct List {
    /// Page to show, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Entries per page
    #[arg(long, default_value_t = 20)]
    pub size: u32,

    /// Include each split's storage deals
    #[arg(long)]
    pub show_storage: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error("list failed: {0}")]
    Store(#[from] StoreError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for List {
    type Error = ListError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let store = ctx.store()?;
        let options = ListOptions {
            include_storage_status: self.show_storage,
        };
        let page = store.list(self.page, self.size, options).await?;

        if page.files.is_empty() {
            return Ok("No source files found".to_string());
        }

        let mut lines: Vec<String> = page
            .files
            .iter()
            .flat_map(|file| format_file(file, self.show_storage))
            .collect();
        lines.push(format!(
            "page {} of {} ({} files)",
            self.page, page.page_count, page.total
        ));
        Ok(lines.join("\n"))
    }
}

fn format_file(file: &SourceFile, show_storage: bool) -> Vec<String> {
    let mut lines = vec![format!(
        "{} (cid: {} | size: {}{})",
        file.source_name,
        file.data_cid,
        file.source_size,
        if file.is_director { " | dir" } else { "" }
    )];
    if show_storage {
        for split in &file.storage_list {
            lines.push(format!("  {} ({})", split.file_name, split.data_cid));
            for provider in &split.storage_providers {
                lines.push(format!(
                    "    {} {} deal {}",
                    provider.storage_provider_id, provider.storage_status, provider.deal_id
                ));
            }
        }
    }
    lines
}
