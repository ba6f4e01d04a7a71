use std::path::{Path, PathBuf};

use tokio::sync::watch;
use url::Url;

use common::linked_data::{path_join, DataCid};
use common::meta::{DownloadFileInfo, ListOptions, SourceFile, SourceFilePage, StoreSourceFileRequest};
use common::tree::{Resolution, ResolveIssue, ResolveOptions, Resolver};

use crate::ipfs::safe_name;
use crate::state::DownloadPreference;

use super::error::StoreError;
use super::local::{dir_size, path_kind, LocalPathError, PathKind};
use super::{ContentStore, DownloadManager, MetadataService};

/// What the meta server was told about an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub data_cid: DataCid,
    pub source_name: String,
    pub source_size: u64,
    pub is_dir: bool,
    pub download_url: Option<String>,
}

#[derive(Debug, Clone)]
pub enum Delivery {
    /// Written to disk from the content store
    Store {
        path: PathBuf,
        /// Entries that could not be fetched
        issues: Vec<ResolveIssue>,
    },
    /// Queued with the download manager
    Manager { path: PathBuf, gid: String },
}

#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    pub data_cid: DataCid,
    pub deliveries: Vec<Delivery>,
}

enum Route<'a, D> {
    Store,
    Manager(&'a D, &'a str),
}

pub struct Store<C, M, D> {
    content: C,
    meta: M,
    manager: Option<D>,
    preference: DownloadPreference,
    gateway: Option<Url>,
    resolve_options: ResolveOptions,
}

impl<C, M, D> Store<C, M, D>
where
    C: ContentStore,
    M: MetadataService,
    D: DownloadManager,
{
    pub fn new(content: C, meta: M, manager: Option<D>) -> Self {
        Self {
            content,
            meta,
            manager,
            preference: DownloadPreference::default(),
            gateway: None,
            resolve_options: ResolveOptions::default(),
        }
    }

    pub fn with_preference(mut self, preference: DownloadPreference) -> Self {
        self.preference = preference;
        self
    }

    /// Uploads registered without an explicit URL get one on this gateway
    pub fn with_gateway(mut self, gateway: Url) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Options used when downloads are pulled from the content store
    pub fn with_resolve_options(mut self, options: ResolveOptions) -> Self {
        self.resolve_options = options;
        self
    }

    pub fn content(&self) -> &C {
        &self.content
    }

    /// Add `local_path` to the content store and register it with the
    ///  meta server.
    pub async fn upload(
        &self,
        local_path: &Path,
        download_url: Option<Url>,
    ) -> Result<UploadReceipt, StoreError> {
        let kind = path_kind(local_path)?;
        let source_name = source_name(local_path)?;
        // sized up front so an unrecordable upload never reaches the store
        let source_size = dir_size(local_path)?;
        let registered = registered_size(&source_name, source_size)?;

        let data_cid = match kind {
            PathKind::File => self.content.add_file(local_path).await?,
            PathKind::Directory => self.content.add_dir(local_path).await?,
        };
        tracing::debug!(%data_cid, %source_name, source_size, "added to content store");

        let download_url = download_url.map(String::from).or_else(|| {
            self.gateway
                .as_ref()
                .map(|gateway| path_join(gateway.as_str(), &["ipfs", data_cid.as_str()]))
        });
        let is_dir = kind == PathKind::Directory;
        let request = StoreSourceFileRequest {
            source_name: source_name.clone(),
            is_director: is_dir,
            source_size: registered,
            data_cid: data_cid.clone(),
            download_url: download_url.clone(),
        };
        self.meta.store_source_file(&request).await?;
        tracing::info!(%data_cid, %source_name, "upload registered");

        Ok(UploadReceipt {
            data_cid,
            source_name,
            source_size,
            is_dir,
            download_url,
        })
    }

    /// Fetch everything the meta server knows under `data_cid` into `out_dir`.
    ///
    /// Each download info lands at `out_dir/<source name>`.
    pub async fn download(
        &self,
        data_cid: &DataCid,
        out_dir: &Path,
    ) -> Result<DownloadOutcome, StoreError> {
        let infos = self
            .meta
            .get_download_file_info_by_data_cid(data_cid)
            .await?;
        if infos.is_empty() {
            return Err(StoreError::NoDownloadInfo(data_cid.clone()));
        }

        tokio::fs::create_dir_all(out_dir).await?;
        let mut deliveries = Vec::with_capacity(infos.len());
        for info in &infos {
            let name = safe_name(&info.source_name)?;
            let path = out_dir.join(name);

            let delivery = match self.route(info)? {
                Route::Manager(manager, url) => {
                    let gid = manager.add_uri(url, out_dir, name).await?;
                    tracing::info!(%data_cid, %gid, url, "download queued with manager");
                    Delivery::Manager { path, gid }
                }
                Route::Store => {
                    let resolution = self
                        .content
                        .get(data_cid, &path, self.resolve_options.clone())
                        .await?;
                    tracing::info!(%data_cid, path = %path.display(), "downloaded from content store");
                    Delivery::Store {
                        path,
                        issues: resolution.issues,
                    }
                }
            };
            deliveries.push(delivery);
        }

        Ok(DownloadOutcome {
            data_cid: data_cid.clone(),
            deliveries,
        })
    }

    /// Download every identifier registered under `name`
    pub async fn download_by_name(
        &self,
        name: &str,
        out_dir: &Path,
    ) -> Result<Vec<DownloadOutcome>, StoreError> {
        let cids = self.cids_by_name(name).await?;
        if cids.is_empty() {
            return Err(StoreError::UnknownName(name.to_string()));
        }

        let mut outcomes = Vec::with_capacity(cids.len());
        for cid in &cids {
            outcomes.push(self.download(cid, out_dir).await?);
        }
        Ok(outcomes)
    }

    pub async fn list(
        &self,
        page_num: u32,
        size: u32,
        options: ListOptions,
    ) -> Result<SourceFilePage, StoreError> {
        Ok(self.meta.get_source_files(page_num, size, options).await?)
    }

    pub async fn info(&self, data_cid: &DataCid) -> Result<SourceFile, StoreError> {
        Ok(self.meta.get_source_file_by_data_cid(data_cid).await?)
    }

    pub async fn cids_by_name(&self, name: &str) -> Result<Vec<DataCid>, StoreError> {
        Ok(self.meta.get_data_cid_by_name(name).await?)
    }

    /// Resolve the directory tree beneath `data_cid` from the content store
    pub async fn tree(
        &self,
        data_cid: &DataCid,
        options: ResolveOptions,
        cancel: Option<watch::Receiver<()>>,
    ) -> Result<Resolution, StoreError> {
        let mut resolver = Resolver::new(&self.content).with_options(options);
        if let Some(cancel) = cancel {
            resolver = resolver.with_cancel(cancel);
        }
        Ok(resolver.resolve(data_cid).await?)
    }

    fn route<'a>(&'a self, info: &'a DownloadFileInfo) -> Result<Route<'a, D>, StoreError> {
        match self.preference {
            DownloadPreference::Store => Ok(Route::Store),
            DownloadPreference::Manager => {
                let manager = self.manager.as_ref().ok_or_else(|| {
                    manager_unavailable(info, "no download manager is configured")
                })?;
                let url = info
                    .url()
                    .ok_or_else(|| manager_unavailable(info, "the meta server has no URL for it"))?;
                Ok(Route::Manager(manager, url))
            }
            // a directory URL is a gateway listing, not something to fetch whole
            DownloadPreference::Auto => match (self.manager.as_ref(), info.url()) {
                (Some(manager), Some(url)) if !info.is_director => Ok(Route::Manager(manager, url)),
                _ => Ok(Route::Store),
            },
        }
    }
}

fn manager_unavailable(info: &DownloadFileInfo, reason: &str) -> StoreError {
    StoreError::ManagerUnavailable {
        name: info.source_name.clone(),
        reason: reason.to_string(),
    }
}

/// The meta server stores sizes as signed 64-bit integers
fn registered_size(source_name: &str, size: u64) -> Result<i64, StoreError> {
    i64::try_from(size).map_err(|_| StoreError::SizeOverflow {
        name: source_name.to_string(),
        size,
    })
}

/// The name an upload is registered under: the last component of its path
fn source_name(path: &Path) -> Result<String, LocalPathError> {
    let canonical = std::fs::canonicalize(path).map_err(|source| LocalPathError::Io {
        path: path.display().to_string(),
        source,
    })?;
    match canonical.file_name() {
        Some(name) => Ok(name.to_string_lossy().to_string()),
        None => Err(LocalPathError::UnknownType(path.display().to_string())),
    }
}
