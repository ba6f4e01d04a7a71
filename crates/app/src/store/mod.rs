//! Upload, registration and retrieval of files
//!
//! [`Store`] ties the three collaborators together: the content store
//!  that holds the bytes, the meta server that indexes them, and an
//!  optional download manager for fetching from external URLs. Each
//!  collaborator sits behind a trait so the orchestration can be
//!  exercised without a network.

mod error;
mod local;
#[allow(clippy::module_inception)]
mod store;

use std::path::Path;

use async_trait::async_trait;

use common::dag::DagAccessor;
use common::linked_data::DataCid;
use common::meta::{
    DownloadFileInfo, ListOptions, SourceFile, SourceFilePage, StoreSourceFileRequest,
};
use common::tree::{Resolution, ResolveOptions};

use crate::aria2::{Aria2Client, Aria2Error};
use crate::ipfs::{IpfsClient, IpfsError};
use crate::meta::{MetaClient, MetaError};

pub use error::StoreError;
pub use local::{dir_size, path_kind, LocalPathError, PathKind};
pub use store::{Delivery, DownloadOutcome, Store, UploadReceipt};

/// Where content lives, addressed by identifier
#[async_trait]
pub trait ContentStore: DagAccessor {
    async fn add_file(&self, path: &Path) -> Result<DataCid, IpfsError>;

    async fn add_dir(&self, path: &Path) -> Result<DataCid, IpfsError>;

    /// Write the content behind `cid` to `out_path`
    async fn get(
        &self,
        cid: &DataCid,
        out_path: &Path,
        options: ResolveOptions,
    ) -> Result<Resolution, IpfsError>;
}

/// The index of uploads
#[async_trait]
pub trait MetadataService: Send + Sync {
    async fn store_source_file(&self, request: &StoreSourceFileRequest) -> Result<(), MetaError>;

    async fn get_source_files(
        &self,
        page_num: u32,
        size: u32,
        options: ListOptions,
    ) -> Result<SourceFilePage, MetaError>;

    async fn get_data_cid_by_name(&self, name: &str) -> Result<Vec<DataCid>, MetaError>;

    async fn get_source_file_by_data_cid(&self, cid: &DataCid) -> Result<SourceFile, MetaError>;

    async fn get_download_file_info_by_data_cid(
        &self,
        cid: &DataCid,
    ) -> Result<Vec<DownloadFileInfo>, MetaError>;
}

/// Something that fetches URLs in the background
#[async_trait]
pub trait DownloadManager: Send + Sync {
    /// Queue a download and return the manager's handle for it
    async fn add_uri(&self, url: &str, out_dir: &Path, out_name: &str)
        -> Result<String, Aria2Error>;
}

#[async_trait]
impl ContentStore for IpfsClient {
    async fn add_file(&self, path: &Path) -> Result<DataCid, IpfsError> {
        IpfsClient::add_file(self, path).await
    }

    async fn add_dir(&self, path: &Path) -> Result<DataCid, IpfsError> {
        IpfsClient::add_dir(self, path).await
    }

    async fn get(
        &self,
        cid: &DataCid,
        out_path: &Path,
        options: ResolveOptions,
    ) -> Result<Resolution, IpfsError> {
        IpfsClient::get(self, cid, out_path, options).await
    }
}

#[async_trait]
impl MetadataService for MetaClient {
    async fn store_source_file(&self, request: &StoreSourceFileRequest) -> Result<(), MetaError> {
        MetaClient::store_source_file(self, request).await
    }

    async fn get_source_files(
        &self,
        page_num: u32,
        size: u32,
        options: ListOptions,
    ) -> Result<SourceFilePage, MetaError> {
        MetaClient::get_source_files(self, page_num, size, options).await
    }

    async fn get_data_cid_by_name(&self, name: &str) -> Result<Vec<DataCid>, MetaError> {
        MetaClient::get_data_cid_by_name(self, name).await
    }

    async fn get_source_file_by_data_cid(&self, cid: &DataCid) -> Result<SourceFile, MetaError> {
        MetaClient::get_source_file_by_data_cid(self, cid).await
    }

    async fn get_download_file_info_by_data_cid(
        &self,
        cid: &DataCid,
    ) -> Result<Vec<DownloadFileInfo>, MetaError> {
        MetaClient::get_download_file_info_by_data_cid(self, cid).await
    }
}

#[async_trait]
impl DownloadManager for Aria2Client {
    async fn add_uri(
        &self,
        url: &str,
        out_dir: &Path,
        out_name: &str,
    ) -> Result<String, Aria2Error> {
        Aria2Client::add_uri(self, url, out_dir, out_name).await
    }
}
