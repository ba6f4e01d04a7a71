use common::linked_data::DataCid;
use common::tree::ResolveError;

use crate::aria2::Aria2Error;
use crate::ipfs::IpfsError;
use crate::meta::MetaError;

use super::local::LocalPathError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("local path error: {0}")]
    LocalPath(#[from] LocalPathError),
    #[error("content store error: {0}")]
    Ipfs(#[from] IpfsError),
    #[error("meta server error: {0}")]
    Meta(#[from] MetaError),
    #[error("download manager error: {0}")]
    Aria2(#[from] Aria2Error),
    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("meta server has no download info for {0}")]
    NoDownloadInfo(DataCid),
    #[error("no identifier is registered under the name {0:?}")]
    UnknownName(String),
    #[error("{name} is {size} bytes, more than the meta server can record")]
    SizeOverflow { name: String, size: u64 },
    #[error("cannot hand {name} to the download manager: {reason}")]
    ManagerUnavailable { name: String, reason: String },
}
