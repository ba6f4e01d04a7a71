//! Client for an IPFS node's RPC API
//!
//! Only the handful of calls this tool needs are wrapped: stat, DAG
//!  link listing, adding files and directories, copying into the
//!  node's mutable filesystem, and streaming content back out.

#[allow(clippy::module_inception)]
mod client;
mod error;
mod types;

pub use client::IpfsClient;
pub(crate) use client::safe_name;
pub use error::IpfsError;
pub use types::{AddEntry, DagGetResponse, FilesStat, IpfsLink};
