//! Meta server records
//!
//! The meta server indexes what has been uploaded to the store. A
//!  [`SourceFile`] is the logical upload; it may be split into several
//!  [`SplitFile`]s, each of which carries the [`StorageProvider`] deals
//!  that keep it stored. Everything here is plain serde data; the
//!  transport lives in the app crate.

mod rpc;
mod source_file;

pub use rpc::{methods, JsonRpcRequest, JsonRpcResponse, RpcResult, JSON_RPC_VERSION, RPC_SUCCESS};
pub use source_file::{
    DownloadFileInfo, ListOptions, SourceFile, SourceFilePage, SourceFilePageRequest, SplitFile,
    StorageProvider, StoreSourceFileRequest,
};
