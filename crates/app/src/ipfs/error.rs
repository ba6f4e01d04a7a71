use reqwest::StatusCode;

use common::linked_data::DataCidError;
use common::tree::ResolveError;

#[derive(Debug, thiserror::Error)]
pub enum IpfsError {
    #[error("HTTP request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("IPFS returned {0}: {1}")]
    Api(StatusCode, String),
    #[error("could not decode IPFS response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("walking {path}: {source}")]
    Walk {
        path: String,
        source: walkdir::Error,
    },
    #[error("IPFS returned an invalid cid: {0}")]
    InvalidCid(#[from] DataCidError),
    #[error("IPFS add returned no entries")]
    EmptyAdd,
    #[error("refusing to write entry with unsafe name {0:?}")]
    UnsafeName(String),
    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),
}
