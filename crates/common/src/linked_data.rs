use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A content identifier as handed out by the store.
///
/// The store is the authority on what a valid identifier looks like,
///  so beyond rejecting blank input this is kept opaque.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct DataCid(String);

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum DataCidError {
    #[error("content identifier is empty")]
    Empty,
    #[error("content identifier contains whitespace: {0:?}")]
    Whitespace(String),
}

impl DataCid {
    pub fn parse(value: impl AsRef<str>) -> Result<Self, DataCidError> {
        let value = value.as_ref().trim();
        if value.is_empty() {
            return Err(DataCidError::Empty);
        }
        if value.chars().any(char::is_whitespace) {
            return Err(DataCidError::Whitespace(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `/ipfs/<cid>` form used by path based store calls
    pub fn ipfs_path(&self) -> String {
        path_join("/ipfs/", &[self.as_str()])
    }
}

impl FromStr for DataCid {
    type Err = DataCidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DataCid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DataCid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<DataCid> for String {
    fn from(cid: DataCid) -> Self {
        cid.0
    }
}

/// Join path segments with exactly one `/` between them.
///
/// Trailing slashes are stripped from the result, so joining
///  onto `/` with no parts yields the empty string.
pub fn path_join(root: &str, parts: &[&str]) -> String {
    let mut joined = root.to_string();
    for part in parts {
        joined = format!(
            "{}/{}",
            joined.trim_end_matches('/'),
            part.trim_start_matches('/')
        );
    }
    joined.trim_end_matches('/').to_string()
}
