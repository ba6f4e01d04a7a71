use serde::{Deserialize, Deserializer, Serialize};

use crate::linked_data::DataCid;

/// A logical upload as the meta server knows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    #[serde(default, deserialize_with = "null_as_default")]
    pub source_name: String,
    pub data_cid: DataCid,
    #[serde(default, deserialize_with = "null_as_default")]
    pub download_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub storage_list: Vec<SplitFile>,
    #[serde(default)]
    pub source_size: i64,
    // NOTE: the misspelling is the server's field name
    #[serde(default)]
    pub is_director: bool,
}

/// One physical piece of a source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitFile {
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_name: String,
    pub data_cid: DataCid,
    #[serde(default)]
    pub file_size: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub storage_providers: Vec<StorageProvider>,
}

/// A storage deal held by a provider for one split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageProvider {
    #[serde(default, deserialize_with = "null_as_default")]
    pub storage_provider_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub storage_status: String,
    #[serde(default)]
    pub deal_id: i64,
    /// Proposal cid or uuid, depending on how the deal was made
    #[serde(default, deserialize_with = "null_as_default")]
    pub deal_cid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadFileInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub source_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub download_url: String,
    #[serde(default)]
    pub is_director: bool,
}

impl DownloadFileInfo {
    /// The external URL, if the server has one for this file
    pub fn url(&self) -> Option<&str> {
        let url = self.download_url.trim();
        (!url.is_empty()).then_some(url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSourceFileRequest {
    pub source_name: String,
    pub is_director: bool,
    pub source_size: i64,
    pub data_cid: DataCid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFilePageRequest {
    pub page_num: u32,
    pub size: u32,
    pub show_store: bool,
}

impl SourceFilePageRequest {
    pub fn new(page_num: u32, size: u32, options: ListOptions) -> Self {
        Self {
            page_num,
            size,
            show_store: options.include_storage_status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceFilePage {
    #[serde(default)]
    pub total: i64,
    #[serde(default, rename = "pageCount")]
    pub page_count: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub files: Vec<SourceFile>,
}

/// The meta server writes empty lists (and sometimes strings) as `null`
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Flags recognised when listing source files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListOptions {
    /// Ask the server to include each split's storage deals
    pub include_storage_status: bool,
}
