use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use common::linked_data::DataCid;
use common::meta::{
    methods, DownloadFileInfo, JsonRpcRequest, JsonRpcResponse, ListOptions, SourceFile,
    SourceFilePage, SourceFilePageRequest, StoreSourceFileRequest,
};

use super::error::MetaError;

const API_KEY_HEADER: &str = "api-key";
const API_TOKEN_HEADER: &str = "api-token";

#[derive(Debug, Clone)]
pub struct MetaClient {
    pub remote: Url,
    client: Client,
    next_id: Arc<AtomicU64>,
}

impl MetaClient {
    pub fn new(remote: &Url, key: &str, token: &str) -> Result<Self, MetaError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        default_headers.insert(API_KEY_HEADER, header_value(API_KEY_HEADER, key)?);
        default_headers.insert(API_TOKEN_HEADER, header_value(API_TOKEN_HEADER, token)?);
        let client = Client::builder().default_headers(default_headers).build()?;

        Ok(Self {
            remote: remote.clone(),
            client,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Option<T>, MetaError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(method, params, id);
        tracing::debug!(method, id, "meta server call");

        let response = self
            .client
            .post(self.remote.clone())
            .json(&request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(MetaError::HttpStatus(
                response.status(),
                response.text().await?,
            ));
        }

        let body = response.bytes().await?;
        let response: JsonRpcResponse<T> = serde_json::from_slice(&body)?;
        into_data(method, response)
    }

    async fn call_for<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, MetaError> {
        self.call(method, params)
            .await?
            .ok_or_else(|| MetaError::MissingData(method.to_string()))
    }

    /// Register an upload with the meta server
    pub async fn store_source_file(
        &self,
        request: &StoreSourceFileRequest,
    ) -> Result<(), MetaError> {
        self.call::<Value>(methods::STORE_SOURCE_FILE, vec![to_param(request)?])
            .await?;
        Ok(())
    }

    pub async fn get_source_files(
        &self,
        page_num: u32,
        size: u32,
        options: ListOptions,
    ) -> Result<SourceFilePage, MetaError> {
        let request = SourceFilePageRequest::new(page_num, size, options);
        self.call_for(methods::GET_SOURCE_FILES, vec![to_param(&request)?])
            .await
    }

    /// Every identifier registered under `name`
    pub async fn get_data_cid_by_name(&self, name: &str) -> Result<Vec<DataCid>, MetaError> {
        // a name nobody uploaded is an empty answer, not an error
        Ok(self
            .call(methods::GET_DATA_CID_BY_NAME, vec![Value::from(name)])
            .await?
            .unwrap_or_default())
    }

    pub async fn get_source_file_by_data_cid(
        &self,
        cid: &DataCid,
    ) -> Result<SourceFile, MetaError> {
        self.call_for(
            methods::GET_SOURCE_FILE_BY_DATA_CID,
            vec![Value::from(cid.as_str())],
        )
        .await
    }

    pub async fn get_download_file_info_by_data_cid(
        &self,
        cid: &DataCid,
    ) -> Result<Vec<DownloadFileInfo>, MetaError> {
        Ok(self
            .call(
                methods::GET_DOWNLOAD_FILE_INFO_BY_DATA_CID,
                vec![Value::from(cid.as_str())],
            )
            .await?
            .unwrap_or_default())
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, MetaError> {
    HeaderValue::from_str(value).map_err(|_| MetaError::InvalidHeader(name.to_string()))
}

fn to_param<T: Serialize>(value: &T) -> Result<Value, MetaError> {
    Ok(serde_json::to_value(value)?)
}

/// Unwrap the envelope, turning a non-success code into an error
fn into_data<T>(method: &str, response: JsonRpcResponse<T>) -> Result<Option<T>, MetaError> {
    let result = response.result;
    if !result.is_success() {
        return Err(MetaError::Rpc {
            method: method.to_string(),
            code: result.code,
            message: result.message.unwrap_or_default(),
        });
    }
    Ok(result.data)
}
