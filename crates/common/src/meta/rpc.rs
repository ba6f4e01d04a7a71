use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSON_RPC_VERSION: &str = "2.0";

/// The `code` the meta server answers with when a call went through
pub const RPC_SUCCESS: &str = "success";

pub mod methods {
    pub const STORE_SOURCE_FILE: &str = "StoreSourceFile";
    pub const GET_SOURCE_FILES: &str = "GetSourceFiles";
    pub const GET_DATA_CID_BY_NAME: &str = "GetDataCidByName";
    pub const GET_SOURCE_FILE_BY_DATA_CID: &str = "GetSourceFileByDataCid";
    pub const GET_DOWNLOAD_FILE_INFO_BY_DATA_CID: &str = "GetDownloadFileInfoByDataCid";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Vec<Value>,
    pub id: u64,
}

impl JsonRpcRequest {
    pub fn new(method: impl Into<String>, params: Vec<Value>, id: u64) -> Self {
        Self {
            jsonrpc: JSON_RPC_VERSION.to_string(),
            method: method.into(),
            params,
            id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct JsonRpcResponse<T> {
    #[serde(default)]
    pub jsonrpc: String,
    pub result: RpcResult<T>,
    #[serde(default)]
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct RpcResult<T> {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> RpcResult<T> {
    pub fn is_success(&self) -> bool {
        self.code == RPC_SUCCESS
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_request_envelope() {
        let request = JsonRpcRequest::new(
            methods::GET_DATA_CID_BY_NAME,
            vec![Value::from("report.pdf")],
            7,
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "jsonrpc": "2.0",
                "method": "GetDataCidByName",
                "params": ["report.pdf"],
                "id": 7
            })
        );
    }

    #[test]
    fn test_response_without_data() {
        let raw = r#"{"jsonrpc":"2.0","result":{"code":"fail","message":"no such file"},"id":3}"#;
        let response: JsonRpcResponse<Vec<String>> = serde_json::from_str(raw).unwrap();
        assert!(!response.result.is_success());
        assert_eq!(response.result.message.as_deref(), Some("no such file"));
        assert!(response.result.data.is_none());
    }

    #[test]
    fn test_response_with_data() {
        let raw = r#"{"jsonrpc":"2.0","result":{"code":"success","data":["Qa","Qb"]},"id":3}"#;
        let response: JsonRpcResponse<Vec<String>> = serde_json::from_str(raw).unwrap();
        assert!(response.result.is_success());
        assert_eq!(response.result.data.unwrap(), vec!["Qa", "Qb"]);
    }
}
