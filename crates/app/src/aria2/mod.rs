//! Hand-off of downloads to an aria2 daemon over its JSON-RPC interface

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::state::Aria2Config;

const ADD_URI: &str = "aria2.addUri";

#[derive(Debug, thiserror::Error)]
pub enum Aria2Error {
    #[error("HTTP request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("aria2 sent no response")]
    NoResponse,
    #[error("aria2 rejected the download: {0}")]
    Rpc(String),
    #[error("aria2 accepted the download but returned no gid")]
    NoGid,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct AddUriResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Clone)]
pub struct Aria2Client {
    pub remote: Url,
    secret: String,
    client: Client,
    next_id: Arc<AtomicU64>,
}

impl Aria2Client {
    pub fn new(config: &Aria2Config) -> Result<Self, Aria2Error> {
        let remote = Url::parse(&format!("http://{}:{}/jsonrpc", config.host, config.port))?;
        Ok(Self {
            remote,
            secret: config.secret.clone(),
            client: Client::builder().build()?,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Queue `url` for download into `out_dir/out_name`.
    ///
    /// Returns the gid aria2 assigned to the download.
    pub async fn add_uri(
        &self,
        url: &str,
        out_dir: &Path,
        out_name: &str,
    ) -> Result<String, Aria2Error> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "method": ADD_URI,
            "id": id.to_string(),
            "params": add_uri_params(&self.secret, url, out_dir, out_name),
        });
        tracing::debug!(url, out_name, id, "handing download to aria2");

        let body = self
            .client
            .post(self.remote.clone())
            .json(&request)
            .send()
            .await?
            .text()
            .await?;
        interpret_add_uri(&body)
    }
}

fn add_uri_params(secret: &str, url: &str, out_dir: &Path, out_name: &str) -> Vec<Value> {
    let mut params = Vec::with_capacity(3);
    if !secret.is_empty() {
        params.push(Value::from(format!("token:{}", secret)));
    }
    params.push(json!([url]));
    params.push(json!({
        "dir": out_dir.to_string_lossy(),
        "out": out_name,
    }));
    params
}

/// aria2 reports failures in the body, often with a non-2xx status,
///  so the body is read whatever the status was.
fn interpret_add_uri(body: &str) -> Result<String, Aria2Error> {
    if body.trim().is_empty() {
        return Err(Aria2Error::NoResponse);
    }
    let response: AddUriResponse = serde_json::from_str(body)
        .map_err(|err| Aria2Error::Rpc(format!("unreadable response: {}", err)))?;

    if let Some(error) = response.error {
        return Err(Aria2Error::Rpc(format!("{} (code {})", error.message, error.code)));
    }
    match response.result {
        Some(gid) if !gid.is_empty() => Ok(gid),
        _ => Err(Aria2Error::NoGid),
    }
}
