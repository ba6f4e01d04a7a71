use clap::Args;
use url::Url;

use cidtrack::state::{AppConfig, AppState, Aria2Config, DownloadPreference, StateError};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// API key for the meta server
    #[arg(long, default_value = "")]
    pub key: String,

    /// API token for the meta server
    #[arg(long, default_value = "")]
    pub token: String,

    /// IPFS node RPC API
    #[arg(long, default_value = "http://127.0.0.1:5001")]
    pub ipfs_api_url: Url,

    /// Gateway used to build download links for uploads
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    pub ipfs_gateway_url: Url,

    /// Meta server JSON-RPC endpoint
    #[arg(long, default_value = "http://127.0.0.1:8099/rpc/v0")]
    pub meta_server_url: Url,

    /// Hand downloads with a URL to aria2 at this host
    #[arg(long)]
    pub aria2_host: Option<String>,

    /// aria2 RPC port (default: 6800)
    #[arg(long, default_value_t = 6800)]
    pub aria2_port: u16,

    /// aria2 RPC secret
    #[arg(long, default_value = "")]
    pub aria2_secret: String,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let aria2 = self.aria2_host.as_ref().map(|host| Aria2Config {
            host: host.clone(),
            port: self.aria2_port,
            secret: self.aria2_secret.clone(),
        });
        let config = AppConfig {
            key: self.key.clone(),
            token: self.token.clone(),
            ipfs_api_url: self.ipfs_api_url.clone(),
            ipfs_gateway_url: self.ipfs_gateway_url.clone(),
            meta_server_url: self.meta_server_url.clone(),
            download_preference: DownloadPreference::default(),
            aria2,
            ..Default::default()
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        let aria2_str = match &state.config.aria2 {
            Some(aria2) => format!("{}:{}", aria2.host, aria2.port),
            None => "not configured".to_string(),
        };

        let output = format!(
            "Initialized cidtrack directory at: {}\n\
             - Config: {}\n\
             - IPFS API: {}\n\
             - IPFS gateway: {}\n\
             - Meta server: {}\n\
             - aria2: {}",
            state.dir.display(),
            state.config_path.display(),
            state.config.ipfs_api_url,
            state.config.ipfs_gateway_url,
            state.config.meta_server_url,
            aria2_str
        );

        Ok(output)
    }
}
