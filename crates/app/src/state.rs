use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

pub const APP_NAME: &str = "cidtrack";
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key sent to the meta server
    #[serde(default)]
    pub key: String,
    /// API token sent to the meta server
    #[serde(default)]
    pub token: String,
    /// Base URL of the IPFS node's RPC API
    #[serde(default = "default_ipfs_api_url")]
    pub ipfs_api_url: Url,
    /// Public gateway used to build download links for uploads
    #[serde(default = "default_ipfs_gateway_url")]
    pub ipfs_gateway_url: Url,
    /// JSON-RPC endpoint of the meta server
    #[serde(default = "default_meta_server_url")]
    pub meta_server_url: Url,
    /// Which transport downloads should use
    #[serde(default)]
    pub download_preference: DownloadPreference,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Directory for log files (logs to stderr only if not set)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    /// The aria2 download manager, if one is available
    #[serde(default)]
    pub aria2: Option<Aria2Config>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aria2Config {
    #[serde(default = "default_aria2_host")]
    pub host: String,
    #[serde(default = "default_aria2_port")]
    pub port: u16,
    #[serde(default)]
    pub secret: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadPreference {
    /// Use the download manager when there is a URL and a manager,
    ///  otherwise pull from the store
    #[default]
    Auto,
    /// Always pull from the store
    Store,
    /// Always hand off to the download manager
    Manager,
}

fn default_ipfs_api_url() -> Url {
    Url::parse("http://127.0.0.1:5001").expect("hardcoded URL must parse")
}

fn default_ipfs_gateway_url() -> Url {
    Url::parse("http://127.0.0.1:8080").expect("hardcoded URL must parse")
}

fn default_meta_server_url() -> Url {
    Url::parse("http://127.0.0.1:8099/rpc/v0").expect("hardcoded URL must parse")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_aria2_host() -> String {
    "127.0.0.1".to_string()
}

fn default_aria2_port() -> u16 {
    6800
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            token: String::new(),
            ipfs_api_url: default_ipfs_api_url(),
            ipfs_gateway_url: default_ipfs_gateway_url(),
            meta_server_url: default_meta_server_url(),
            download_preference: DownloadPreference::default(),
            log_level: default_log_level(),
            log_dir: None,
            aria2: None,
        }
    }
}

impl AppConfig {
    /// The configured log level, falling back to `info` on nonsense
    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the cidtrack directory (~/.cidtrack)
    pub dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the cidtrack directory path (custom or default ~/.cidtrack)
    pub fn dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new state directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let dir = Self::dir(custom_path)?;
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&dir)?;

        let config = config.unwrap_or_default();
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        Ok(Self {
            dir,
            config_path,
            config,
        })
    }

    /// Load existing state from the cidtrack directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let dir = Self::dir(custom_path)?;

        if !dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_path = dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            dir,
            config_path,
            config,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("cidtrack directory not initialized. Run 'cidtrack init' first")]
    NotInitialized,

    #[error("cidtrack directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
