use std::error::Error;
use std::path::PathBuf;

use cidtrack::aria2::{Aria2Client, Aria2Error};
use cidtrack::ipfs::{IpfsClient, IpfsError};
use cidtrack::meta::{MetaClient, MetaError};
use cidtrack::state::{AppState, StateError};
use cidtrack::store::Store;

/// The store as wired from config: IPFS for content, the meta server
///  for the index, and aria2 when one is configured.
pub type AppStore = Store<IpfsClient, MetaClient, Aria2Client>;

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("failed to create IPFS client: {0}")]
    Ipfs(#[from] IpfsError),
    #[error("failed to create meta server client: {0}")]
    Meta(#[from] MetaError),
    #[error("failed to create aria2 client: {0}")]
    Aria2(#[from] Aria2Error),
}

#[derive(Debug, Clone)]
pub struct OpContext {
    /// Optional custom config path (defaults to ~/.cidtrack)
    pub config_path: Option<PathBuf>,
}

impl OpContext {
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self { config_path }
    }

    pub fn state(&self) -> Result<AppState, StateError> {
        AppState::load(self.config_path.clone())
    }

    /// Build the store from the saved config
    pub fn store(&self) -> Result<AppStore, ContextError> {
        let config = self.state()?.config;

        let ipfs = IpfsClient::new(&config.ipfs_api_url)?;
        let meta = MetaClient::new(&config.meta_server_url, &config.key, &config.token)?;
        let aria2 = config.aria2.as_ref().map(Aria2Client::new).transpose()?;

        Ok(Store::new(ipfs, meta, aria2)
            .with_preference(config.download_preference)
            .with_gateway(config.ipfs_gateway_url))
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::cli::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::cli::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
