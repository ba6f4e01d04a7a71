// Clients for the three remote services
pub mod aria2;
pub mod ipfs;
pub mod meta;

// Orchestration over the clients
pub mod store;

// App state (configuration, paths) and process setup
pub mod logging;
pub mod state;

pub use state::{AppConfig, AppState, Aria2Config, DownloadPreference, StateError};
pub use store::{Store, StoreError};
