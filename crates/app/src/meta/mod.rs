//! JSON-RPC client for the meta server
//!
//! The meta server keeps the index of everything that was uploaded:
//!  what it was called, how big it was, where it can be fetched from
//!  and which providers hold deals for it.

#[allow(clippy::module_inception)]
mod client;
mod error;

pub use client::MetaClient;
pub use error::MetaError;
