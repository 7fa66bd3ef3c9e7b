//! Block explorer integration
//!
//! Retrieves the verified source of a deployed contract from an
//! Etherscan-compatible `getsourcecode` endpoint.

pub mod client;
pub mod types;

pub use client::ExplorerClient;
pub use types::{ExplorerResponse, RawExplorerPayload, SourceRecord};
