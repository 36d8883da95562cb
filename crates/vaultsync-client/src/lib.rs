//! # vaultsync-client
//!
//! Implementations of the core `E2eeApi` trait: [`HttpE2eeClient`] talks
//! to a Nextcloud-compatible server. With the `test-support` feature,
//! `MemoryE2eeServer` keeps all state in process for tests.

pub mod ocs;
pub mod providers;

pub use providers::http::HttpE2eeClient;
#[cfg(any(test, feature = "test-support"))]
pub use providers::memory::{CallCounts, MemoryE2eeServer};
