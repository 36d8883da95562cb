//! Server API implementations.

pub mod http;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;

pub use http::HttpE2eeClient;
#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryE2eeServer;
