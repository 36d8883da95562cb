//! Core traits defined in `vaultsync-core` and implemented by other crates.

pub mod api;
pub mod journal;

pub use api::{DeleteResponse, E2eeApi};
pub use journal::SyncJournal;
