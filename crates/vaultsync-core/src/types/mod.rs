//! Core type definitions used across the VaultSync workspace.

pub mod id;
pub mod lock;
pub mod record;

pub use id::*;
pub use lock::LockHandle;
pub use record::JournalRecord;
