//! # vaultsync-core
//!
//! Core crate for VaultSync. Contains the unified error system, the
//! end-to-end encryption protocol error taxonomy, configuration schemas,
//! typed identifiers, the lock handle, domain events, and the traits that
//! sit at the seams to the server and the local sync journal.
//!
//! This crate has **no** internal dependencies on other VaultSync crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, E2eeError};
pub use result::AppResult;
