//! # vaultsync-propagator
//!
//! The [`MetadataCoordinator`], through which every metadata mutation of an
//! encrypted folder passes, and the jobs built on it: the
//! [`DeletePropagator`] and the [`FileDropMigration`].

pub mod coordinator;
pub mod delete;
pub mod file_drop;
pub mod lease;
pub mod outcome;

pub use coordinator::MetadataCoordinator;
pub use delete::{DeleteItem, DeletePropagator};
pub use file_drop::{FileDropMigration, MigrationReport};
pub use lease::LockLease;
pub use outcome::{DeleteOutcome, ErrorDetail};
