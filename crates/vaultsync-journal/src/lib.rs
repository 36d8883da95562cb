//! # vaultsync-journal
//!
//! SQLite connection management, the record repository, and the
//! [`SqliteJournal`] implementation of the core `SyncJournal` trait.

pub mod connection;
pub mod journal;
pub mod migration;
pub mod repositories;

pub use connection::JournalPool;
pub use journal::SqliteJournal;
