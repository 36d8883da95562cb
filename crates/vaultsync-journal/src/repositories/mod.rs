//! Concrete repository implementations.

pub mod record;

pub use record::RecordRepository;
