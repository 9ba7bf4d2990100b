//! Repository layer for database persistence.
//!
//! All database access uses Diesel ORM with compile-time query
//! checking over an async SQLite connection.

pub mod catalog;
pub mod completion;
pub mod migrations;
pub mod observation;
pub mod pool;
mod records;

pub use catalog::CatalogRepository;
pub use completion::CompletionFlagRepository;
pub use observation::{ObservationRepository, CHUNK_SIZE};
pub use pool::{AsyncSqliteConnection, AsyncSqlitePool, DieselError};
pub use records::CompletionFlagRecord;
