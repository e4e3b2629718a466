//! # lexicon-store
//!
//! SQLite storage for the dictionary, thesaurus and label tables.
//!
//! ## Core Types
//!
//! - **[`LexiconStore`]**: separate read and write connection pools
//! - **[`StoreConfig`]**: pool sizing and idle timeout
//! - **[`WriteGuard`]**: RAII guard ensuring exclusive write access
//! - **[`Error`]**: error type for store operations
//!
//! ## Architecture
//!
//! - **Dual pools**: a read-only pool for searches and a one-connection writer
//! - **WAL journal**: readers never block on the writer
//! - **No application locks**: pagination reads run against whatever the
//!   table holds at query time

mod config;
mod database;
mod error;
mod write_guard;

pub use config::StoreConfig;
pub use database::LexiconStore;
pub use error::{Error, Result};
pub use write_guard::WriteGuard;
