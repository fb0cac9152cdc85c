//! # recordhub-database
//!
//! Implementations of the [`DataStore`](recordhub_core::traits::DataStore)
//! collaborator:
//!
//! - [`memory::MemoryDataStore`]: process-local tables, used by tests and
//!   local development
//! - `postgres::PgDataStore`: sqlx-backed PostgreSQL adapter with its own
//!   pool (feature `postgres`)

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod projection;

pub use memory::MemoryDataStore;
#[cfg(feature = "postgres")]
pub use postgres::PgDataStore;
