//! # recordhub-cache
//!
//! Idempotency result stores for RecordHub. Supports two modes:
//!
//! - **memory**: unbounded [dashmap](https://crates.io/crates/dashmap) map,
//!   purged of expired entries on every lookup
//! - **bounded**: capacity-bounded [moka](https://crates.io/crates/moka)
//!   cache with a time-to-live
//!
//! The store is selected at runtime based on configuration.

#[cfg(feature = "bounded")]
pub mod bounded;
pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;

pub use provider::IdempotencyManager;
