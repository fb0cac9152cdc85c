//! Core traits defined in `recordhub-core` and implemented by other crates.

pub mod auth;
pub mod clock;
pub mod idempotency;
pub mod revalidate;
pub mod storage;

pub use auth::{AuthProvider, ProfileLookup};
pub use clock::{Clock, ManualClock, SystemClock};
pub use idempotency::IdempotencyStore;
pub use revalidate::Revalidator;
pub use storage::DataStore;
