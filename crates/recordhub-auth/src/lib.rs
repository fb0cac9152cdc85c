//! # recordhub-auth
//!
//! Resolves the owner identity every generated operation is scoped to.
//!
//! - [`tenant::TenantResolver`]: identity, development fallback, profile
//!   indirection
//! - [`provider::StaticAuthProvider`]: fixed or anonymous caller
//! - [`profile::StoreProfileLookup`]: profile ids read through a
//!   [`DataStore`](recordhub_core::traits::DataStore)

pub mod profile;
pub mod provider;
pub mod tenant;

pub use profile::StoreProfileLookup;
pub use provider::StaticAuthProvider;
pub use tenant::{Caller, StoreHandles, TenantResolver, TenantScope};
