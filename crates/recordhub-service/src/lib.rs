//! # recordhub-service
//!
//! Builds the operation set for one collection: list, get_one, create,
//! update, delete, archive and unarchive, each scoped to the caller's
//! owner identity.
//!
//! ```text
//! CrudFactory::new("contacts", insert_schema, update_schema)
//!     .config(factory_config)
//!     .hooks(hooks)
//!     .build(tenant_resolver)?  ->  CrudOperations
//! ```

pub mod factory;
pub mod notifier;
pub mod operations;
pub mod validation;

pub use factory::CrudFactory;
pub use notifier::{BroadcastRevalidator, RevalidationNotifier};
pub use operations::{CrudOperations, ListOptions, RecordType};
pub use validation::{PassthroughSchema, Schema, ValidatedSchema};
