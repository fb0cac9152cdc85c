//! # recordhub-hooks
//!
//! Lifecycle hooks for generated operation sets. Provides:
//!
//! - The seven optional hook slots as a typed capability bag ([`HookSet`])
//! - Ordered dispatch with abort semantics for `before_*` hooks
//! - The per-invocation [`OperationContext`] handed to every hook

pub mod context;
pub mod definitions;
pub mod dispatcher;
pub mod set;

pub use context::{OperationContext, OperationContextBuilder, OperationKind};
pub use definitions::{HookFuture, HookPoint};
pub use set::HookSet;
