//! Core type definitions used across the RecordHub workspace.

pub mod filter;
pub mod pagination;
pub mod query;
pub mod sorting;

pub use filter::{FilterField, FilterOp};
pub use pagination::{PageRequest, RowRange};
pub use query::{Record, SelectQuery};
pub use sorting::{SortDirection, SortField};
