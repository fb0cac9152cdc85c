//! Convenience result type alias for RecordHub.

use crate::error::AppError;

/// A specialized `Result` type for RecordHub operations.
pub type AppResult<T> = Result<T, AppError>;
