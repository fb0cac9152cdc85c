//! Downstream cache revalidation trait.

use async_trait::async_trait;

use crate::result::AppResult;

/// Signals downstream consumers that cached views of some paths are stale.
#[async_trait]
pub trait Revalidator: Send + Sync + std::fmt::Debug + 'static {
    /// Invalidate the given paths or tags.
    async fn revalidate(&self, paths: &[String]) -> AppResult<()>;
}
