//! Storage collaborator trait.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::filter::FilterField;
use crate::types::pagination::RowRange;
use crate::types::query::{Record, SelectQuery};

/// Narrow storage capability parameterized by collection and column names.
///
/// Implementations report failures as [`ErrorKind::Storage`] so they stay
/// distinguishable from an empty result.
///
/// [`ErrorKind::Storage`]: crate::error::ErrorKind::Storage
#[async_trait]
pub trait DataStore: Send + Sync + std::fmt::Debug + 'static {
    /// Projection-select with filters, ordering and range.
    async fn select(&self, query: &SelectQuery) -> AppResult<Vec<Record>>;

    /// Fetch at most one row. Zero rows is `Ok(None)`.
    async fn select_one(&self, query: &SelectQuery) -> AppResult<Option<Record>> {
        let single = query.clone().range(RowRange { from: 0, to: 0 });
        Ok(self.select(&single).await?.into_iter().next())
    }

    /// Insert a row and return it as stored, projected by `projection`.
    async fn insert(&self, collection: &str, row: Record, projection: &str) -> AppResult<Record>;

    /// Apply `patch` to the row matching `scope` and return it.
    ///
    /// Fails with [`ErrorKind::NotFound`](crate::error::ErrorKind::NotFound)
    /// when no row matches.
    async fn update(
        &self,
        collection: &str,
        scope: &[FilterField],
        patch: Record,
        projection: &str,
    ) -> AppResult<Record>;

    /// Delete the rows matching `scope`. Returns the number removed.
    async fn delete(&self, collection: &str, scope: &[FilterField]) -> AppResult<u64>;
}
