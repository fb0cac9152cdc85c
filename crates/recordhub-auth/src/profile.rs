//! Profile lookup through the data store.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use recordhub_core::config::AuthConfig;
use recordhub_core::result::AppResult;
use recordhub_core::traits::auth::ProfileLookup;
use recordhub_core::traits::storage::DataStore;
use recordhub_core::types::query::SelectQuery;

/// Reads `id` from the profile collection row whose user column matches.
#[derive(Debug, Clone)]
pub struct StoreProfileLookup {
    store: Arc<dyn DataStore>,
    collection: String,
    user_column: String,
}

impl StoreProfileLookup {
    /// Creates a lookup on the configured profile collection.
    pub fn new(store: Arc<dyn DataStore>, config: &AuthConfig) -> Self {
        Self {
            store,
            collection: config.profile_collection.clone(),
            user_column: config.profile_user_column.clone(),
        }
    }
}

#[async_trait]
impl ProfileLookup for StoreProfileLookup {
    async fn profile_id(&self, user_id: &str) -> AppResult<Option<String>> {
        let query = SelectQuery::new(&self.collection)
            .select("id")
            .eq(&self.user_column, user_id);
        let row = self.store.select_one(&query).await?;
        Ok(row.and_then(|r| match r.get("id") {
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        }))
    }
}
