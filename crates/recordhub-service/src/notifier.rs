//! Best-effort revalidation after successful mutations.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use recordhub_core::result::AppResult;
use recordhub_core::traits::revalidate::Revalidator;

/// Sends the configured paths to a revalidator and swallows any failure.
#[derive(Debug, Clone)]
pub struct RevalidationNotifier {
    /// Downstream revalidator, if any.
    revalidator: Option<Arc<dyn Revalidator>>,
    /// Paths or tags sent on every notification.
    paths: Vec<String>,
}

impl RevalidationNotifier {
    /// Creates a notifier.
    pub fn new(revalidator: Option<Arc<dyn Revalidator>>, paths: Vec<String>) -> Self {
        Self { revalidator, paths }
    }

    /// Paths sent on every notification.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Signals the revalidator. Never fails.
    pub async fn notify(&self) {
        let Some(revalidator) = &self.revalidator else {
            debug!(paths = ?self.paths, "No revalidator configured, skipping");
            return;
        };
        if let Err(e) = revalidator.revalidate(&self.paths).await {
            warn!(paths = ?self.paths, error = %e, "Revalidation failed, ignoring");
        }
    }
}

/// Publishes revalidated paths to in-process subscribers.
#[derive(Debug, Clone)]
pub struct BroadcastRevalidator {
    /// Broadcast sender for path batches.
    sender: broadcast::Sender<Vec<String>>,
}

impl BroadcastRevalidator {
    /// Creates a revalidator buffering up to `capacity` batches per
    /// subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to path batches.
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<String>> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl Revalidator for BroadcastRevalidator {
    async fn revalidate(&self, paths: &[String]) -> AppResult<()> {
        match self.sender.send(paths.to_vec()) {
            Ok(receivers) => debug!(receivers, paths = ?paths, "Broadcast revalidation"),
            // No subscribers.
            Err(_) => debug!(paths = ?paths, "No revalidation subscribers"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recordhub_core::error::AppError;

    #[derive(Debug)]
    struct FailingRevalidator;

    #[async_trait]
    impl Revalidator for FailingRevalidator {
        async fn revalidate(&self, _paths: &[String]) -> AppResult<()> {
            Err(AppError::internal("cache unreachable"))
        }
    }

    #[tokio::test]
    async fn test_broadcast_delivers_paths() {
        let revalidator = BroadcastRevalidator::new(8);
        let mut rx = revalidator.subscribe();
        let notifier = RevalidationNotifier::new(
            Some(Arc::new(revalidator.clone())),
            vec!["/contacts".to_string()],
        );

        notifier.notify().await;
        assert_eq!(rx.recv().await.unwrap(), vec!["/contacts".to_string()]);
    }

    #[tokio::test]
    async fn test_failures_and_missing_revalidator_are_swallowed() {
        let failing = RevalidationNotifier::new(Some(Arc::new(FailingRevalidator)), vec![]);
        failing.notify().await;

        let none = RevalidationNotifier::new(None, vec!["/x".to_string()]);
        none.notify().await;
        assert_eq!(none.paths().to_vec(), vec!["/x".to_string()]);
    }
}
