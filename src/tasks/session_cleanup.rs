use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::broadcast;

use crate::config::SessionConfig;
use crate::session::SessionStore;

/// Background task evicting sessions older than the configured age
pub struct SessionCleanupTask {
    config: SessionConfig,
    store: Arc<SessionStore>,
    shutdown: broadcast::Receiver<()>,
}

impl SessionCleanupTask {
    pub fn new(
        config: SessionConfig,
        store: Arc<SessionStore>,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            config,
            store,
            shutdown,
        }
    }

    /// Run the eviction sweep until shutdown
    pub async fn run(mut self) {
        let cleanup_interval = Duration::from_secs(self.config.cleanup_interval_secs.max(1));
        let mut cleanup_timer = tokio::time::interval(cleanup_interval);

        // Skip immediate first tick
        cleanup_timer.tick().await;

        tracing::info!(
            cleanup_interval_secs = self.config.cleanup_interval_secs,
            max_age_secs = self.config.max_age_secs,
            "Session cleanup task started"
        );

        loop {
            tokio::select! {
                _ = self.shutdown.recv() => {
                    tracing::info!("Session cleanup task received shutdown signal");
                    break;
                }
                _ = cleanup_timer.tick() => {
                    self.sweep();
                }
            }
        }

        tracing::info!("Session cleanup task stopped");
    }

    /// Evict sessions created more than `max_age_secs` ago
    pub fn sweep(&self) -> usize {
        let Some(cutoff) = eviction_cutoff(Utc::now(), self.config.max_age_secs) else {
            tracing::debug!(
                max_age_secs = self.config.max_age_secs,
                "Session max age exceeds the representable time range, skipping sweep"
            );
            return 0;
        };
        let evicted = self.store.evict_created_before(cutoff);

        if evicted > 0 {
            tracing::info!(evicted, "Session cleanup completed");
        } else {
            tracing::debug!("Session cleanup found nothing to evict");
        }

        evicted
    }
}

/// `now - max_age_secs`, or `None` when that falls outside the time range
fn eviction_cutoff(now: DateTime<Utc>, max_age_secs: u64) -> Option<DateTime<Utc>> {
    let secs = i64::try_from(max_age_secs).ok()?;
    now.checked_sub_signed(TimeDelta::try_seconds(secs)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionUpdate;

    #[tokio::test]
    async fn test_cleanup_task_shutdown() {
        let store = Arc::new(SessionStore::new());
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let task = SessionCleanupTask::new(SessionConfig::default(), store, shutdown_rx);

        let handle = tokio::spawn(async move {
            task.run().await;
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown_tx.send(()).unwrap();

        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("Task should complete")
            .expect("Task should not panic");
    }

    #[tokio::test]
    async fn test_sweep_respects_max_age() {
        let store = Arc::new(SessionStore::new());
        let session = store.create();
        store
            .update(
                session.id,
                SessionUpdate {
                    current_step: Some(2),
                    ..Default::default()
                },
            )
            .unwrap();
        let (_tx, rx) = broadcast::channel(1);

        let task = SessionCleanupTask::new(SessionConfig::default(), store.clone(), rx);
        assert_eq!(task.sweep(), 0);
        assert_eq!(store.len(), 1);

        let (_tx, rx) = broadcast::channel(1);
        let config = SessionConfig {
            max_age_secs: 0,
            ..Default::default()
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        let task = SessionCleanupTask::new(config, store.clone(), rx);
        assert_eq!(task.sweep(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_huge_max_age_skips_sweep() {
        let store = Arc::new(SessionStore::new());
        store.create();
        let (_tx, rx) = broadcast::channel(1);

        for max_age_secs in [10_000_000_000_000, u64::MAX] {
            let config = SessionConfig {
                max_age_secs,
                ..Default::default()
            };
            let task = SessionCleanupTask::new(config, store.clone(), rx.resubscribe());
            assert_eq!(task.sweep(), 0);
        }
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_eviction_cutoff_bounds() {
        let now = Utc::now();
        assert_eq!(eviction_cutoff(now, 60), Some(now - TimeDelta::seconds(60)));
        assert_eq!(eviction_cutoff(now, 0), Some(now));
        assert!(eviction_cutoff(now, 10_000_000_000_000).is_none());
        assert!(eviction_cutoff(now, u64::MAX).is_none());
    }
}
