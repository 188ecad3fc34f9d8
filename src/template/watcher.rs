//! Template change observation (hot reload).
//!
//! The polling watcher snapshots the template directory on an interval and
//! invalidates cache entries whose files were modified, added or removed.
//! It only ever calls `TemplateStore::invalidate`, so a render racing with a
//! poll may return the previous content once.

use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::TemplateConfig;

use super::store::{template_name, TemplateStore};

/// Modification stamp of a template file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub modified: Option<SystemTime>,
    pub len: u64,
}

/// Template name to file stamp
pub type Snapshot = HashMap<String, FileStamp>;

/// A detected change to a template file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateChange {
    Added(String),
    Modified(String),
    Removed(String),
}

impl TemplateChange {
    pub fn name(&self) -> &str {
        match self {
            TemplateChange::Added(name)
            | TemplateChange::Modified(name)
            | TemplateChange::Removed(name) => name,
        }
    }
}

/// Capability to observe template files and invalidate the cache
#[async_trait]
pub trait TemplateWatcher: Send + Sync {
    /// Whether this watcher performs any observation
    fn is_enabled(&self) -> bool;

    /// Start observing. Returns `None` when hot reload is unavailable.
    async fn start(
        &self,
        store: Arc<TemplateStore>,
        shutdown: broadcast::Receiver<()>,
    ) -> Option<JoinHandle<()>>;
}

/// Watcher used when hot reload is disabled
pub struct NoopWatcher;

#[async_trait]
impl TemplateWatcher for NoopWatcher {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn start(
        &self,
        _store: Arc<TemplateStore>,
        _shutdown: broadcast::Receiver<()>,
    ) -> Option<JoinHandle<()>> {
        tracing::info!("Template hot reload disabled");
        None
    }
}

/// Watcher that polls the template directory
pub struct PollingWatcher {
    interval: Duration,
}

impl PollingWatcher {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

#[async_trait]
impl TemplateWatcher for PollingWatcher {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn start(
        &self,
        store: Arc<TemplateStore>,
        shutdown: broadcast::Receiver<()>,
    ) -> Option<JoinHandle<()>> {
        let snapshot = match scan_templates(store.dir()).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    dir = %store.dir().display(),
                    "Failed to scan templates, hot reload disabled"
                );
                return None;
            }
        };

        let task = PollingTask {
            store,
            interval: self.interval,
            snapshot,
            shutdown,
        };

        Some(tokio::spawn(task.run()))
    }
}

struct PollingTask {
    store: Arc<TemplateStore>,
    interval: Duration,
    snapshot: Snapshot,
    shutdown: broadcast::Receiver<()>,
}

impl PollingTask {
    async fn run(mut self) {
        let mut timer = tokio::time::interval(self.interval);
        timer.tick().await;

        tracing::info!(
            dir = %self.store.dir().display(),
            templates = self.snapshot.len(),
            interval_ms = self.interval.as_millis() as u64,
            "Watching templates for changes"
        );

        loop {
            tokio::select! {
                _ = self.shutdown.recv() => {
                    tracing::info!("Template watcher received shutdown signal");
                    break;
                }
                _ = timer.tick() => {
                    self.poll().await;
                }
            }
        }

        tracing::info!("Template watcher stopped");
    }

    async fn poll(&mut self) {
        let snapshot = match scan_templates(self.store.dir()).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "Template scan failed");
                return;
            }
        };

        for change in diff_snapshots(&self.snapshot, &snapshot) {
            self.store.invalidate(change.name());
            match &change {
                TemplateChange::Added(name) => {
                    tracing::info!(template = %name, "Template added");
                }
                TemplateChange::Modified(name) => {
                    tracing::info!(template = %name, "Template modified, reloading");
                }
                TemplateChange::Removed(name) => {
                    tracing::info!(template = %name, "Template removed");
                }
            }
        }

        self.snapshot = snapshot;
    }
}

/// Stamp every template file in `dir`
pub async fn scan_templates(dir: &Path) -> io::Result<Snapshot> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut snapshot = Snapshot::new();

    while let Some(entry) = entries.next_entry().await? {
        let Some(name) = template_name(&entry.path()) else {
            continue;
        };

        // Files can vanish between listing and stat
        let Ok(metadata) = entry.metadata().await else {
            continue;
        };

        snapshot.insert(
            name,
            FileStamp {
                modified: metadata.modified().ok(),
                len: metadata.len(),
            },
        );
    }

    Ok(snapshot)
}

/// Changes between two snapshots, ordered by template name
pub fn diff_snapshots(old: &Snapshot, new: &Snapshot) -> Vec<TemplateChange> {
    let mut changes: Vec<TemplateChange> = new
        .iter()
        .filter_map(|(name, stamp)| match old.get(name) {
            None => Some(TemplateChange::Added(name.clone())),
            Some(previous) if previous != stamp => Some(TemplateChange::Modified(name.clone())),
            Some(_) => None,
        })
        .collect();

    changes.extend(
        old.keys()
            .filter(|name| !new.contains_key(*name))
            .map(|name| TemplateChange::Removed(name.clone())),
    );

    changes.sort_by(|a, b| a.name().cmp(b.name()));
    changes
}

/// Create a template watcher based on configuration
pub fn create_template_watcher(config: &TemplateConfig) -> Arc<dyn TemplateWatcher> {
    if config.hot_reload {
        tracing::info!(
            poll_interval_ms = config.poll_interval_ms,
            "Creating polling template watcher"
        );
        Arc::new(PollingWatcher::new(Duration::from_millis(config.poll_interval_ms)))
    } else {
        Arc::new(NoopWatcher)
    }
}
