//! File-backed template storage with an in-memory cache

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;

use crate::metrics::TemplateMetrics;

use super::types::{validate_name, TemplateError, TemplateResult};

/// File extension of template resources
const TEMPLATE_EXTENSION: &str = "txt";

/// Template storage backed by `<dir>/<name>.txt` files.
///
/// The files are the source of truth. The cache is filled on miss and only
/// shrinks through `invalidate`/`invalidate_all`; two concurrent misses for
/// the same name both read the file and the last write wins.
pub struct TemplateStore {
    dir: PathBuf,
    cache: DashMap<String, String>,
}

impl TemplateStore {
    /// Create a store over a template directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: DashMap::new(),
        }
    }

    /// Directory holding the template files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the backing file for `name`
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", name, TEMPLATE_EXTENSION))
    }

    /// Get template content, reading the backing file on cache miss
    pub async fn load(&self, name: &str) -> TemplateResult<String> {
        if let Some(content) = self.cache.get(name) {
            TemplateMetrics::record_cache_hit();
            return Ok(content.clone());
        }

        validate_name(name)?;
        TemplateMetrics::record_cache_miss();

        let path = self.path_for(name);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(template = name, dir = %self.dir.display(), "Template not found");
                return Err(TemplateError::NotFound {
                    name: name.to_string(),
                    dir: self.dir.clone(),
                });
            }
            Err(source) => {
                return Err(TemplateError::Io {
                    name: name.to_string(),
                    source,
                })
            }
        };

        self.cache.insert(name.to_string(), content.clone());
        tracing::debug!(template = name, path = %path.display(), "Template loaded");

        Ok(content)
    }

    /// Drop `name` from the cache. Returns whether an entry was removed.
    pub fn invalidate(&self, name: &str) -> bool {
        let removed = self.cache.remove(name).is_some();
        if removed {
            TemplateMetrics::record_invalidation();
            tracing::info!(template = name, "Template cache entry invalidated");
        }
        removed
    }

    /// Clear the whole cache and return how many entries were dropped
    pub fn invalidate_all(&self) -> usize {
        let count = self.cache.len();
        self.cache.clear();

        tracing::info!(cleared = count, "Template cache cleared");
        count
    }

    /// Names of every template file in the directory, sorted
    pub async fn list(&self) -> TemplateResult<Vec<String>> {
        let list_error = |source| TemplateError::List {
            dir: self.dir.clone(),
            source,
        };

        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(list_error)?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(list_error)? {
            if let Some(name) = template_name(&entry.path()) {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }

    /// Whether `name` is currently cached
    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.contains_key(name)
    }

    /// Number of cached templates
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }
}

/// Template name for a path, if it is a template file `load` accepts
pub fn template_name(path: &Path) -> Option<String> {
    if path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION) {
        return None;
    }

    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| validate_name(s).is_ok())
        .map(|s| s.to_string())
}

/// Create an Arc-wrapped template store
pub fn create_template_store(dir: impl Into<PathBuf>) -> Arc<TemplateStore> {
    Arc::new(TemplateStore::new(dir))
}
