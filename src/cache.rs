// 🗄️ Unified table cache - build once per source version
//
// The cache is an explicit object (no global singleton). Its key is a
// fingerprint of the source files' identities; a changed file changes the
// key and the next load rebuilds. A built table is shared read-only via Arc
// and never mutated afterwards.

use crate::config::DataSources;
use crate::model::UnifiedRecord;
use crate::pipeline;
use crate::reconciler::{Reconciliation, ReconciliationReport};
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::UNIX_EPOCH;
use tracing::{debug, info};

// ============================================================================
// SOURCE FINGERPRINT
// ============================================================================

/// SHA-256 over (label, path, size, modification time) of every source file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceFingerprint(String);

impl SourceFingerprint {
    pub fn of(sources: &DataSources) -> Result<Self> {
        let mut hasher = Sha256::new();

        for (label, path) in sources.entries() {
            let meta = fs::metadata(path)
                .with_context(|| format!("Failed to stat {} source: {}", label, path.display()))?;
            let modified = meta
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_nanos())
                .unwrap_or(0);

            hasher.update(format!(
                "{}|{}|{}|{};",
                label,
                path.display(),
                meta.len(),
                modified
            ));
        }

        Ok(SourceFingerprint(format!("{:x}", hasher.finalize())))
    }

    /// Fingerprint from an arbitrary identity string (in-memory sources)
    pub fn from_identity(identity: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(identity);
        SourceFingerprint(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// UNIFIED TABLE
// ============================================================================

#[derive(Debug, Clone)]
pub struct UnifiedTable {
    pub records: Vec<UnifiedRecord>,
    pub report: ReconciliationReport,
    pub fingerprint: SourceFingerprint,
    pub built_at: DateTime<Utc>,
}

impl UnifiedTable {
    pub fn new(reconciliation: Reconciliation, fingerprint: SourceFingerprint) -> Self {
        UnifiedTable {
            records: reconciliation.records,
            report: reconciliation.report,
            fingerprint,
            built_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// CACHE
// ============================================================================

pub struct UnifiedCache {
    entry: RwLock<Option<Arc<UnifiedTable>>>,
    builds: AtomicUsize,
}

impl UnifiedCache {
    pub fn new() -> Self {
        UnifiedCache {
            entry: RwLock::new(None),
            builds: AtomicUsize::new(0),
        }
    }

    /// Cached table for these sources, rebuilt when any file changed
    pub fn load(&self, sources: &DataSources) -> Result<Arc<UnifiedTable>> {
        let key = SourceFingerprint::of(sources)?;
        self.get_or_build(key, || pipeline::run(sources))
    }

    /// Return the table stored under `key`, or build and store it
    pub fn get_or_build<F>(&self, key: SourceFingerprint, build: F) -> Result<Arc<UnifiedTable>>
    where
        F: FnOnce() -> Result<Reconciliation>,
    {
        {
            let entry = self
                .entry
                .read()
                .map_err(|_| anyhow!("unified cache lock poisoned"))?;
            if let Some(table) = entry.as_ref().filter(|t| t.fingerprint == key) {
                debug!(fingerprint = key.as_str(), "unified cache hit");
                return Ok(Arc::clone(table));
            }
        }

        let mut entry = self
            .entry
            .write()
            .map_err(|_| anyhow!("unified cache lock poisoned"))?;

        // Another caller may have built it while we waited for the write lock
        if let Some(table) = entry.as_ref().filter(|t| t.fingerprint == key) {
            return Ok(Arc::clone(table));
        }

        info!(fingerprint = key.as_str(), "unified cache miss, rebuilding");
        let table = Arc::new(UnifiedTable::new(build()?, key));
        self.builds.fetch_add(1, Ordering::SeqCst);
        *entry = Some(Arc::clone(&table));

        Ok(table)
    }

    /// Drop the cached table; the next load rebuilds
    pub fn invalidate(&self) {
        if let Ok(mut entry) = self.entry.write() {
            *entry = None;
        }
    }

    /// Number of builds performed by this cache
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

impl Default for UnifiedCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_reconciliation() -> Result<Reconciliation> {
        Ok(Reconciliation {
            records: Vec::new(),
            report: ReconciliationReport::default(),
        })
    }

    #[test]
    fn test_same_key_builds_once() {
        let cache = UnifiedCache::new();
        let key = SourceFingerprint::from_identity("v1");

        let first = cache.get_or_build(key.clone(), empty_reconciliation).unwrap();
        let second = cache.get_or_build(key, empty_reconciliation).unwrap();

        assert_eq!(cache.build_count(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_new_key_rebuilds() {
        let cache = UnifiedCache::new();

        cache
            .get_or_build(SourceFingerprint::from_identity("v1"), empty_reconciliation)
            .unwrap();
        let table = cache
            .get_or_build(SourceFingerprint::from_identity("v2"), empty_reconciliation)
            .unwrap();

        assert_eq!(cache.build_count(), 2);
        assert_eq!(table.fingerprint, SourceFingerprint::from_identity("v2"));
    }

    #[test]
    fn test_invalidate_forces_rebuild() {
        let cache = UnifiedCache::new();
        let key = SourceFingerprint::from_identity("v1");

        cache.get_or_build(key.clone(), empty_reconciliation).unwrap();
        cache.invalidate();
        cache.get_or_build(key, empty_reconciliation).unwrap();

        assert_eq!(cache.build_count(), 2);
    }

    #[test]
    fn test_failed_build_is_not_cached() {
        let cache = UnifiedCache::new();
        let key = SourceFingerprint::from_identity("v1");

        let result = cache.get_or_build(key.clone(), || Err(anyhow!("boom")));
        assert!(result.is_err());
        assert_eq!(cache.build_count(), 0);

        cache.get_or_build(key, empty_reconciliation).unwrap();
        assert_eq!(cache.build_count(), 1);
    }

    #[test]
    fn test_separate_caches_are_independent() {
        let a = UnifiedCache::new();
        let b = UnifiedCache::new();
        let key = SourceFingerprint::from_identity("v1");

        a.get_or_build(key.clone(), empty_reconciliation).unwrap();
        b.get_or_build(key, empty_reconciliation).unwrap();

        assert_eq!(a.build_count(), 1);
        assert_eq!(b.build_count(), 1);
    }

    #[test]
    fn test_fingerprint_requires_existing_files() {
        let sources = DataSources::in_dir(std::path::Path::new("no-such-dir"));
        let message = format!("{:#}", SourceFingerprint::of(&sources).unwrap_err());
        assert!(message.contains("geography"));
    }
}
