//! Path-keyed cache of parsed front-matter records.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use plantree_core::{DocumentMeta, frontmatter};
use tracing::debug;

#[derive(Default)]
struct Inner {
    records: HashMap<PathBuf, Arc<DocumentMeta>>,
    /// Per-path invalidation stamps. A read that started before the
    /// stamp was bumped must not re-seed the cache with its result.
    stamps: HashMap<PathBuf, u64>,
    /// Stamp floor set by `invalidate_all`, covering paths that were
    /// never invalidated individually.
    floor: u64,
    clock: u64,
}

impl Inner {
    fn stamp_of(&self, path: &Path) -> u64 {
        self.stamps.get(path).copied().unwrap_or(0).max(self.floor)
    }
}

/// Maps a document path to its parsed metadata, with lazy fill and
/// point invalidation.
///
/// `get` never fails: a missing or unparsable file yields (and caches)
/// [`DocumentMeta::Unreadable`], so the tree can still render a node
/// for it.
#[derive(Default)]
pub struct FrontmatterCache {
    inner: Mutex<Inner>,
}

impl FrontmatterCache {
    pub fn new() -> FrontmatterCache {
        FrontmatterCache::default()
    }

    /// Cached record if present, else read and parse the backing file,
    /// store the result, and return it.
    ///
    /// The file read happens outside the lock. If an invalidation for
    /// this path lands while the read is in flight, the fresh
    /// invalidation wins: the result is still returned to the caller
    /// but not stored, so a stale record is never resurrected.
    pub async fn get(&self, path: &Path) -> Arc<DocumentMeta> {
        let started_at = {
            let inner = self.inner.lock().unwrap();
            if let Some(meta) = inner.records.get(path) {
                return Arc::clone(meta);
            }
            inner.stamp_of(path)
        };

        let meta = Arc::new(match tokio::fs::read_to_string(path).await {
            Ok(text) => frontmatter::parse(&text),
            Err(err) => {
                debug!("unreadable document {}: {}", path.display(), err);
                DocumentMeta::Unreadable
            }
        });

        let mut inner = self.inner.lock().unwrap();
        if inner.stamp_of(path) == started_at {
            inner
                .records
                .insert(path.to_path_buf(), Arc::clone(&meta));
        }
        meta
    }

    /// Cached record only, no lazy fill.
    pub fn peek(&self, path: &Path) -> Option<Arc<DocumentMeta>> {
        self.inner.lock().unwrap().records.get(path).cloned()
    }

    /// Remove any cached record for `path`. Idempotent; no effect when
    /// absent beyond bumping the invalidation stamp.
    pub fn invalidate(&self, path: &Path) {
        let mut inner = self.inner.lock().unwrap();
        inner.records.remove(path);
        inner.clock += 1;
        let clock = inner.clock;
        inner.stamps.insert(path.to_path_buf(), clock);
    }

    /// Clear the whole cache. Full-reset scenarios only, not part of
    /// the steady-state pipeline.
    pub fn invalidate_all(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.records.clear();
        inner.clock += 1;
        inner.floor = inner.clock;
    }
}
