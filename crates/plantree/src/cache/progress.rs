//! Container-keyed cache of progress snapshots.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use plantree_core::{ProgressPolicy, ProgressSnapshot, progress};
use tracing::debug;

use crate::cache::FrontmatterCache;

#[derive(Default)]
struct Inner {
    /// `None` entries record "computed, no counted children", so an
    /// empty container doesn't tally its children on every build.
    snapshots: HashMap<PathBuf, Option<ProgressSnapshot>>,
    /// Per-container invalidation stamps. A tally that started before
    /// the stamp was bumped must not re-seed the cache with its result.
    stamps: HashMap<PathBuf, u64>,
    /// Stamp floor set by `invalidate_all`, covering containers that
    /// were never invalidated individually.
    floor: u64,
    clock: u64,
}

impl Inner {
    fn stamp_of(&self, container: &Path) -> u64 {
        self.stamps
            .get(container)
            .copied()
            .unwrap_or(0)
            .max(self.floor)
    }
}

/// Maps a container's path to its last-computed completion aggregate.
///
/// Entries are dropped (not marked stale) on invalidation and rebuilt
/// lazily on the next `get`. Invalidation does not cascade here: the
/// `SyncController` owns walking a changed document's ancestor chain,
/// because a leaf change affects every ancestor's aggregate.
pub struct ProgressCache {
    policy: ProgressPolicy,
    inner: Mutex<Inner>,
}

impl ProgressCache {
    pub fn new(policy: ProgressPolicy) -> ProgressCache {
        ProgressCache {
            policy,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Cached snapshot for `container` if present, else tally the
    /// children's records (lazy-filling the front-matter cache as
    /// needed), store, and return. Absent - not zero-valued - when no
    /// counted children remain.
    ///
    /// The child fetches await outside the lock. If an invalidation
    /// for this container lands while they are in flight, the fresh
    /// invalidation wins: the tally is still returned to the caller
    /// but not stored, so a stale aggregate is never resurrected.
    pub async fn get(
        &self,
        container: &Path,
        children: &[PathBuf],
        frontmatter: &FrontmatterCache,
    ) -> Option<ProgressSnapshot> {
        let started_at = {
            let inner = self.inner.lock().unwrap();
            if let Some(cached) = inner.snapshots.get(container) {
                return *cached;
            }
            inner.stamp_of(container)
        };

        let mut metas = Vec::with_capacity(children.len());
        for child in children {
            metas.push(frontmatter.get(child).await);
        }
        let snapshot = progress::compute(metas.iter().map(|m| m.as_ref()), &self.policy);

        debug!(
            "computed progress for {}: {}",
            container.display(),
            snapshot
                .as_ref()
                .map(ProgressSnapshot::display)
                .unwrap_or_else(|| "no counted children".to_string()),
        );
        let mut inner = self.inner.lock().unwrap();
        if inner.stamp_of(container) == started_at {
            inner.snapshots.insert(container.to_path_buf(), snapshot);
        }
        snapshot
    }

    /// Drop the cached snapshot for exactly this container. Idempotent;
    /// no effect when absent beyond bumping the invalidation stamp.
    pub fn invalidate(&self, container: &Path) {
        let mut inner = self.inner.lock().unwrap();
        inner.snapshots.remove(container);
        inner.clock += 1;
        let clock = inner.clock;
        inner.stamps.insert(container.to_path_buf(), clock);
    }

    /// Drop every cached snapshot. Full-reset scenarios only.
    pub fn invalidate_all(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.snapshots.clear();
        inner.clock += 1;
        inner.floor = inner.clock;
    }

    /// Whether a computed entry exists for this container.
    pub(crate) fn contains(&self, container: &Path) -> bool {
        self.inner.lock().unwrap().snapshots.contains_key(container)
    }
}

impl Default for ProgressCache {
    fn default() -> ProgressCache {
        ProgressCache::new(ProgressPolicy::default())
    }
}
