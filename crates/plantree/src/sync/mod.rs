//! The incremental synchronization pipeline.
//!
//! Raw watcher events flow into the [`SyncController`], which forwards
//! them to the [`ChangeCoalescer`] for trailing-edge debounce. When a
//! burst goes quiet, the flush invalidates the front-matter entry and
//! the progress snapshots of the whole ancestor chain for every
//! changed path, then tells the display collaborator to redraw via the
//! injected [`RefreshSink`].

mod coalescer;
mod sink;

pub use coalescer::{ChangeCoalescer, QUIET_INTERVAL};
pub use sink::{RefreshSignal, RefreshSink};

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cache::{FrontmatterCache, ProgressCache};

/// What happened to a path, as reported by the file watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
}

/// One raw change notification. Duplicates and out-of-order delivery
/// for unrelated paths are tolerated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

/// Observable pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No pending changes.
    Idle,
    /// At least one change buffered, debounce timer running.
    PendingFlush,
}

/// Orchestrates the pipeline: event intake, cache invalidation, and
/// refresh-notification cadence.
///
/// Owns both caches together with the snapshot builder; all cache
/// mutation goes through here.
pub struct SyncController {
    frontmatter: Arc<FrontmatterCache>,
    progress: Arc<ProgressCache>,
    coalescer: ChangeCoalescer,
    flush_rx: Mutex<Option<mpsc::UnboundedReceiver<Vec<PathBuf>>>>,
    sink: Arc<dyn RefreshSink>,
    /// Ancestor chains captured at delete time. The eager
    /// invalidation below destroys the deleted document's parent
    /// link, so the chain must be remembered until the flush that
    /// drops the ancestors' progress snapshots.
    deleted_ancestors: Mutex<HashSet<PathBuf>>,
}

impl SyncController {
    pub fn new(
        frontmatter: Arc<FrontmatterCache>,
        progress: Arc<ProgressCache>,
        sink: Arc<dyn RefreshSink>,
    ) -> SyncController {
        let (flush_tx, flush_rx) = mpsc::unbounded_channel();
        let coalescer = ChangeCoalescer::new(move |paths| {
            // Receiver dropped means the controller is shutting down;
            // the flush is discarded with it.
            let _ = flush_tx.send(paths);
        });
        SyncController {
            frontmatter,
            progress,
            coalescer,
            flush_rx: Mutex::new(Some(flush_rx)),
            sink,
            deleted_ancestors: Mutex::new(HashSet::new()),
        }
    }

    /// Current observable state.
    pub fn state(&self) -> SyncState {
        if self.coalescer.has_pending() {
            SyncState::PendingFlush
        } else {
            SyncState::Idle
        }
    }

    /// Intake for one raw watcher event.
    ///
    /// Deletions invalidate the front-matter entry immediately rather
    /// than waiting for the debounce window, so a read racing the
    /// flush sees the degraded marker and never the pre-delete record.
    /// Everything else waits for the coalescer.
    pub fn handle_event(&self, event: &ChangeEvent) {
        if event.kind == ChangeKind::Deleted {
            let chain = self.cached_ancestor_chain(&event.path);
            self.deleted_ancestors.lock().unwrap().extend(chain);
            self.frontmatter.invalidate(&event.path);
        }
        self.coalescer.notify(event.path.clone());
    }

    /// Manual refresh: full reset of both caches and an immediate
    /// redraw signal, bypassing the debounce. Recovery path for
    /// suspected desync.
    pub fn refresh_now(&self) {
        info!("manual refresh: resetting caches");
        self.deleted_ancestors.lock().unwrap().clear();
        self.frontmatter.invalidate_all();
        self.progress.invalidate_all();
        self.sink.signal_changed(RefreshSignal::FullTree);
    }

    /// Drive the pipeline until the event channel closes. Teardown
    /// cancels any pending debounce timer and discards buffered
    /// changes; there is no final flush.
    pub async fn run(self: Arc<Self>, mut events: mpsc::Receiver<ChangeEvent>) {
        let mut flush_rx = self
            .flush_rx
            .lock()
            .unwrap()
            .take()
            .expect("SyncController::run called twice");

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(&event),
                    None => break,
                },
                flushed = flush_rx.recv() => match flushed {
                    Some(paths) => self.process_flush(paths).await,
                    None => break,
                },
            }
        }
        self.coalescer.shutdown();
        debug!("sync controller stopped");
    }

    /// Handle one debounced flush: per-path invalidation, then a
    /// single redraw signal.
    ///
    /// Each path is processed independently; a malformed document or
    /// parent chain degrades that path only and never blocks the rest
    /// of the flush.
    pub(crate) async fn process_flush(&self, paths: Vec<PathBuf>) {
        if paths.len() <= 3 {
            info!(
                "change flush: {}",
                paths
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        } else {
            info!(
                "change flush: {} and {} more",
                paths
                    .iter()
                    .take(2)
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
                paths.len() - 2
            );
        }

        for path in &paths {
            self.invalidate_for_path(path).await;
        }
        for container in self.deleted_ancestors.lock().unwrap().drain() {
            self.progress.invalidate(&container);
        }
        self.sink.signal_changed(RefreshSignal::FullTree);
    }

    /// Invalidate everything a change to `path` can affect: its own
    /// front-matter entry and the progress snapshots of its ancestor
    /// chain, including itself (a container's own status can change
    /// too).
    async fn invalidate_for_path(&self, path: &Path) {
        let mut targets: HashSet<PathBuf> = HashSet::new();
        targets.insert(path.to_path_buf());

        // Ancestors as they were cached before this change. A
        // re-parented document must also invalidate the chain that
        // used to contain it.
        targets.extend(self.cached_ancestor_chain(path));

        self.frontmatter.invalidate(path);

        // Ancestors as the file declares them now (fresh lazy read).
        targets.extend(self.fresh_ancestor_chain(path).await);

        for target in &targets {
            self.progress.invalidate(target);
        }
        debug!(
            "invalidated {} progress snapshot(s) for {}",
            targets.len(),
            path.display()
        );
    }

    /// Walk parent references upward from `path` using only
    /// already-cached records. Cycle-safe: a visited set terminates
    /// the walk, and a parent that cannot be resolved is treated as
    /// "no parent".
    fn cached_ancestor_chain(&self, path: &Path) -> Vec<PathBuf> {
        let mut chain = Vec::new();
        let mut visited: HashSet<PathBuf> = HashSet::new();
        visited.insert(path.to_path_buf());

        let mut current = path.to_path_buf();
        while let Some(meta) = self.frontmatter.peek(&current) {
            let Some(parent) = meta.record().and_then(|r| r.resolve_parent(&current)) else {
                break;
            };
            if !visited.insert(parent.clone()) {
                debug!(
                    "parent cycle detected at {}, stopping ancestor walk",
                    parent.display()
                );
                break;
            }
            chain.push(parent.clone());
            current = parent;
        }
        chain
    }

    /// Like [`Self::cached_ancestor_chain`], but reads through the
    /// cache so the chain reflects what the files declare right now.
    async fn fresh_ancestor_chain(&self, path: &Path) -> Vec<PathBuf> {
        let mut chain = Vec::new();
        let mut visited: HashSet<PathBuf> = HashSet::new();
        visited.insert(path.to_path_buf());

        let mut current = path.to_path_buf();
        loop {
            let meta = self.frontmatter.get(&current).await;
            let Some(parent) = meta.record().and_then(|r| r.resolve_parent(&current)) else {
                break;
            };
            if !visited.insert(parent.clone()) {
                debug!(
                    "parent cycle detected at {}, stopping ancestor walk",
                    parent.display()
                );
                break;
            }
            chain.push(parent.clone());
            current = parent;
        }
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plantree_core::{DocumentMeta, Status};
    use std::fs;
    use std::path::Path;

    struct NullSink;
    impl RefreshSink for NullSink {
        fn signal_changed(&self, _signal: RefreshSignal) {}
    }

    struct RecordingSink(Mutex<Vec<RefreshSignal>>);
    impl RefreshSink for RecordingSink {
        fn signal_changed(&self, signal: RefreshSignal) {
            self.0.lock().unwrap().push(signal);
        }
    }

    fn write_doc(dir: &Path, name: &str, status: &str, parent: Option<&str>) -> PathBuf {
        let path = dir.join(name);
        let parent_line = parent
            .map(|p| format!("parent: {p}\n"))
            .unwrap_or_default();
        fs::write(
            &path,
            format!("---\nid: {name}\ntitle: {name}\nstatus: {status}\nkind: feature\n{parent_line}---\n"),
        )
        .unwrap();
        path
    }

    fn controller(
        frontmatter: Arc<FrontmatterCache>,
        progress: Arc<ProgressCache>,
        sink: Arc<dyn RefreshSink>,
    ) -> SyncController {
        SyncController::new(frontmatter, progress, sink)
    }

    #[tokio::test]
    async fn delete_event_eagerly_invalidates_frontmatter() {
        let dir = tempfile::tempdir().unwrap();
        let frontmatter = Arc::new(FrontmatterCache::new());
        let progress = Arc::new(ProgressCache::default());
        let ctrl = controller(
            Arc::clone(&frontmatter),
            Arc::clone(&progress),
            Arc::new(NullSink),
        );

        let path = write_doc(dir.path(), "a.md", "done", None);
        frontmatter.get(&path).await;
        fs::remove_file(&path).unwrap();

        // Before the debounce timer fires, the cached record is gone.
        ctrl.handle_event(&ChangeEvent {
            path: path.clone(),
            kind: ChangeKind::Deleted,
        });
        assert!(frontmatter.peek(&path).is_none());
        assert_eq!(ctrl.state(), SyncState::PendingFlush);

        // A read between event and flush sees the degraded marker.
        let meta = frontmatter.get(&path).await;
        assert_eq!(*meta, DocumentMeta::Unreadable);
    }

    #[tokio::test]
    async fn modify_event_is_not_eager() {
        let dir = tempfile::tempdir().unwrap();
        let frontmatter = Arc::new(FrontmatterCache::new());
        let progress = Arc::new(ProgressCache::default());
        let ctrl = controller(
            Arc::clone(&frontmatter),
            Arc::clone(&progress),
            Arc::new(NullSink),
        );

        let path = write_doc(dir.path(), "a.md", "done", None);
        frontmatter.get(&path).await;

        ctrl.handle_event(&ChangeEvent {
            path: path.clone(),
            kind: ChangeKind::Modified,
        });
        // Cached record survives until the flush.
        assert!(frontmatter.peek(&path).is_some());
    }

    #[tokio::test]
    async fn flush_invalidates_whole_ancestor_chain() {
        let dir = tempfile::tempdir().unwrap();
        let frontmatter = Arc::new(FrontmatterCache::new());
        let progress = Arc::new(ProgressCache::default());
        let ctrl = controller(
            Arc::clone(&frontmatter),
            Arc::clone(&progress),
            Arc::new(NullSink),
        );

        // A(root) -> B(container) -> C(leaf)
        let a = write_doc(dir.path(), "a.md", "in-progress", None);
        let b = write_doc(dir.path(), "b.md", "in-progress", Some("a.md"));
        let c = write_doc(dir.path(), "c.md", "in-progress", Some("b.md"));

        // Prime both caches.
        for p in [&a, &b, &c] {
            frontmatter.get(p).await;
        }
        progress.get(&a, &[b.clone()], &frontmatter).await;
        progress.get(&b, &[c.clone()], &frontmatter).await;
        assert!(progress.contains(&a));
        assert!(progress.contains(&b));

        write_doc(dir.path(), "c.md", "done", Some("b.md"));
        ctrl.process_flush(vec![c.clone()]).await;

        assert!(!progress.contains(&a));
        assert!(!progress.contains(&b));
        assert!(!progress.contains(&c));
        // The changed record was re-read fresh.
        assert_eq!(
            frontmatter.get(&c).await.status(),
            Some(&Status::Completed)
        );
    }

    #[tokio::test]
    async fn deleting_a_leaf_still_invalidates_its_container() {
        let dir = tempfile::tempdir().unwrap();
        let frontmatter = Arc::new(FrontmatterCache::new());
        let progress = Arc::new(ProgressCache::default());
        let ctrl = controller(
            Arc::clone(&frontmatter),
            Arc::clone(&progress),
            Arc::new(NullSink),
        );

        let b = write_doc(dir.path(), "b.md", "in-progress", None);
        let c = write_doc(dir.path(), "c.md", "done", Some("b.md"));
        frontmatter.get(&c).await;
        progress.get(&b, &[c.clone()], &frontmatter).await;
        assert!(progress.contains(&b));

        // The eager invalidation destroys C's parent link, so the
        // chain captured at event time is what saves B's snapshot
        // from going stale.
        fs::remove_file(&c).unwrap();
        ctrl.handle_event(&ChangeEvent {
            path: c.clone(),
            kind: ChangeKind::Deleted,
        });
        ctrl.process_flush(vec![c.clone()]).await;

        assert!(!progress.contains(&b));
    }

    #[tokio::test]
    async fn flush_covers_old_parent_after_reparenting() {
        let dir = tempfile::tempdir().unwrap();
        let frontmatter = Arc::new(FrontmatterCache::new());
        let progress = Arc::new(ProgressCache::default());
        let ctrl = controller(
            Arc::clone(&frontmatter),
            Arc::clone(&progress),
            Arc::new(NullSink),
        );

        let b1 = write_doc(dir.path(), "b1.md", "in-progress", None);
        let b2 = write_doc(dir.path(), "b2.md", "in-progress", None);
        let c = write_doc(dir.path(), "c.md", "todo", Some("b1.md"));

        frontmatter.get(&c).await;
        progress.get(&b1, &[c.clone()], &frontmatter).await;
        progress.get(&b2, &[], &frontmatter).await;

        // Move C under B2.
        write_doc(dir.path(), "c.md", "todo", Some("b2.md"));
        ctrl.process_flush(vec![c.clone()]).await;

        // Both the old and the new parent lost their snapshots.
        assert!(!progress.contains(&b1));
        assert!(!progress.contains(&b2));
    }

    #[tokio::test]
    async fn malformed_parent_chain_is_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let frontmatter = Arc::new(FrontmatterCache::new());
        let progress = Arc::new(ProgressCache::default());
        let ctrl = controller(
            Arc::clone(&frontmatter),
            Arc::clone(&progress),
            Arc::new(NullSink),
        );

        // x -> y -> x is a cycle; z points at a parent that doesn't
        // exist.
        let x = write_doc(dir.path(), "x.md", "todo", Some("y.md"));
        let y = write_doc(dir.path(), "y.md", "todo", Some("x.md"));
        let z = write_doc(dir.path(), "z.md", "todo", Some("missing.md"));

        progress.get(&y, &[x.clone()], &frontmatter).await;

        // Must terminate and still process every path.
        ctrl.process_flush(vec![x.clone(), z.clone()]).await;
        assert!(!progress.contains(&y));
    }

    #[tokio::test]
    async fn flush_signals_full_tree_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let frontmatter = Arc::new(FrontmatterCache::new());
        let progress = Arc::new(ProgressCache::default());
        let sink = Arc::new(RecordingSink(Mutex::new(Vec::new())));
        let ctrl = controller(frontmatter, progress, Arc::clone(&sink) as Arc<dyn RefreshSink>);

        let path = write_doc(dir.path(), "a.md", "todo", None);
        ctrl.process_flush(vec![path]).await;

        assert_eq!(&*sink.0.lock().unwrap(), &[RefreshSignal::FullTree]);
    }

    #[tokio::test]
    async fn refresh_now_resets_caches_and_signals() {
        let dir = tempfile::tempdir().unwrap();
        let frontmatter = Arc::new(FrontmatterCache::new());
        let progress = Arc::new(ProgressCache::default());
        let sink = Arc::new(RecordingSink(Mutex::new(Vec::new())));
        let ctrl = controller(
            Arc::clone(&frontmatter),
            Arc::clone(&progress),
            Arc::clone(&sink) as Arc<dyn RefreshSink>,
        );

        let path = write_doc(dir.path(), "a.md", "todo", None);
        frontmatter.get(&path).await;
        progress.get(&path, &[], &frontmatter).await;

        ctrl.refresh_now();
        assert!(frontmatter.peek(&path).is_none());
        assert!(!progress.contains(&path));
        assert_eq!(&*sink.0.lock().unwrap(), &[RefreshSignal::FullTree]);
    }

    #[tokio::test]
    async fn duplicate_events_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let frontmatter = Arc::new(FrontmatterCache::new());
        let progress = Arc::new(ProgressCache::default());
        let ctrl = controller(
            Arc::clone(&frontmatter),
            Arc::clone(&progress),
            Arc::new(NullSink),
        );

        let path = write_doc(dir.path(), "a.md", "todo", None);
        let event = ChangeEvent {
            path: path.clone(),
            kind: ChangeKind::Modified,
        };
        ctrl.handle_event(&event);
        ctrl.handle_event(&event);
        ctrl.handle_event(&event);
        assert_eq!(ctrl.state(), SyncState::PendingFlush);
    }
}
