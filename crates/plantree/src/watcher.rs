//! notify-based adapter feeding raw change events into the pipeline.
//!
//! The watcher is deliberately dumb: it maps the platform's events to
//! `(path, kind)` pairs for markdown files and forwards them. No
//! debouncing happens here - duplicates and reordering are the
//! pipeline's problem (and the coalescer's job).

use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::enumerate::is_markdown;
use crate::sync::{ChangeEvent, ChangeKind};

/// Owns the platform watcher; watching stops when this is dropped.
pub struct DocWatcher {
    _watcher: RecommendedWatcher,
}

impl DocWatcher {
    /// Watch `root` recursively, forwarding markdown change events
    /// into `tx`. Events are delivered from the watcher's own thread
    /// via a blocking send; a closed channel just stops forwarding.
    pub fn spawn(root: &Path, tx: mpsc::Sender<ChangeEvent>) -> Result<DocWatcher> {
        let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
            let event = match result {
                Ok(event) => event,
                Err(err) => {
                    warn!("watch error: {}", err);
                    return;
                }
            };
            let Some(kind) = map_kind(&event.kind) else {
                return;
            };
            for path in event.paths {
                if !is_markdown(&path) {
                    continue;
                }
                if tx.blocking_send(ChangeEvent { path, kind }).is_err() {
                    debug!("watcher channel closed");
                    return;
                }
            }
        })
        .wrap_err("failed to create file watcher")?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .wrap_err_with(|| format!("failed to watch {}", root.display()))?;
        info!("watching {}", root.display());

        Ok(DocWatcher { _watcher: watcher })
    }
}

/// Collapse notify's event taxonomy into the pipeline's three kinds.
/// Access and metadata-only events are dropped.
fn map_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Modify(_) => Some(ChangeKind::Modified),
        EventKind::Remove(_) => Some(ChangeKind::Deleted),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => None,
    }
}
