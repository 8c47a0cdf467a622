//! Trailing-edge debounce of raw path-change notifications.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// Quiet interval measured from the most recent notification. Fixed,
/// not configurable.
pub const QUIET_INTERVAL: Duration = Duration::from_millis(300);

type FlushFn = dyn Fn(Vec<PathBuf>) + Send + Sync + 'static;

#[derive(Default)]
struct Inner {
    pending: HashSet<PathBuf>,
    timer: Option<JoinHandle<()>>,
    /// Bumped on every notify and on shutdown. An expired timer only
    /// flushes when its epoch is still current, so a timer that lost
    /// the race against a reschedule never fires early.
    epoch: u64,
}

/// Absorbs a burst of raw path-change notifications into a single
/// flush, debounced by [`QUIET_INTERVAL`] of quiet.
///
/// Contract: N notifications within one quiet window produce exactly
/// one flush carrying the union of distinct paths. At most one timer
/// is live at any instant; each notification either starts it or
/// extends the deadline. Tearing the coalescer down cancels a pending
/// timer without flushing.
pub struct ChangeCoalescer {
    inner: Arc<Mutex<Inner>>,
    flush: Arc<FlushFn>,
}

impl ChangeCoalescer {
    pub fn new(flush: impl Fn(Vec<PathBuf>) + Send + Sync + 'static) -> ChangeCoalescer {
        ChangeCoalescer {
            inner: Arc::new(Mutex::new(Inner::default())),
            flush: Arc::new(flush),
        }
    }

    /// Record `path` and restart the quiet-interval timer from now.
    ///
    /// Must be called from within a tokio runtime (the timer is a
    /// spawned sleep, not a blocking wait). The deadline is fixed
    /// here, at call time, so the quiet interval is measured from the
    /// notification itself rather than from whenever the timer task
    /// first gets polled.
    pub fn notify(&self, path: PathBuf) {
        let deadline = Instant::now() + QUIET_INTERVAL;
        let mut inner = self.inner.lock().unwrap();
        inner.pending.insert(path);
        inner.epoch += 1;
        let epoch = inner.epoch;

        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }

        let shared = Arc::clone(&self.inner);
        let flush = Arc::clone(&self.flush);
        inner.timer = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let paths: Vec<PathBuf> = {
                let mut inner = shared.lock().unwrap();
                if inner.epoch != epoch {
                    return;
                }
                inner.timer = None;
                inner.pending.drain().collect()
            };
            if !paths.is_empty() {
                debug!("debounce flush: {} path(s)", paths.len());
                flush(paths);
            }
        }));
    }

    /// Whether a change is buffered and the timer is running.
    pub fn has_pending(&self) -> bool {
        !self.inner.lock().unwrap().pending.is_empty()
    }

    /// Cancel any pending timer and discard the pending set. No flush
    /// fires after this returns.
    pub fn shutdown(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.epoch += 1;
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }
        inner.pending.clear();
    }
}

impl Drop for ChangeCoalescer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
