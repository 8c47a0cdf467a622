//! The seam between the pipeline and the tree-display collaborator.

use std::path::PathBuf;

/// What the display collaborator should refresh.
///
/// Today every flush emits `FullTree`; the `Node` variant reserves
/// room for targeted refresh without breaking the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshSignal {
    /// Rebuild and redraw the whole tree.
    FullTree,
    /// Redraw a single node (reserved, not emitted yet).
    Node(PathBuf),
}

/// Redraw sink supplied at controller construction - an owned
/// dependency, not a process-wide singleton. The collaborator is
/// responsible for re-invoking the snapshot builder and for keeping
/// its own UI state (scroll, selection) keyed by document path.
pub trait RefreshSink: Send + Sync {
    fn signal_changed(&self, signal: RefreshSignal);
}

/// Forward signals into a channel; the common adapter for event-loop
/// consumers.
impl RefreshSink for tokio::sync::mpsc::UnboundedSender<RefreshSignal> {
    fn signal_changed(&self, signal: RefreshSignal) {
        // Receiver gone means the consumer shut down first; nothing to
        // refresh.
        let _ = self.send(signal);
    }
}
