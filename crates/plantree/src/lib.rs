//! plantree - Live tree of hierarchical planning documents
//!
//! plantree keeps an in-memory, displayable tree of planning documents
//! (epics, features, stories, bugs organized as markdown files with
//! front-matter) synchronized with the file system. The hard part is
//! correctness under bursty file mutation:
//!
//! - raw watcher events are absorbed by a trailing-edge debounce
//!   ([`sync::ChangeCoalescer`]) so a burst produces one refresh;
//! - parsed front-matter is cached per path ([`cache::FrontmatterCache`])
//!   and invalidated precisely for the paths affected;
//! - hierarchical completion progress is cached per container
//!   ([`cache::ProgressCache`]) and dropped for a changed document's
//!   whole ancestor chain, never recomputed needlessly;
//! - the display collaborator is told to redraw through an injected
//!   [`sync::RefreshSink`] at the right cadence.
//!
//! The read path is [`snapshot::TreeSnapshotBuilder`]: stateless,
//! idempotent, pulls lazily through the caches.
//!
//! Data flow:
//!
//! ```text
//! file system -> watcher -> SyncController -> ChangeCoalescer (300ms)
//!     -> invalidate {FrontmatterCache, ProgressCache ancestors}
//!     -> RefreshSink::signal_changed -> TreeSnapshotBuilder (pull)
//! ```

pub mod cache;
pub mod config;
pub mod enumerate;
pub mod snapshot;
pub mod sync;
pub mod watcher;

pub use cache::{FrontmatterCache, ProgressCache};
pub use config::Config;
pub use enumerate::{DocumentEnumerator, WalkEnumerator};
pub use snapshot::TreeSnapshotBuilder;
pub use sync::{ChangeEvent, ChangeKind, RefreshSignal, RefreshSink, SyncController, SyncState};
