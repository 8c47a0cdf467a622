//! plantree-core - Planning document model and progress aggregation
//!
//! This crate provides the building blocks for:
//! - Parsing flat key/value front-matter from planning documents
//!   (epics, features, stories, bugs)
//! - Classifying document status against a configurable counting policy
//! - Computing hierarchical completion progress over a container's
//!   direct children
//! - Ordering display nodes deterministically (status group, then id)
//!
//! Everything here is pure and synchronous; the caches and the file
//! watching pipeline live in the `plantree` crate.
//!
//! # Parsing front-matter
//!
//! Documents carry a leading `---` fenced YAML block with a flat
//! key/value record. Parsing never fails: a document without a usable
//! block degrades to [`DocumentMeta::Unreadable`] and still renders as
//! a node.
//!
//! ```
//! use plantree_core::{frontmatter, DocumentMeta, Status};
//!
//! let doc = "\
//! ---
//! id: STORY-12
//! title: Wire up the flux capacitor
//! status: in-progress
//! kind: story
//! parent: epic-01.md
//! ---
//!
//! Body text is ignored by the core.
//! ";
//!
//! let meta = frontmatter::parse(doc);
//! let record = meta.record().expect("parsed");
//! assert_eq!(record.id, "STORY-12");
//! assert_eq!(record.status, Status::InProgress);
//! assert_eq!(record.parent.as_deref(), Some("epic-01.md"));
//!
//! assert_eq!(frontmatter::parse("no front-matter here"), DocumentMeta::Unreadable);
//! ```
//!
//! # Computing progress
//!
//! Progress is an aggregate over a container's direct children.
//! Cancelled and deferred items are excluded from both the numerator
//! and the denominator under the default [`ProgressPolicy`], and a
//! container with no counted children has *no* snapshot rather than a
//! zero-valued one.
//!
//! ```
//! use plantree_core::{progress, DocumentMeta, FrontmatterRecord, ProgressPolicy, Status};
//!
//! let child = |status: Status| {
//!     DocumentMeta::Parsed(FrontmatterRecord::for_status(status))
//! };
//!
//! let children = vec![
//!     child(Status::Completed),
//!     child(Status::Completed),
//!     child(Status::InProgress),
//!     child(Status::NotStarted),
//!     child(Status::Blocked),
//!     child(Status::Cancelled), // excluded from both counts
//! ];
//!
//! let snapshot = progress::compute(&children, &ProgressPolicy::default()).unwrap();
//! assert_eq!((snapshot.completed, snapshot.total), (2, 5));
//! assert_eq!(snapshot.percentage(), 40);
//! ```

mod document;
pub mod frontmatter;
mod node;
pub mod progress;

pub use document::{DocKind, DocumentMeta, FrontmatterRecord, Status, resolve_parent_ref};
pub use node::{TreeNode, status_rank};
pub use progress::{ProgressPolicy, ProgressSnapshot};
