//! Document model: status, kind, and the parsed front-matter record.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Lifecycle status of a planning document.
///
/// The set is closed. Any label outside it parses to
/// [`Status::Unrecognized`] with the raw text preserved, so the
/// fallback rendering (plain label, no badge) is decided here once
/// rather than per consumer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Status {
    NotStarted,
    InProgress,
    Completed,
    Blocked,
    Cancelled,
    Deferred,
    Archived,
    Unrecognized(String),
}

impl Status {
    /// Parse a front-matter status value.
    ///
    /// Matching is case-insensitive and ignores `-`/`_`/space
    /// separators, so "In Progress", "in-progress" and "in_progress"
    /// are all the same status.
    pub fn parse(raw: &str) -> Status {
        let norm: String = raw
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match norm.as_str() {
            "notstarted" | "todo" | "planned" => Status::NotStarted,
            "inprogress" | "active" | "started" => Status::InProgress,
            "completed" | "complete" | "done" => Status::Completed,
            "blocked" => Status::Blocked,
            "cancelled" | "canceled" => Status::Cancelled,
            "deferred" | "postponed" => Status::Deferred,
            "archived" => Status::Archived,
            _ => Status::Unrecognized(raw.trim().to_string()),
        }
    }

    /// Display label for this status.
    pub fn label(&self) -> &str {
        match self {
            Status::NotStarted => "Not Started",
            Status::InProgress => "In Progress",
            Status::Completed => "Completed",
            Status::Blocked => "Blocked",
            Status::Cancelled => "Cancelled",
            Status::Deferred => "Deferred",
            Status::Archived => "Archived",
            Status::Unrecognized(raw) => raw,
        }
    }
}

/// The kind of planning document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocKind {
    Epic,
    Feature,
    Story,
    Bug,
    Phase,
    Other(String),
}

impl DocKind {
    /// Parse a front-matter kind value (case-insensitive).
    pub fn parse(raw: &str) -> DocKind {
        match raw.trim().to_ascii_lowercase().as_str() {
            "epic" => DocKind::Epic,
            "feature" => DocKind::Feature,
            "story" => DocKind::Story,
            "bug" => DocKind::Bug,
            "phase" => DocKind::Phase,
            _ => DocKind::Other(raw.trim().to_string()),
        }
    }

    /// Whether documents of this kind aggregate their children's
    /// completion into a progress snapshot.
    pub fn is_container(&self) -> bool {
        matches!(self, DocKind::Epic | DocKind::Feature | DocKind::Phase)
    }

    /// Display label for this kind.
    pub fn label(&self) -> &str {
        match self {
            DocKind::Epic => "epic",
            DocKind::Feature => "feature",
            DocKind::Story => "story",
            DocKind::Bug => "bug",
            DocKind::Phase => "phase",
            DocKind::Other(raw) => raw,
        }
    }
}

/// Parsed front-matter for one document.
///
/// Immutable once constructed: a changed file produces a new record
/// replacing the old one, never an in-place mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontmatterRecord {
    /// Stable identifier (falls back to the title when absent).
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Lifecycle status.
    pub status: Status,
    /// Document kind.
    pub kind: DocKind,
    /// Declared parent reference, as written (a path relative to the
    /// document's directory, or an absolute path).
    pub parent: Option<String>,
    /// Free-form fields the core ignores but preserves.
    pub extra: BTreeMap<String, String>,
}

impl FrontmatterRecord {
    /// Minimal record with the given status. Handy for doctests and
    /// progress-policy tests that don't care about the other fields.
    pub fn for_status(status: Status) -> FrontmatterRecord {
        FrontmatterRecord {
            id: String::new(),
            title: String::new(),
            status,
            kind: DocKind::Story,
            parent: None,
            extra: BTreeMap::new(),
        }
    }

    /// Resolve this record's parent reference against the document's
    /// own path. Returns a lexically normalized path, or `None` when
    /// no parent is declared.
    pub fn resolve_parent(&self, doc_path: &Path) -> Option<PathBuf> {
        let parent = self.parent.as_deref()?;
        Some(resolve_parent_ref(doc_path, parent))
    }
}

/// Parsed metadata for one document, degraded when the backing file is
/// missing or its front-matter is unusable. An unreadable document
/// still renders as a node (raw filename, no status).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentMeta {
    Parsed(FrontmatterRecord),
    Unreadable,
}

impl DocumentMeta {
    /// The record, if this document parsed.
    pub fn record(&self) -> Option<&FrontmatterRecord> {
        match self {
            DocumentMeta::Parsed(record) => Some(record),
            DocumentMeta::Unreadable => None,
        }
    }

    /// The status, if this document parsed.
    pub fn status(&self) -> Option<&Status> {
        self.record().map(|r| &r.status)
    }
}

/// Resolve a declared parent reference against the referring
/// document's path.
///
/// Relative references are joined onto the document's directory;
/// `.`/`..` components are removed lexically so that two spellings of
/// the same file compare equal as cache keys.
pub fn resolve_parent_ref(doc_path: &Path, parent_ref: &str) -> PathBuf {
    let referred = Path::new(parent_ref);
    let joined = if referred.is_absolute() {
        referred.to_path_buf()
    } else {
        match doc_path.parent() {
            Some(dir) => dir.join(referred),
            None => referred.to_path_buf(),
        }
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
