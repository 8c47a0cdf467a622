//! Display nodes and their deterministic ordering.

use std::path::PathBuf;

use crate::document::{DocKind, Status};
use crate::progress::ProgressSnapshot;

/// One renderable row of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub path: PathBuf,
    pub id: String,
    pub title: String,
    /// `None` for unreadable documents, which render filename-only.
    pub status: Option<Status>,
    pub kind: Option<DocKind>,
    /// Present only for containers with counted children.
    pub progress: Option<ProgressSnapshot>,
}

impl TreeNode {
    /// One-line summary, e.g. `[In Progress] feature FEAT-2 Search · 2/5 · 40%`.
    pub fn summary(&self) -> String {
        let mut line = String::new();
        if let Some(status) = &self.status {
            line.push_str(&format!("[{}] ", status.label()));
        }
        if let Some(kind) = &self.kind {
            line.push_str(kind.label());
            line.push(' ');
        }
        line.push_str(&self.id);
        if !self.title.is_empty() && self.title != self.id {
            line.push(' ');
            line.push_str(&self.title);
        }
        if let Some(progress) = &self.progress {
            line.push_str(" · ");
            line.push_str(&progress.display());
        }
        line
    }

    /// Sort key: status group first, then identifier, then path as the
    /// tie-breaker so the ordering is total.
    pub fn sort_key(&self) -> (u8, &str, &PathBuf) {
        (status_rank(self.status.as_ref()), self.id.as_str(), &self.path)
    }
}

/// Fixed display order of status groups. Unreadable documents
/// (`None`) sort last.
pub fn status_rank(status: Option<&Status>) -> u8 {
    match status {
        Some(Status::InProgress) => 0,
        Some(Status::Blocked) => 1,
        Some(Status::NotStarted) => 2,
        Some(Status::Completed) => 3,
        Some(Status::Deferred) => 4,
        Some(Status::Cancelled) => 5,
        Some(Status::Archived) => 6,
        Some(Status::Unrecognized(_)) => 7,
        None => 8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, status: Option<Status>) -> TreeNode {
        TreeNode {
            path: PathBuf::from(format!("/docs/{id}.md")),
            id: id.to_string(),
            title: String::new(),
            status,
            kind: None,
            progress: None,
        }
    }

    #[test]
    fn orders_by_status_group_then_id() {
        let mut nodes = vec![
            node("b", Some(Status::Completed)),
            node("a", Some(Status::NotStarted)),
            node("c", Some(Status::InProgress)),
            node("a", Some(Status::Completed)),
        ];
        nodes.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        let ids: Vec<_> = nodes
            .iter()
            .map(|n| (status_rank(n.status.as_ref()), n.id.as_str()))
            .collect();
        assert_eq!(ids, vec![(0, "c"), (2, "a"), (3, "a"), (3, "b")]);
    }

    #[test]
    fn unreadable_sorts_last() {
        let mut nodes = vec![node("zzz", None), node("a", Some(Status::Archived))];
        nodes.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        assert_eq!(nodes.last().unwrap().id, "zzz");
    }

    #[test]
    fn summary_includes_progress() {
        let mut n = node("FEAT-2", Some(Status::InProgress));
        n.title = "Search".to_string();
        n.kind = Some(DocKind::Feature);
        n.progress = Some(ProgressSnapshot {
            total: 5,
            completed: 2,
        });
        assert_eq!(n.summary(), "[In Progress] feature FEAT-2 Search · 2/5 · 40%");
    }

    #[test]
    fn summary_for_unreadable_is_bare() {
        let n = node("broken.md", None);
        assert_eq!(n.summary(), "broken.md");
    }
}
