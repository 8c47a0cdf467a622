//! The read path: turn the current document set into display nodes.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use plantree_core::TreeNode;

use crate::cache::{FrontmatterCache, ProgressCache};

/// Builds the ordered node list the UI renders.
///
/// Stateless and idempotent: it only pulls through the caches (lazy
/// fill included) and never mutates beyond that, so two builds without
/// an intervening invalidation or enumeration change yield identical
/// output. Ordering is status group first, then identifier.
pub struct TreeSnapshotBuilder {
    frontmatter: Arc<FrontmatterCache>,
    progress: Arc<ProgressCache>,
}

impl TreeSnapshotBuilder {
    pub fn new(
        frontmatter: Arc<FrontmatterCache>,
        progress: Arc<ProgressCache>,
    ) -> TreeSnapshotBuilder {
        TreeSnapshotBuilder {
            frontmatter,
            progress,
        }
    }

    /// Build display nodes for the given document set (supplied by the
    /// directory enumerator on each call, never cached here).
    pub async fn build(&self, documents: &[PathBuf]) -> Vec<TreeNode> {
        let mut documents: Vec<PathBuf> = documents.to_vec();
        documents.sort();
        documents.dedup();

        let mut metas = Vec::with_capacity(documents.len());
        for path in &documents {
            metas.push((path.clone(), self.frontmatter.get(path).await));
        }

        // Direct children per container, from declared parent refs.
        // A parent outside the enumerated set is simply never rendered,
        // which is the "treat as no parent" degradation.
        let mut children: HashMap<PathBuf, Vec<PathBuf>> = HashMap::new();
        for (path, meta) in &metas {
            if let Some(parent) = meta.record().and_then(|r| r.resolve_parent(path)) {
                children.entry(parent).or_default().push(path.clone());
            }
        }

        let mut nodes = Vec::with_capacity(metas.len());
        for (path, meta) in &metas {
            let node = match meta.record() {
                Some(record) => {
                    let progress = match children.get(path) {
                        Some(kids) if record.kind.is_container() => {
                            self.progress.get(path, kids, &self.frontmatter).await
                        }
                        _ => None,
                    };
                    TreeNode {
                        path: path.clone(),
                        id: record.id.clone(),
                        title: record.title.clone(),
                        status: Some(record.status.clone()),
                        kind: Some(record.kind.clone()),
                        progress,
                    }
                }
                None => {
                    // Unreadable: degrade to a filename-only node.
                    let filename = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string());
                    TreeNode {
                        path: path.clone(),
                        id: filename.clone(),
                        title: filename,
                        status: None,
                        kind: None,
                        progress: None,
                    }
                }
            };
            nodes.push(node);
        }

        nodes.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        nodes
    }
}
