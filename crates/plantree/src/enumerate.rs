//! Directory enumeration: which documents exist right now.

use std::path::{Path, PathBuf};

use eyre::Result;
use tracing::warn;

/// Supplies the current set of document paths. Called by the snapshot
/// builder on each build; results are never cached by the core.
pub trait DocumentEnumerator: Send + Sync {
    fn enumerate(&self) -> Result<Vec<PathBuf>>;
}

/// Gitignore-aware walk of a root directory for markdown documents.
pub struct WalkEnumerator {
    root: PathBuf,
}

impl WalkEnumerator {
    pub fn new(root: impl Into<PathBuf>) -> WalkEnumerator {
        WalkEnumerator { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DocumentEnumerator for WalkEnumerator {
    fn enumerate(&self) -> Result<Vec<PathBuf>> {
        if !self.root.exists() {
            eyre::bail!("document root {} does not exist", self.root.display());
        }

        let mut paths = Vec::new();
        for entry in ignore::WalkBuilder::new(&self.root).build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("skipping unreadable entry: {}", err);
                    continue;
                }
            };
            let path = entry.path();
            // Paths are kept as walked (root-relative joins), not
            // canonicalized: they must compare equal to the paths the
            // watcher reports, since both are used as cache keys.
            if entry.file_type().is_some_and(|t| t.is_file()) && is_markdown(path) {
                paths.push(path.to_path_buf());
            }
        }
        paths.sort();
        Ok(paths)
    }
}

/// Whether a path looks like a planning document.
pub(crate) fn is_markdown(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"))
}
