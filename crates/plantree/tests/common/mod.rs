//! Shared fixtures for the integration tests.

use std::fs;
use std::path::{Path, PathBuf};

/// Write one planning document with front-matter.
pub fn write_doc(
    root: &Path,
    name: &str,
    kind: &str,
    status: &str,
    parent: Option<&str>,
) -> PathBuf {
    let path = root.join(name);
    let parent_line = parent.map(|p| format!("parent: {p}\n")).unwrap_or_default();
    let id = name.trim_end_matches(".md");
    fs::write(
        &path,
        format!(
            "---\nid: {id}\ntitle: {id} title\nstatus: {status}\nkind: {kind}\n{parent_line}---\n\nbody\n"
        ),
    )
    .expect("write fixture doc");
    path
}

/// A three-level fixture: epic `a` containing feature `b` containing
/// five stories, two of them completed.
pub struct Fixture {
    pub epic: PathBuf,
    pub feature: PathBuf,
    pub stories: Vec<PathBuf>,
}

pub fn standard_fixture(root: &Path) -> Fixture {
    let epic = write_doc(root, "a.md", "epic", "in-progress", None);
    let feature = write_doc(root, "b.md", "feature", "in-progress", Some("a.md"));
    let statuses = ["done", "done", "in-progress", "todo", "blocked"];
    let stories = statuses
        .iter()
        .enumerate()
        .map(|(i, status)| {
            write_doc(root, &format!("s{}.md", i + 1), "story", status, Some("b.md"))
        })
        .collect();
    Fixture {
        epic,
        feature,
        stories,
    }
}
