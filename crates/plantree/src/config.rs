//! Workspace configuration.
//!
//! Config lives in a YAML file (default `plantree.yaml` in the
//! documents root). A missing file means defaults; a malformed one is
//! an error at the binary boundary. The debounce quiet interval is a
//! constant, deliberately not configuration.

use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use plantree_core::{ProgressPolicy, Status};
use serde::Deserialize;

/// Root configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the planning documents.
    pub root: PathBuf,
    /// Status labels excluded from both progress counts.
    pub excluded_statuses: Vec<String>,
    /// Status labels counted as complete.
    pub completed_statuses: Vec<String>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            root: PathBuf::from("."),
            excluded_statuses: vec!["cancelled".to_string(), "deferred".to_string()],
            completed_statuses: vec!["completed".to_string(), "archived".to_string()],
        }
    }
}

impl Config {
    /// Load from a YAML file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Config> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Config::default());
            }
            Err(err) => {
                return Err(err)
                    .wrap_err_with(|| format!("failed to read config {}", path.display()));
            }
        };
        serde_yaml::from_str(&content)
            .wrap_err_with(|| format!("failed to parse config {}", path.display()))
    }

    /// The progress-counting policy this config describes.
    pub fn policy(&self) -> ProgressPolicy {
        ProgressPolicy::new(
            self.excluded_statuses
                .iter()
                .map(|s| Status::parse(s))
                .collect(),
            self.completed_statuses
                .iter()
                .map(|s| Status::parse(s))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plantree_core::{DocumentMeta, FrontmatterRecord};

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::load(Path::new("/no/such/plantree.yaml")).unwrap();
        assert_eq!(config.root, PathBuf::from("."));
        assert_eq!(config.excluded_statuses, vec!["cancelled", "deferred"]);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plantree.yaml");
        std::fs::write(&path, "root: [not\n").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn parses_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plantree.yaml");
        std::fs::write(
            &path,
            "root: docs/plans\nexcluded_statuses: [cancelled]\ncompleted_statuses: [done]\n",
        )
        .unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.root, PathBuf::from("docs/plans"));

        let policy = config.policy();
        let deferred = DocumentMeta::Parsed(FrontmatterRecord::for_status(Status::Deferred));
        // Deferred is no longer excluded under this policy.
        assert_eq!(policy.classify(&deferred), Some(false));
    }
}
