//! Raw extraction snapshots
//!
//! Each extraction run is captured as a timestamped JSON document of shape
//! `{"issues": [...]}` before any further processing, so later runs can
//! replay it without re-hitting the network.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use issuearc_core::SnapshotStore;
use issuearc_domain::constants::{RAW_SNAPSHOT_PREFIX, RAW_SNAPSHOT_TIMESTAMP_FORMAT};
use issuearc_domain::types::RawIssue;
use issuearc_domain::{IssueArcError, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    issues: Vec<RawIssue>,
}

/// Snapshot store backed by a directory of timestamped JSON files.
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Create a snapshot store rooted at the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory snapshots are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn snapshot_names(&self) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(IssueArcError::Storage(format!(
                    "failed to list {}: {err}",
                    self.dir.display()
                )))
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.starts_with(RAW_SNAPSHOT_PREFIX) && name.ends_with(".json"))
            .collect();
        names.sort();
        Ok(names)
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn save(&self, issues: &[RawIssue]) -> Result<String> {
        std::fs::create_dir_all(&self.dir).map_err(|err| {
            IssueArcError::Storage(format!("failed to create {}: {err}", self.dir.display()))
        })?;

        let name = format!(
            "{RAW_SNAPSHOT_PREFIX}{}.json",
            Utc::now().format(RAW_SNAPSHOT_TIMESTAMP_FORMAT)
        );
        let path = self.dir.join(&name);

        let file = SnapshotFile { issues: issues.to_vec() };
        let rendered = serde_json::to_string_pretty(&file)
            .map_err(|err| IssueArcError::Internal(format!("failed to encode snapshot: {err}")))?;

        std::fs::write(&path, rendered).map_err(|err| {
            IssueArcError::Storage(format!("failed to write {}: {err}", path.display()))
        })?;

        info!(path = %path.display(), issues = issues.len(), "raw snapshot stored");
        Ok(name)
    }

    async fn list(&self) -> Result<Vec<String>> {
        self.snapshot_names()
    }

    async fn load(&self, index: usize) -> Result<Vec<RawIssue>> {
        let names = self.snapshot_names()?;
        let name = names.get(index.wrapping_sub(1)).ok_or_else(|| {
            IssueArcError::Selection(format!(
                "snapshot {index} does not exist ({} available)",
                names.len()
            ))
        })?;

        let path = self.dir.join(name);
        let contents = std::fs::read_to_string(&path).map_err(|err| {
            IssueArcError::Storage(format!("failed to read {}: {err}", path.display()))
        })?;

        let file: SnapshotFile = serde_json::from_str(&contents).map_err(|err| {
            IssueArcError::Storage(format!("corrupt snapshot {}: {err}", path.display()))
        })?;

        info!(path = %path.display(), issues = file.issues.len(), "raw snapshot loaded");
        Ok(file.issues)
    }
}
