//! CSV classification checkpoint
//!
//! The durable, deduplicated record of issues already classified. Read at
//! the start of a run, rewritten wholesale on save; rows are only ever
//! appended by the classification loop, never mutated or removed. The
//! rewrite goes through a sibling temp file and a rename so an interrupted
//! save never truncates the previous checkpoint.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use issuearc_core::CheckpointRepository;
use issuearc_domain::types::NormalizedIssue;
use issuearc_domain::{IssueArcError, Result};
use tracing::info;

/// Checkpoint store backed by one tabular CSV file.
pub struct CsvCheckpointStore {
    path: PathBuf,
    columns: Vec<String>,
}

impl CsvCheckpointStore {
    /// Create a checkpoint store for the given file, with the configured
    /// header column set.
    pub fn new(path: impl Into<PathBuf>, columns: Vec<String>) -> Self {
        Self { path: path.into(), columns }
    }

    /// The checkpoint file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_err(&self, action: &str, err: impl std::fmt::Display) -> IssueArcError {
        IssueArcError::Storage(format!("failed to {action} {}: {err}", self.path.display()))
    }
}

#[async_trait]
impl CheckpointRepository for CsvCheckpointStore {
    async fn load(&self) -> Result<Vec<NormalizedIssue>> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "no checkpoint yet, starting empty");
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)
            .map_err(|err| self.storage_err("open", err))?;

        let mut rows = Vec::new();
        for record in reader.deserialize::<NormalizedIssue>() {
            rows.push(record.map_err(|err| self.storage_err("read", err))?);
        }

        info!(path = %self.path.display(), rows = rows.len(), "checkpoint loaded");
        Ok(rows)
    }

    async fn save(&self, rows: &[NormalizedIssue]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|err| self.storage_err("create directory for", err))?;
            }
        }

        let tmp_path = self.path.with_extension("csv.tmp");
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_path(&tmp_path)
                .map_err(|err| self.storage_err("create", err))?;

            writer
                .write_record(&self.columns)
                .map_err(|err| self.storage_err("write header to", err))?;

            for row in rows {
                let value = serde_json::to_value(row).map_err(|err| {
                    IssueArcError::Internal(format!("failed to encode checkpoint row: {err}"))
                })?;
                let record: Vec<&str> = self
                    .columns
                    .iter()
                    .map(|column| value.get(column).and_then(|v| v.as_str()).unwrap_or(""))
                    .collect();
                writer
                    .write_record(&record)
                    .map_err(|err| self.storage_err("write to", err))?;
            }

            writer.flush().map_err(|err| self.storage_err("flush", err))?;
        }

        std::fs::rename(&tmp_path, &self.path)
            .map_err(|err| self.storage_err("replace", err))?;

        info!(path = %self.path.display(), rows = rows.len(), "checkpoint saved");
        Ok(())
    }
}
