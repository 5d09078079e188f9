//! Pipeline service - sequences extraction, capture, normalization and
//! classification for a single run

use std::sync::Arc;

use issuearc_domain::{IssueArcError, Result};
use tracing::info;

use super::ports::{IssueSource, SnapshotStore};
use crate::classification::{ClassificationOutcome, ClassificationService};
use crate::normalize::normalize;

/// The caller's choice of raw data for this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSelection {
    /// Extract fresh data from the remote API and capture it.
    Fresh,
    /// Replay a stored snapshot by 1-based index.
    Existing(usize),
}

impl SnapshotSelection {
    /// Parse the caller's selection string against the number of stored
    /// snapshots: `"0"` starts a fresh extraction, `1..=available` replays.
    ///
    /// # Errors
    /// Returns [`IssueArcError::Selection`] for non-numeric or out-of-range
    /// input, before any state is touched.
    pub fn parse(input: &str, available: usize) -> Result<Self> {
        let choice: usize = input.trim().parse().map_err(|_| {
            IssueArcError::Selection(format!("'{}' is not a number", input.trim()))
        })?;

        match choice {
            0 => Ok(Self::Fresh),
            n if n <= available => Ok(Self::Existing(n)),
            n => Err(IssueArcError::Selection(format!(
                "snapshot {n} does not exist ({available} available)"
            ))),
        }
    }
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// Snapshot name the run operated on.
    pub snapshot: String,
    /// Raw issues extracted or replayed.
    pub raw_issues: usize,
    /// Classification stage summary.
    pub outcome: ClassificationOutcome,
}

/// Sequences the run: extract-or-replay → normalize → classify.
pub struct PipelineService {
    source: Arc<dyn IssueSource>,
    snapshots: Arc<dyn SnapshotStore>,
    classification: ClassificationService,
}

impl PipelineService {
    /// Create a new pipeline service.
    pub fn new(
        source: Arc<dyn IssueSource>,
        snapshots: Arc<dyn SnapshotStore>,
        classification: ClassificationService,
    ) -> Self {
        Self { source, snapshots, classification }
    }

    /// Run the pipeline for the selected raw data.
    ///
    /// A fresh extraction is captured as a snapshot before normalization
    /// begins, so a later run can replay it without re-hitting the network.
    ///
    /// # Errors
    /// Propagates extraction, snapshot, schema and checkpoint errors; a
    /// failed extraction persists nothing.
    pub async fn run(
        &self,
        selection: SnapshotSelection,
        page_size: usize,
    ) -> Result<PipelineReport> {
        let (snapshot, raw) = match selection {
            SnapshotSelection::Fresh => {
                let issues = self.source.fetch_issues(page_size).await?;
                let name = self.snapshots.save(&issues).await?;
                info!(snapshot = %name, issues = issues.len(), "raw data captured");
                (name, issues)
            }
            SnapshotSelection::Existing(index) => {
                let issues = self.snapshots.load(index).await?;
                let name = self
                    .snapshots
                    .list()
                    .await?
                    .get(index - 1)
                    .cloned()
                    .unwrap_or_else(|| format!("#{index}"));
                info!(snapshot = %name, issues = issues.len(), "replaying raw extract");
                (name, issues)
            }
        };

        let normalized = normalize(&raw)?;
        let outcome = self.classification.run(&normalized).await?;

        Ok(PipelineReport { snapshot, raw_issues: raw.len(), outcome })
    }
}
