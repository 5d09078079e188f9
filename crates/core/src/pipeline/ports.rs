//! Port interfaces for extraction and raw-data capture

use async_trait::async_trait;
use issuearc_domain::types::RawIssue;
use issuearc_domain::Result;

/// Trait for fetching the full raw issue set from the remote API.
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Fetch every matching issue, paging through the endpoint in
    /// `page_size` steps and preserving API-returned order.
    ///
    /// # Errors
    /// Returns [`issuearc_domain::IssueArcError::Extraction`] on any
    /// transport error or non-2xx response; partial pages are discarded.
    async fn fetch_issues(&self, page_size: usize) -> Result<Vec<RawIssue>>;
}

/// Trait for the timestamped raw-snapshot store.
///
/// Snapshots make the pipeline re-runnable without re-hitting the network:
/// a fresh extraction is captured before any further processing, and later
/// runs can replay any stored snapshot instead.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Persist a raw extraction as a new timestamped snapshot.
    ///
    /// # Returns
    /// The name of the snapshot written.
    async fn save(&self, issues: &[RawIssue]) -> Result<String>;

    /// List stored snapshot names, oldest first.
    async fn list(&self) -> Result<Vec<String>>;

    /// Load a snapshot by 1-based index into the [`SnapshotStore::list`]
    /// order.
    ///
    /// # Errors
    /// Returns [`issuearc_domain::IssueArcError::Selection`] for an
    /// out-of-range index.
    async fn load(&self, index: usize) -> Result<Vec<RawIssue>>;
}
