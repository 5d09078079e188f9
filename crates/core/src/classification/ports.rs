//! Port interfaces for issue classification

use async_trait::async_trait;
use issuearc_domain::types::{Category, NormalizedIssue};
use issuearc_domain::Result;

/// Trait for classifying a single issue into a business category.
///
/// One implementation exists per LLM backend; the variant is selected once
/// at configuration time and injected, never branched on per row.
///
/// Implementations are best-effort: any provider-side failure (transport,
/// auth, malformed or empty completion) is absorbed and reported as the
/// `"Unclassified"` sentinel so one hiccup cannot abort the whole run. The
/// returned label is accepted verbatim — it is not validated against the
/// configured category set.
#[async_trait]
pub trait IssueClassifier: Send + Sync {
    /// Classify an issue by its summary and description.
    ///
    /// # Arguments
    /// * `summary` - Issue summary line
    /// * `description` - Extracted plain-text description, possibly empty
    /// * `categories` - The configured category list offered to the model
    /// * `model` - Optional per-call model override
    ///
    /// # Returns
    /// A category name, or the `"Unclassified"` sentinel on any failure.
    async fn classify(
        &self,
        summary: &str,
        description: &str,
        categories: &[Category],
        model: Option<&str>,
    ) -> String;
}

/// Trait for the durable set of already-classified issues.
///
/// The store is keyed by issue `Key`; rows are only ever appended, never
/// mutated or removed, and the whole set is rewritten on save.
#[async_trait]
pub trait CheckpointRepository: Send + Sync {
    /// Load all checkpoint rows; an absent store yields an empty set.
    async fn load(&self) -> Result<Vec<NormalizedIssue>>;

    /// Persist the full row set, replacing any previous contents.
    async fn save(&self, rows: &[NormalizedIssue]) -> Result<()>;
}
