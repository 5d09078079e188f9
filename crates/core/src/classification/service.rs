//! Classification service - the incremental classify-and-checkpoint loop

use std::collections::HashSet;
use std::sync::Arc;

use issuearc_domain::constants::UNCLASSIFIED_SENTINEL;
use issuearc_domain::types::{Category, NormalizedIssue};
use issuearc_domain::Result;
use tracing::{info, warn};

use super::ports::{CheckpointRepository, IssueClassifier};

/// Summary of one classification run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationOutcome {
    /// Issues that were candidates this run (not yet in the checkpoint).
    pub candidates: usize,
    /// Candidates that received a usable category.
    pub classified: usize,
    /// Candidates left for a future run via the sentinel.
    pub unclassified: usize,
    /// Total rows in the checkpoint after the run.
    pub checkpoint_rows: usize,
}

/// Drives the `LOADED → FILTERED → CLASSIFYING → SAVED` loop.
///
/// The checkpoint filter makes repeated runs incremental: issues whose key
/// is already stored are skipped, and sentinel results are deliberately NOT
/// stored so they are retried on the next run.
pub struct ClassificationService {
    classifier: Arc<dyn IssueClassifier>,
    checkpoint: Arc<dyn CheckpointRepository>,
    categories: Vec<Category>,
    model: Option<String>,
    flush_interval: usize,
}

impl ClassificationService {
    /// Create a new classification service.
    ///
    /// # Arguments
    /// * `classifier` - The configured LLM backend
    /// * `checkpoint` - Durable store of already-classified rows
    /// * `categories` - Category list offered to the model, fixed for a run
    /// * `model` - Optional model override forwarded to the classifier
    /// * `flush_interval` - Persist progress every this many classified rows
    ///   (0 disables mid-run flushing)
    pub fn new(
        classifier: Arc<dyn IssueClassifier>,
        checkpoint: Arc<dyn CheckpointRepository>,
        categories: Vec<Category>,
        model: Option<String>,
        flush_interval: usize,
    ) -> Self {
        Self { classifier, checkpoint, categories, model, flush_interval }
    }

    /// Classify every issue not yet in the checkpoint, in input order.
    ///
    /// Newly classified rows are appended after the existing rows; the full
    /// set is flushed periodically and once more at the end. No key ever
    /// appears twice.
    ///
    /// # Errors
    /// Returns an error when the checkpoint store cannot be read or
    /// written. Classification failures never abort the run.
    pub async fn run(&self, issues: &[NormalizedIssue]) -> Result<ClassificationOutcome> {
        let mut rows = self.checkpoint.load().await?;
        let mut processed: HashSet<String> = rows.iter().map(|row| row.key.clone()).collect();

        let candidates: Vec<&NormalizedIssue> =
            issues.iter().filter(|issue| !processed.contains(&issue.key)).collect();

        let total = candidates.len();
        info!(candidates = total, checkpoint_rows = rows.len(), "starting classification");

        let mut classified = 0usize;
        let mut unclassified = 0usize;
        let mut unflushed = 0usize;

        for (index, issue) in candidates.iter().enumerate() {
            // A key duplicated within the input batch is classified once.
            if processed.contains(&issue.key) {
                continue;
            }

            info!(issue_key = %issue.key, remaining = total - index - 1, "classifying issue");

            let label = self
                .classifier
                .classify(&issue.summary, &issue.description, &self.categories, self.model.as_deref())
                .await;

            if label == UNCLASSIFIED_SENTINEL {
                warn!(issue_key = %issue.key, "issue left unclassified, will retry next run");
                unclassified += 1;
                continue;
            }

            let mut row = (*issue).clone();
            row.category = label;
            processed.insert(row.key.clone());
            rows.push(row);
            classified += 1;
            unflushed += 1;

            if self.flush_interval > 0 && unflushed >= self.flush_interval {
                self.checkpoint.save(&rows).await?;
                unflushed = 0;
            }
        }

        self.checkpoint.save(&rows).await?;

        let outcome = ClassificationOutcome {
            candidates: total,
            classified,
            unclassified,
            checkpoint_rows: rows.len(),
        };
        info!(
            classified = outcome.classified,
            unclassified = outcome.unclassified,
            checkpoint_rows = outcome.checkpoint_rows,
            "issue classification complete"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for classification::service.
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Classifier stub that replays a fixed sequence of labels.
    struct SequenceClassifier {
        labels: Vec<&'static str>,
        calls: AtomicUsize,
    }

    impl SequenceClassifier {
        fn new(labels: Vec<&'static str>) -> Self {
            Self { labels, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl IssueClassifier for SequenceClassifier {
        async fn classify(
            &self,
            _summary: &str,
            _description: &str,
            _categories: &[Category],
            _model: Option<&str>,
        ) -> String {
            let index = self.calls.fetch_add(1, Ordering::SeqCst);
            self.labels[index % self.labels.len()].to_string()
        }
    }

    /// In-memory checkpoint that also counts saves.
    #[derive(Default)]
    struct MemoryCheckpoint {
        rows: Mutex<Vec<NormalizedIssue>>,
        saves: AtomicUsize,
    }

    #[async_trait]
    impl CheckpointRepository for MemoryCheckpoint {
        async fn load(&self) -> Result<Vec<NormalizedIssue>> {
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn save(&self, rows: &[NormalizedIssue]) -> Result<()> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            *self.rows.lock().unwrap() = rows.to_vec();
            Ok(())
        }
    }

    fn issue(key: &str) -> NormalizedIssue {
        NormalizedIssue {
            key: key.to_string(),
            summary: format!("summary for {key}"),
            ..NormalizedIssue::default()
        }
    }

    fn categories() -> Vec<Category> {
        vec![Category { name: "Bug".to_string(), description: "defects".to_string() }]
    }

    fn service(
        classifier: Arc<dyn IssueClassifier>,
        checkpoint: Arc<MemoryCheckpoint>,
        flush_interval: usize,
    ) -> ClassificationService {
        ClassificationService::new(classifier, checkpoint, categories(), None, flush_interval)
    }

    #[tokio::test]
    async fn classifies_and_checkpoints_in_input_order() {
        let checkpoint = Arc::new(MemoryCheckpoint::default());
        let svc =
            service(Arc::new(SequenceClassifier::new(vec!["Bug"])), checkpoint.clone(), 0);

        let outcome =
            svc.run(&[issue("A-1"), issue("A-2"), issue("A-3")]).await.unwrap();

        assert_eq!(outcome.candidates, 3);
        assert_eq!(outcome.classified, 3);
        assert_eq!(outcome.checkpoint_rows, 3);

        let rows = checkpoint.rows.lock().unwrap();
        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["A-1", "A-2", "A-3"]);
        assert!(rows.iter().all(|r| r.category == "Bug"));
    }

    #[tokio::test]
    async fn second_run_skips_checkpointed_keys() {
        let checkpoint = Arc::new(MemoryCheckpoint::default());
        let classifier = Arc::new(SequenceClassifier::new(vec!["Bug"]));
        let svc = service(classifier.clone(), checkpoint.clone(), 0);

        let input = [issue("A-1"), issue("A-2")];
        svc.run(&input).await.unwrap();
        let outcome = svc.run(&input).await.unwrap();

        // No duplicates after both runs, and no second round of model calls.
        assert_eq!(outcome.candidates, 0);
        assert_eq!(outcome.checkpoint_rows, 2);
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 2);

        let rows = checkpoint.rows.lock().unwrap();
        let mut keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 2);
    }

    #[tokio::test]
    async fn sentinel_results_are_retried_on_the_next_run() {
        let checkpoint = Arc::new(MemoryCheckpoint::default());
        // Alternates across both runs: run 1 leaves A-1 and A-3 unclassified,
        // run 2 picks them up.
        let classifier =
            Arc::new(SequenceClassifier::new(vec!["Unclassified", "Bug", "Unclassified", "Bug"]));
        let svc = service(classifier, checkpoint.clone(), 0);

        let input = [issue("A-1"), issue("A-2"), issue("A-3"), issue("A-4")];

        let first = svc.run(&input).await.unwrap();
        assert_eq!(first.classified, 2);
        assert_eq!(first.unclassified, 2);

        let second = svc.run(&input).await.unwrap();
        assert_eq!(second.candidates, 2);
        assert_eq!(second.classified, 2);
        assert_eq!(second.checkpoint_rows, 4);

        let rows = checkpoint.rows.lock().unwrap();
        assert!(rows.iter().all(|r| r.category == "Bug"));
    }

    #[tokio::test]
    async fn duplicate_keys_within_a_run_are_classified_once() {
        let checkpoint = Arc::new(MemoryCheckpoint::default());
        let svc =
            service(Arc::new(SequenceClassifier::new(vec!["Bug"])), checkpoint.clone(), 0);

        let outcome = svc.run(&[issue("A-1"), issue("A-1")]).await.unwrap();

        assert_eq!(outcome.checkpoint_rows, 1);
        assert_eq!(checkpoint.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn flush_interval_persists_progress_mid_run() {
        let checkpoint = Arc::new(MemoryCheckpoint::default());
        let svc =
            service(Arc::new(SequenceClassifier::new(vec!["Bug"])), checkpoint.clone(), 2);

        svc.run(&[issue("A-1"), issue("A-2"), issue("A-3"), issue("A-4"), issue("A-5")])
            .await
            .unwrap();

        // Two mid-run flushes (after rows 2 and 4) plus the terminal save.
        assert_eq!(checkpoint.saves.load(Ordering::SeqCst), 3);
        assert_eq!(checkpoint.rows.lock().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn existing_rows_keep_their_position() {
        let checkpoint = Arc::new(MemoryCheckpoint::default());
        {
            let mut seeded = issue("OLD-1");
            seeded.category = "Maintenance".to_string();
            checkpoint.rows.lock().unwrap().push(seeded);
        }

        let svc =
            service(Arc::new(SequenceClassifier::new(vec!["Bug"])), checkpoint.clone(), 0);
        svc.run(&[issue("NEW-1")]).await.unwrap();

        let rows = checkpoint.rows.lock().unwrap();
        assert_eq!(rows[0].key, "OLD-1");
        assert_eq!(rows[0].category, "Maintenance");
        assert_eq!(rows[1].key, "NEW-1");
    }
}
