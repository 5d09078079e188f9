//! Integration tests for the pipeline orchestrator.
//!
//! Exercises the full extract-or-replay → normalize → classify sequence
//! over in-memory port implementations.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use issuearc_core::{
    ClassificationService, CheckpointRepository, IssueClassifier, IssueSource, PipelineService,
    SnapshotSelection, SnapshotStore,
};
use issuearc_domain::types::{
    Category, IssueFields, NamedRef, NormalizedIssue, ProjectRef, RawIssue, UserRef,
};
use issuearc_domain::{IssueArcError, Result};

/// Records the order of side effects across ports.
#[derive(Default)]
struct EventLog(Mutex<Vec<String>>);

impl EventLog {
    fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

struct StubSource {
    issues: Vec<RawIssue>,
    log: Arc<EventLog>,
    calls: AtomicUsize,
}

#[async_trait]
impl IssueSource for StubSource {
    async fn fetch_issues(&self, _page_size: usize) -> Result<Vec<RawIssue>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.push("fetch");
        Ok(self.issues.clone())
    }
}

#[derive(Default)]
struct MemorySnapshots {
    stored: Mutex<Vec<Vec<RawIssue>>>,
    log: Arc<EventLog>,
}

#[async_trait]
impl SnapshotStore for MemorySnapshots {
    async fn save(&self, issues: &[RawIssue]) -> Result<String> {
        self.log.push("snapshot_save");
        let mut stored = self.stored.lock().unwrap();
        stored.push(issues.to_vec());
        Ok(format!("jira_raw_data_{:04}.json", stored.len()))
    }

    async fn list(&self) -> Result<Vec<String>> {
        let stored = self.stored.lock().unwrap();
        Ok((1..=stored.len()).map(|n| format!("jira_raw_data_{n:04}.json")).collect())
    }

    async fn load(&self, index: usize) -> Result<Vec<RawIssue>> {
        self.log.push("snapshot_load");
        let stored = self.stored.lock().unwrap();
        stored
            .get(index - 1)
            .cloned()
            .ok_or_else(|| IssueArcError::Selection(format!("snapshot {index} does not exist")))
    }
}

struct StubClassifier {
    labels: Vec<&'static str>,
    calls: AtomicUsize,
    log: Arc<EventLog>,
}

#[async_trait]
impl IssueClassifier for StubClassifier {
    async fn classify(
        &self,
        _summary: &str,
        _description: &str,
        _categories: &[Category],
        _model: Option<&str>,
    ) -> String {
        self.log.push("classify");
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.labels[index % self.labels.len()].to_string()
    }
}

#[derive(Default)]
struct MemoryCheckpoint {
    rows: Mutex<Vec<NormalizedIssue>>,
}

#[async_trait]
impl CheckpointRepository for MemoryCheckpoint {
    async fn load(&self) -> Result<Vec<NormalizedIssue>> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn save(&self, rows: &[NormalizedIssue]) -> Result<()> {
        *self.rows.lock().unwrap() = rows.to_vec();
        Ok(())
    }
}

fn raw_issue(key: &str) -> RawIssue {
    RawIssue {
        key: Some(key.to_string()),
        fields: IssueFields {
            project: Some(ProjectRef { name: Some("Operations".to_string()) }),
            updated: Some("2024-03-01T12:30:45.000+0000".to_string()),
            created: Some("2024-02-28T09:00:00.000+0000".to_string()),
            summary: Some(format!("summary for {key}")),
            description: None,
            issuetype: Some(NamedRef { name: Some("Task".to_string()) }),
            status: Some(NamedRef { name: Some("Open".to_string()) }),
            resolution: Some(NamedRef { name: Some("Fixed".to_string()) }),
            assignee: Some(UserRef { display_name: Some("Dana Operator".to_string()) }),
            resolutiondate: None,
        },
    }
}

struct Harness {
    pipeline: PipelineService,
    source_calls: Arc<StubSource>,
    checkpoint: Arc<MemoryCheckpoint>,
    log: Arc<EventLog>,
}

fn harness(issues: Vec<RawIssue>, labels: Vec<&'static str>) -> Harness {
    let log = Arc::new(EventLog::default());
    let source = Arc::new(StubSource {
        issues,
        log: log.clone(),
        calls: AtomicUsize::new(0),
    });
    let snapshots =
        Arc::new(MemorySnapshots { stored: Mutex::new(Vec::new()), log: log.clone() });
    let checkpoint = Arc::new(MemoryCheckpoint::default());
    let classifier =
        Arc::new(StubClassifier { labels, calls: AtomicUsize::new(0), log: log.clone() });

    let categories =
        vec![Category { name: "Bug".to_string(), description: "defects".to_string() }];
    let classification =
        ClassificationService::new(classifier, checkpoint.clone(), categories, None, 0);

    Harness {
        pipeline: PipelineService::new(source.clone(), snapshots, classification),
        source_calls: source,
        checkpoint,
        log,
    }
}

#[tokio::test]
async fn fresh_run_captures_snapshot_before_classifying() {
    let h = harness(vec![raw_issue("A-1"), raw_issue("A-2")], vec!["Bug"]);

    let report = h.pipeline.run(SnapshotSelection::Fresh, 50).await.unwrap();

    assert_eq!(report.raw_issues, 2);
    assert_eq!(report.outcome.classified, 2);

    // The snapshot must be durable before any further processing happens.
    let events = h.log.events();
    let snapshot_pos = events.iter().position(|e| e == "snapshot_save").unwrap();
    let first_classify = events.iter().position(|e| e == "classify").unwrap();
    assert!(snapshot_pos < first_classify);
}

#[tokio::test]
async fn replay_bypasses_the_network() {
    let h = harness(vec![raw_issue("A-1")], vec!["Bug"]);

    h.pipeline.run(SnapshotSelection::Fresh, 50).await.unwrap();
    assert_eq!(h.source_calls.calls.load(Ordering::SeqCst), 1);

    // Clear the checkpoint so the replay has work to do.
    h.checkpoint.rows.lock().unwrap().clear();

    let report = h.pipeline.run(SnapshotSelection::Existing(1), 50).await.unwrap();
    assert_eq!(report.raw_issues, 1);
    assert_eq!(h.source_calls.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn two_runs_converge_with_alternating_sentinel() {
    let issues =
        vec![raw_issue("A-1"), raw_issue("A-2"), raw_issue("A-3"), raw_issue("A-4")];
    let h = harness(issues, vec!["Unclassified", "Bug", "Unclassified", "Bug"]);

    let first = h.pipeline.run(SnapshotSelection::Fresh, 50).await.unwrap();
    assert_eq!(first.outcome.classified, 2);
    assert_eq!(first.outcome.unclassified, 2);

    let second = h.pipeline.run(SnapshotSelection::Existing(1), 50).await.unwrap();
    assert_eq!(second.outcome.candidates, 2);
    assert_eq!(second.outcome.classified, 2);

    let rows = h.checkpoint.rows.lock().unwrap();
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r.category == "Bug"));
}

#[tokio::test]
async fn replaying_a_missing_snapshot_is_a_selection_error() {
    let h = harness(vec![raw_issue("A-1")], vec!["Bug"]);

    let err = h.pipeline.run(SnapshotSelection::Existing(7), 50).await.unwrap_err();
    assert!(matches!(err, IssueArcError::Selection(_)));
    assert!(h.checkpoint.rows.lock().unwrap().is_empty());
}
