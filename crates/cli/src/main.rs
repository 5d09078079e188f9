//! IssueArc - Jira extraction and classification pipeline
//!
//! Binary entry point: parses arguments, loads configuration and the
//! environment, wires the adapters together and runs one pipeline pass.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use issuearc_core::{
    ClassificationService, IssueClassifier, PipelineService, SnapshotSelection, SnapshotStore,
};
use issuearc_domain::{PipelineConfig, ProviderKind};
use issuearc_infra::{
    AnthropicClassifier, BedrockClassifier, CsvCheckpointStore, EnvFilePersistence,
    FileSnapshotStore, HttpClient, JiraClient, OpenAiClassifier, TokenStore,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Jira data extraction and classification pipeline.
#[derive(Debug, Parser)]
#[command(name = "issuearc", version, about)]
struct Args {
    /// Path to the configuration file (TOML or JSON).
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Require interactive confirmation before running.
    #[arg(long)]
    interactive: bool,

    /// Maximum number of results per page fetched from the API.
    #[arg(long, default_value_t = 50)]
    max_results: usize,

    /// Snapshot selection for non-interactive runs: 0 extracts fresh data,
    /// N replays the N-th stored snapshot.
    #[arg(long)]
    select: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load environment variables from .env file
    match dotenvy::dotenv() {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(err) => warn!(error = %err, "could not load .env file"),
    }

    let args = Args::parse();

    if args.interactive && !confirm("You are about to run the pipeline. Continue? (yes/no): ")? {
        info!("run cancelled");
        return Ok(());
    }

    let config = issuearc_infra::config::load(&args.config)?;
    let pipeline = build_pipeline(&config)?;

    let snapshots = FileSnapshotStore::new(&config.output.raw_data_path);
    let existing = snapshots.list().await?;

    let selection_input = match args.select {
        Some(selection) => selection,
        None => prompt_selection(&existing)?,
    };
    let selection = SnapshotSelection::parse(&selection_input, existing.len())?;

    let report = pipeline.run(selection, args.max_results).await?;
    info!(
        snapshot = %report.snapshot,
        raw_issues = report.raw_issues,
        classified = report.outcome.classified,
        unclassified = report.outcome.unclassified,
        checkpoint_rows = report.outcome.checkpoint_rows,
        "pipeline run complete"
    );
    Ok(())
}

fn build_pipeline(config: &PipelineConfig) -> anyhow::Result<PipelineService> {
    let http = HttpClient::new().context("failed to build HTTP client")?;

    let persistence = Arc::new(EnvFilePersistence::new(".env"));
    let token_store = Arc::new(TokenStore::from_env(
        http.clone(),
        config.jira.token_url.clone(),
        persistence,
    ));

    let source = Arc::new(JiraClient::new(
        http.clone(),
        token_store,
        config.jira.api_url.clone(),
        config.jira.filter_id.clone(),
    ));

    let snapshots = Arc::new(FileSnapshotStore::new(&config.output.raw_data_path));
    let checkpoint = Arc::new(CsvCheckpointStore::new(
        &config.output.checkpoint_path,
        config.output.columns.clone(),
    ));

    let classification = &config.classification;
    let classifier: Arc<dyn IssueClassifier> = match classification.provider {
        ProviderKind::OpenAi => {
            Arc::new(OpenAiClassifier::new(classification.api_key.clone(), http))
        }
        ProviderKind::Claude => {
            Arc::new(AnthropicClassifier::new(classification.api_key.clone(), http))
        }
        ProviderKind::Bedrock => {
            let mut client = BedrockClassifier::new(classification.api_key.clone(), http);
            if let Some(region) = classification.region.as_deref() {
                client = client.with_region(region);
            }
            Arc::new(client)
        }
    };

    let service = ClassificationService::new(
        classifier,
        checkpoint,
        classification.categories.clone(),
        classification.model.clone(),
        classification.flush_interval,
    );

    Ok(PipelineService::new(source, snapshots, service))
}

/// Print the stored snapshots and read the caller's selection.
fn prompt_selection(existing: &[String]) -> anyhow::Result<String> {
    println!("Existing raw extracts:");
    for (index, name) in existing.iter().enumerate() {
        println!("{}. {name}", index + 1);
    }
    println!("0. Start extracting from scratch");
    print!("Select an option (0 to start from scratch or file number): ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt}");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("yes"))
}
