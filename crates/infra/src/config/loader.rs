//! Configuration loader
//!
//! Loads the pipeline configuration from a TOML or JSON file (detected by
//! extension) and resolves `${VAR}` / `$VAR` environment references in the
//! raw file before parsing. References to unset variables are left
//! untouched so a missing secret fails loudly at use, not silently at
//! load.

use std::path::Path;

use issuearc_domain::{IssueArcError, PipelineConfig, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::info;

static ENV_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
        .expect("env reference pattern is valid")
});

/// Load the pipeline configuration from a file.
///
/// # Errors
/// Returns `IssueArcError::Config` if the file cannot be read, has an
/// unsupported extension, or fails to parse.
pub fn load(path: &Path) -> Result<PipelineConfig> {
    let contents = std::fs::read_to_string(path).map_err(|err| {
        IssueArcError::Config(format!("failed to read config file {}: {err}", path.display()))
    })?;

    let resolved = interpolate_env(&contents);
    let config = parse_config(&resolved, path)?;

    info!(path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Parse configuration from string content, detecting the format by file
/// extension.
fn parse_config(contents: &str, path: &Path) -> Result<PipelineConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|err| IssueArcError::Config(format!("invalid TOML config: {err}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|err| IssueArcError::Config(format!("invalid JSON config: {err}"))),
        other => {
            Err(IssueArcError::Config(format!("unsupported config format: {other}")))
        }
    }
}

/// Replace `${VAR}` and `$VAR` references with values from the process
/// environment. Unset references are preserved verbatim.
fn interpolate_env(raw: &str) -> String {
    ENV_REFERENCE
        .replace_all(raw, |caps: &Captures<'_>| {
            let name = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str()).unwrap_or("");
            std::env::var(name).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}
