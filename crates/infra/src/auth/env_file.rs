//! Dotenv-style token persistence
//!
//! Rewrites the token triple in a `.env` file so subsequent process
//! invocations pick up refreshed tokens at startup. Existing unrelated
//! lines are preserved byte-for-byte; token keys are replaced in place and
//! appended when absent.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use issuearc_domain::{IssueArcError, Result};
use tracing::debug;

use super::traits::TokenPersistence;
use super::types::TokenSet;
use super::{ENV_ACCESS_TOKEN, ENV_REFRESH_TOKEN, ENV_TOKEN_EXPIRES_AT};

/// Persists the token triple into a dotenv-style file.
pub struct EnvFilePersistence {
    path: PathBuf,
}

impl EnvFilePersistence {
    /// Create a persistence adapter for the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this adapter writes to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn render(&self, existing: &str, tokens: &TokenSet) -> String {
        let expires_at =
            tokens.expires_at.map(|ts| ts.timestamp().to_string()).unwrap_or_default();
        let refresh_token = tokens.refresh_token.clone().unwrap_or_default();

        let mut replacements = [
            (ENV_ACCESS_TOKEN, tokens.access_token.as_str(), false),
            (ENV_REFRESH_TOKEN, refresh_token.as_str(), false),
            (ENV_TOKEN_EXPIRES_AT, expires_at.as_str(), false),
        ];

        let mut lines: Vec<String> = Vec::new();
        for line in existing.lines() {
            match replacements
                .iter_mut()
                .find(|(key, _, _)| line.starts_with(&format!("{key}=")))
            {
                Some((key, value, written)) => {
                    lines.push(format!("{key}={value}"));
                    *written = true;
                }
                None => lines.push(line.to_string()),
            }
        }

        for (key, value, written) in replacements {
            if !written {
                lines.push(format!("{key}={value}"));
            }
        }

        let mut rendered = lines.join("\n");
        rendered.push('\n');
        rendered
    }
}

#[async_trait]
impl TokenPersistence for EnvFilePersistence {
    async fn persist(&self, tokens: &TokenSet) -> Result<()> {
        let existing = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(err) => {
                return Err(IssueArcError::Storage(format!(
                    "failed to read {}: {err}",
                    self.path.display()
                )))
            }
        };

        let rendered = self.render(&existing, tokens);
        std::fs::write(&self.path, rendered).map_err(|err| {
            IssueArcError::Storage(format!("failed to write {}: {err}", self.path.display()))
        })?;

        debug!(path = %self.path.display(), "token triple persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::env_file.
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    use super::*;

    fn tokens() -> TokenSet {
        TokenSet::from_parts(
            "new-access".to_string(),
            Some("new-refresh".to_string()),
            Some(Utc.timestamp_opt(1_900_000_000, 0).single().unwrap()),
        )
    }

    #[tokio::test]
    async fn rewrites_existing_keys_in_place() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "JIRA_CLIENT_ID=client\nJIRA_ACCESS_TOKEN=old-access\nJIRA_REFRESH_TOKEN=old-refresh\nJIRA_TOKEN_EXPIRES_AT=1\n",
        )
        .unwrap();

        EnvFilePersistence::new(&path).persist(&tokens()).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "JIRA_CLIENT_ID=client");
        assert_eq!(lines[1], "JIRA_ACCESS_TOKEN=new-access");
        assert_eq!(lines[2], "JIRA_REFRESH_TOKEN=new-refresh");
        assert_eq!(lines[3], "JIRA_TOKEN_EXPIRES_AT=1900000000");
    }

    #[tokio::test]
    async fn appends_missing_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "JIRA_CLIENT_ID=client\n").unwrap();

        EnvFilePersistence::new(&path).persist(&tokens()).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("JIRA_CLIENT_ID=client"));
        assert!(contents.contains("JIRA_ACCESS_TOKEN=new-access"));
        assert!(contents.contains("JIRA_REFRESH_TOKEN=new-refresh"));
        assert!(contents.contains("JIRA_TOKEN_EXPIRES_AT=1900000000"));
    }

    #[tokio::test]
    async fn creates_the_file_when_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");

        EnvFilePersistence::new(&path).persist(&tokens()).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("JIRA_ACCESS_TOKEN=new-access\n"));
    }

    #[tokio::test]
    async fn unrelated_lines_survive_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "# comment\nOTHER=value\n").unwrap();

        let persistence = EnvFilePersistence::new(&path);
        persistence.persist(&tokens()).await.unwrap();
        persistence.persist(&tokens()).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("# comment"));
        assert!(contents.contains("OTHER=value"));
        assert_eq!(contents.matches("JIRA_ACCESS_TOKEN=").count(), 1);
    }
}
