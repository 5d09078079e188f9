//! Paginated extraction from the Jira search endpoint
//!
//! Pages the saved-filter query from offset 0 until a short page signals
//! the end, requesting only the fields the normalizer consumes. The bearer
//! token is obtained from the token store for every request, so a
//! mid-extraction refresh is transparent.

use std::sync::Arc;

use async_trait::async_trait;
use issuearc_core::IssueSource;
use issuearc_domain::types::RawIssue;
use issuearc_domain::{IssueArcError, Result};
use reqwest::Method;
use serde::Deserialize;
use tracing::info;

use crate::auth::TokenStore;
use crate::http::HttpClient;

/// Fields requested from the search endpoint, in request order.
const SEARCH_FIELDS: [&str; 11] = [
    "project",
    "key",
    "updated",
    "created",
    "summary",
    "description",
    "issuetype",
    "status",
    "resolution",
    "assignee",
    "resolutiondate",
];

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<RawIssue>,
}

/// Client for the issue search endpoint.
pub struct JiraClient {
    http: HttpClient,
    token_store: Arc<TokenStore>,
    api_url: String,
    filter_id: String,
}

impl JiraClient {
    /// Create a new search client bound to one saved filter.
    #[must_use]
    pub fn new(
        http: HttpClient,
        token_store: Arc<TokenStore>,
        api_url: String,
        filter_id: String,
    ) -> Self {
        Self { http, token_store, api_url, filter_id }
    }

    async fn fetch_page(&self, start_at: usize, page_size: usize) -> Result<Vec<RawIssue>> {
        let token = self.token_store.get_valid_token().await?;
        let fields = SEARCH_FIELDS.join(",");
        let jql = format!("filter={}", self.filter_id);

        let builder = self
            .http
            .request(Method::GET, &self.api_url)
            .bearer_auth(token)
            .query(&[("jql", jql.as_str()), ("fields", fields.as_str())])
            .query(&[("startAt", start_at), ("maxResults", page_size)]);

        let response = self
            .http
            .send(builder)
            .await
            .map_err(|err| IssueArcError::Extraction(format!("search request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            return Err(IssueArcError::Extraction(format!(
                "search failed ({status}): {body}"
            )));
        }

        let page: SearchResponse = response.json().await.map_err(|err| {
            IssueArcError::Extraction(format!("failed to parse search response: {err}"))
        })?;

        Ok(page.issues)
    }
}

#[async_trait]
impl IssueSource for JiraClient {
    /// Fetch every issue matching the saved filter.
    ///
    /// Any failed page aborts the whole extraction; partial pages already
    /// fetched are discarded with it.
    async fn fetch_issues(&self, page_size: usize) -> Result<Vec<RawIssue>> {
        let mut all_issues = Vec::new();
        let mut start_at = 0usize;

        loop {
            let page = self.fetch_page(start_at, page_size).await?;
            let count = page.len();
            all_issues.extend(page);

            info!(fetched = count, total = all_issues.len(), "fetched issue page");

            if count < page_size {
                break;
            }
            start_at += page_size;
        }

        info!(total = all_issues.len(), "issue extraction complete");
        Ok(all_issues)
    }
}
