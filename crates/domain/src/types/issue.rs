//! Issue record shapes
//!
//! `RawIssue` mirrors the nested record returned by the Jira search
//! endpoint for the fields the pipeline requests; `NormalizedIssue` is the
//! fixed flat schema every downstream stage and the checkpoint file share.

use serde::{Deserialize, Serialize};

use super::adf::AdfDocument;

/// A raw issue as returned by the search endpoint.
///
/// Immutable once fetched; the unit of pagination. Every field is optional
/// so that partially-shaped payloads deserialize and are judged by the
/// normalizer rather than the decoder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawIssue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default)]
    pub fields: IssueFields,
}

/// The `fields` object of a raw issue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<DescriptionField>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuetype: Option<NamedRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<NamedRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<NamedRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<UserRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolutiondate: Option<String>,
}

/// An issue description: newer projects return an ADF document tree,
/// older API versions a plain string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DescriptionField {
    Document(AdfDocument),
    Text(String),
}

/// Project reference embedded in an issue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Named reference (issue type, status, resolution).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamedRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// User reference (assignee).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserRef {
    #[serde(rename = "displayName", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// The fixed flat output schema.
///
/// Serde names match the checkpoint file header row exactly. `category` is
/// empty until classification fills it; missing optional source fields map
/// to empty strings, never to errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedIssue {
    #[serde(rename = "Project")]
    pub project: String,

    #[serde(rename = "Key")]
    pub key: String,

    #[serde(rename = "Updated")]
    pub updated: String,

    #[serde(rename = "Updated_YearMonth")]
    pub updated_year_month: String,

    #[serde(rename = "Created")]
    pub created: String,

    #[serde(rename = "Summary")]
    pub summary: String,

    #[serde(rename = "Description")]
    pub description: String,

    #[serde(rename = "Issue_Type")]
    pub issue_type: String,

    #[serde(rename = "Status")]
    pub status: String,

    #[serde(rename = "Resolution")]
    pub resolution: String,

    #[serde(rename = "Resolved_YearMonth")]
    pub resolved_year_month: String,

    #[serde(rename = "Assignee")]
    pub assignee: String,

    #[serde(rename = "Category", default)]
    pub category: String,
}

/// A business category supplied by configuration.
///
/// Immutable for a run; used only as classification input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,

    #[serde(default)]
    pub description: String,
}
