//! Raw issue normalization
//!
//! Maps the nested records returned by the search endpoint into the fixed
//! 13-column flat schema. The mapping is total per row: missing optional
//! values become empty strings. Structural validation is batch-level — a
//! required source field absent from every record of a non-empty batch
//! means the payload does not match the expected API contract.

use chrono::{DateTime, NaiveDateTime, Utc};
use issuearc_domain::constants::{TIMESTAMP_FORMAT, UNKNOWN_PROJECT, YEAR_MONTH_FORMAT};
use issuearc_domain::types::{DescriptionField, NormalizedIssue, RawIssue};
use issuearc_domain::{IssueArcError, Result};
use tracing::{info, warn};

use crate::adf::extract_text;

/// Required source fields, named by their path in the raw payload.
const REQUIRED_FIELDS: [&str; 10] = [
    "fields.project.name",
    "key",
    "fields.updated",
    "fields.created",
    "fields.summary",
    "fields.description",
    "fields.issuetype.name",
    "fields.status.name",
    "fields.resolution.name",
    "fields.assignee.displayName",
];

/// Normalize a batch of raw issues into the fixed flat schema.
///
/// `Category` is left empty; classification fills it later. An empty batch
/// normalizes to an empty output.
///
/// # Errors
/// Returns [`IssueArcError::Schema`] when a required source field is absent
/// from every record of a non-empty batch, and
/// [`IssueArcError::InvalidInput`] when a present `updated`/`created`
/// timestamp cannot be parsed.
pub fn normalize(raw_issues: &[RawIssue]) -> Result<Vec<NormalizedIssue>> {
    if raw_issues.is_empty() {
        info!("no raw issues to normalize");
        return Ok(Vec::new());
    }

    check_required_fields(raw_issues)?;

    let mut normalized = Vec::with_capacity(raw_issues.len());
    for issue in raw_issues {
        normalized.push(normalize_one(issue)?);
    }

    info!(count = normalized.len(), "issue normalization complete");
    Ok(normalized)
}

/// Batch-level shape check: every required field must appear in at least one
/// record. A field that is null or missing everywhere signals an API
/// contract mismatch, not a per-row data gap.
fn check_required_fields(raw_issues: &[RawIssue]) -> Result<()> {
    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|field| !raw_issues.iter().any(|issue| has_field(issue, field)))
        .map(|field| (*field).to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(IssueArcError::Schema { missing })
    }
}

fn has_field(issue: &RawIssue, field: &str) -> bool {
    let fields = &issue.fields;
    match field {
        "key" => issue.key.is_some(),
        "fields.project.name" => {
            fields.project.as_ref().is_some_and(|p| p.name.is_some())
        }
        "fields.updated" => fields.updated.is_some(),
        "fields.created" => fields.created.is_some(),
        "fields.summary" => fields.summary.is_some(),
        "fields.description" => fields.description.is_some(),
        "fields.issuetype.name" => {
            fields.issuetype.as_ref().is_some_and(|t| t.name.is_some())
        }
        "fields.status.name" => fields.status.as_ref().is_some_and(|s| s.name.is_some()),
        "fields.resolution.name" => {
            fields.resolution.as_ref().is_some_and(|r| r.name.is_some())
        }
        "fields.assignee.displayName" => {
            fields.assignee.as_ref().is_some_and(|a| a.display_name.is_some())
        }
        _ => false,
    }
}

fn normalize_one(issue: &RawIssue) -> Result<NormalizedIssue> {
    let key = issue.key.clone().unwrap_or_default();
    let fields = &issue.fields;

    let project = match fields.project.as_ref().and_then(|p| p.name.clone()) {
        Some(name) => name,
        None => {
            warn!(issue_key = %key, "project name missing, defaulting");
            UNKNOWN_PROJECT.to_string()
        }
    };

    let updated = parse_required_timestamp(fields.updated.as_deref(), "updated", &key)?;
    let created = parse_required_timestamp(fields.created.as_deref(), "created", &key)?;

    let updated_year_month =
        updated.map(|ts| ts.format(YEAR_MONTH_FORMAT).to_string()).unwrap_or_default();

    // Invalid resolution dates coerce to empty rather than failing the row.
    let resolved_year_month = fields
        .resolutiondate
        .as_deref()
        .and_then(parse_timestamp)
        .map(|ts| ts.format(YEAR_MONTH_FORMAT).to_string())
        .unwrap_or_default();

    let description = match &fields.description {
        Some(DescriptionField::Document(doc)) => extract_text(Some(doc)),
        Some(DescriptionField::Text(text)) => text.clone(),
        None => String::new(),
    };

    Ok(NormalizedIssue {
        project,
        key,
        updated: format_timestamp(updated),
        updated_year_month,
        created: format_timestamp(created),
        summary: fields.summary.clone().unwrap_or_default(),
        description,
        issue_type: fields.issuetype.as_ref().and_then(|t| t.name.clone()).unwrap_or_default(),
        status: fields.status.as_ref().and_then(|s| s.name.clone()).unwrap_or_default(),
        resolution: fields.resolution.as_ref().and_then(|r| r.name.clone()).unwrap_or_default(),
        resolved_year_month,
        assignee: fields
            .assignee
            .as_ref()
            .and_then(|a| a.display_name.clone())
            .unwrap_or_default(),
        category: String::new(),
    })
}

/// Parse a timestamp that must be valid when present. Absent values pass
/// through as `None` (the batch check already vouched for the field shape).
fn parse_required_timestamp(
    value: Option<&str>,
    field: &str,
    key: &str,
) -> Result<Option<DateTime<Utc>>> {
    match value {
        None => Ok(None),
        Some(raw) => parse_timestamp(raw).map(Some).ok_or_else(|| {
            IssueArcError::InvalidInput(format!(
                "issue {key}: unparseable {field} timestamp '{raw}'"
            ))
        }),
    }
}

/// Parse the timestamp formats the API emits: RFC 3339, the legacy
/// `+0000`-style offset, or a bare seconds-precision local time (read as
/// UTC).
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).ok().map(|naive| naive.and_utc())
}

/// Render a UTC timestamp truncated to the second, or empty when absent.
fn format_timestamp(value: Option<DateTime<Utc>>) -> String {
    value.map(|ts| ts.format(TIMESTAMP_FORMAT).to_string()).unwrap_or_default()
}
