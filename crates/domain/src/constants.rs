//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! pipeline.

// Token lifecycle
pub const TOKEN_REFRESH_GRACE_SECS: i64 = 120;
pub const DEFAULT_TOKEN_EXPIRES_IN_SECS: i64 = 3600;

// Extraction
pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const RAW_SNAPSHOT_PREFIX: &str = "jira_raw_data_";
pub const RAW_SNAPSHOT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// Classification
pub const UNCLASSIFIED_SENTINEL: &str = "Unclassified";
pub const UNKNOWN_PROJECT: &str = "Unknown Project";
pub const DEFAULT_CHECKPOINT_FLUSH_INTERVAL: usize = 25;

// Normalized schema timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
pub const YEAR_MONTH_FORMAT: &str = "%Y-%m";

/// Column order of the checkpoint file header row.
pub const OUTPUT_COLUMNS: [&str; 13] = [
    "Project",
    "Key",
    "Updated",
    "Updated_YearMonth",
    "Created",
    "Summary",
    "Description",
    "Issue_Type",
    "Status",
    "Resolution",
    "Resolved_YearMonth",
    "Assignee",
    "Category",
];
