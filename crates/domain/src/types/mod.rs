//! Domain data types
//!
//! Raw API record shapes, the ADF rich-text document tree, and the fixed
//! normalized output schema.

pub mod adf;
pub mod issue;

pub use adf::{AdfAttrs, AdfDocument, AdfNode};
pub use issue::{
    Category, DescriptionField, IssueFields, NamedRef, NormalizedIssue, ProjectRef, RawIssue,
    UserRef,
};
