//! Plain-text extraction from ADF document trees
//!
//! Walks the nested rich-text tree Jira returns for descriptions and
//! flattens it to plain text: paragraph children are joined with no
//! separator, top-level blocks with a blank line, `hardBreak` contributes a
//! newline, `mention` its display name. Every other node type is ignored.
//!
//! Extraction is pure and total: no I/O, and a malformed tree never raises —
//! it is logged and surfaces as the empty string.

use issuearc_domain::types::{AdfDocument, AdfNode};
use tracing::error;

/// Trees nested beyond this depth are treated as malformed.
const MAX_TREE_DEPTH: usize = 128;

/// Extract plain text from an optional ADF document.
///
/// Returns `""` for a missing document, a document without a content list,
/// or a tree the walker refuses (excessive nesting).
#[must_use]
pub fn extract_text(document: Option<&AdfDocument>) -> String {
    let Some(document) = document else {
        return String::new();
    };
    let Some(content) = document.content.as_deref() else {
        return String::new();
    };

    match collect_blocks(content, 0) {
        Ok(blocks) => blocks.join("\n\n"),
        Err(depth) => {
            error!(depth, "refusing to parse ADF tree nested beyond limit");
            String::new()
        }
    }
}

/// Walk one level of the tree, returning the text contribution of each node.
///
/// The error value is the depth at which the walker gave up.
fn collect_blocks(nodes: &[AdfNode], depth: usize) -> Result<Vec<String>, usize> {
    if depth > MAX_TREE_DEPTH {
        return Err(depth);
    }

    let mut result = Vec::new();
    for node in nodes {
        match node.node_type.as_str() {
            "paragraph" => {
                let children = node.content.as_deref().unwrap_or(&[]);
                result.push(collect_blocks(children, depth + 1)?.concat());
            }
            "text" => result.push(node.text.clone().unwrap_or_default()),
            "mention" => {
                result.push(
                    node.attrs.as_ref().and_then(|attrs| attrs.text.clone()).unwrap_or_default(),
                );
            }
            "hardBreak" => result.push("\n".to_string()),
            _ => {}
        }
    }
    Ok(result)
}
