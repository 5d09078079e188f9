//! Atlassian Document Format (ADF) tree types
//!
//! Jira returns issue descriptions as a nested rich-text document rather
//! than a flat string. Only the node types the pipeline extracts text from
//! are modeled with dedicated fields; everything else deserializes into the
//! same shape and is ignored by the extractor.

use serde::{Deserialize, Serialize};

/// Top-level ADF document: a version marker plus a list of block nodes.
///
/// A document without a `content` list extracts to the empty string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdfDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<AdfNode>>,
}

/// A single node in the document tree.
///
/// `node_type` distinguishes `paragraph`, `text`, `mention` and `hardBreak`;
/// unknown types carry the same fields and contribute nothing to extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdfNode {
    #[serde(rename = "type", default)]
    pub node_type: String,

    /// Literal text carried by `text` leaves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Child nodes of container types such as `paragraph`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<AdfNode>>,

    /// Node attributes; `mention` nodes carry their display name here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<AdfAttrs>,
}

/// Attributes attached to a node. Only the mention display text is read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdfAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl AdfNode {
    /// Build a `text` leaf node.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self { node_type: "text".to_string(), text: Some(value.into()), ..Self::default() }
    }

    /// Build a `paragraph` node from child nodes.
    #[must_use]
    pub fn paragraph(children: Vec<AdfNode>) -> Self {
        Self { node_type: "paragraph".to_string(), content: Some(children), ..Self::default() }
    }

    /// Build a `mention` node with a display name.
    #[must_use]
    pub fn mention(display: impl Into<String>) -> Self {
        Self {
            node_type: "mention".to_string(),
            attrs: Some(AdfAttrs { text: Some(display.into()) }),
            ..Self::default()
        }
    }

    /// Build a `hardBreak` leaf node.
    #[must_use]
    pub fn hard_break() -> Self {
        Self { node_type: "hardBreak".to_string(), ..Self::default() }
    }
}

impl AdfDocument {
    /// Build a document from block nodes.
    #[must_use]
    pub fn from_content(content: Vec<AdfNode>) -> Self {
        Self { version: Some(1), doc_type: Some("doc".to_string()), content: Some(content) }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for types::adf.
    use super::*;

    #[test]
    fn deserializes_nested_document() {
        let json = r#"{
            "version": 1,
            "type": "doc",
            "content": [
                {
                    "type": "paragraph",
                    "content": [
                        {"type": "text", "text": "hello "},
                        {"type": "mention", "attrs": {"id": "123", "text": "@alice"}},
                        {"type": "hardBreak"}
                    ]
                }
            ]
        }"#;

        let doc: AdfDocument = serde_json::from_str(json).unwrap();
        let content = doc.content.unwrap();
        assert_eq!(content.len(), 1);

        let children = content[0].content.as_ref().unwrap();
        assert_eq!(children[0].text.as_deref(), Some("hello "));
        assert_eq!(children[1].attrs.as_ref().unwrap().text.as_deref(), Some("@alice"));
        assert_eq!(children[2].node_type, "hardBreak");
    }

    #[test]
    fn unknown_node_types_deserialize() {
        let json = r#"{"type": "codeBlock", "attrs": {"language": "rust"}}"#;
        let node: AdfNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.node_type, "codeBlock");
        assert!(node.text.is_none());
    }

    #[test]
    fn empty_document_has_no_content() {
        let doc: AdfDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.content.is_none());
    }
}
