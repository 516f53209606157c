use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One labeled node of a mind map.
///
/// Child order is significant: it decides the angular placement around the parent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(default)]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub children: Vec<TreeNode>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<TreeNode>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<TreeNode>>::deserialize(deserializer)?.unwrap_or_default())
}

impl TreeNode {
    pub fn leaf(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(text: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            text: text.into(),
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        let mut count = 0usize;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Depth of the deepest descendant (0 for a leaf).
    pub fn depth(&self) -> usize {
        let mut max_depth = 0usize;
        let mut stack = vec![(self, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            stack.extend(node.children.iter().map(|c| (c, depth + 1)));
        }
        max_depth
    }
}

/// The value returned by a generation service: `{ "root": { "text": ..., "children": [...] } }`.
///
/// `root` stays optional so a service response without a tree decodes cleanly and is rejected
/// at layout time with [`Error::InvalidInput`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MindMapDocument {
    #[serde(default)]
    pub root: Option<TreeNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl MindMapDocument {
    pub fn new(root: TreeNode) -> Self {
        Self {
            root: Some(root),
            metadata: None,
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let doc: Self = serde_json::from_str(text)?;
        tracing::debug!(
            has_root = doc.root.is_some(),
            nodes = doc.root.as_ref().map_or(0, TreeNode::node_count),
            "decoded mind map document"
        );
        Ok(doc)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn root(&self) -> Result<&TreeNode> {
        self.root
            .as_ref()
            .ok_or_else(|| Error::invalid_input("mind map document has no root node"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_service_shape_and_ignores_unknown_fields() {
        let doc = MindMapDocument::from_json_str(
            r#"{
                "root": {
                    "id": "root",
                    "text": "Rust",
                    "level": 0,
                    "children": [
                        {"id": "root_0", "text": "Ownership", "children": []},
                        {"id": "root_1", "text": "Traits"}
                    ]
                },
                "metadata": {"topic": "Rust"}
            }"#,
        )
        .unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.text, "Rust");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[1].text, "Traits");
        assert!(root.children[1].is_leaf());
        assert_eq!(doc.metadata.unwrap()["topic"], "Rust");
    }

    #[test]
    fn null_children_and_missing_text_decode_as_empty() {
        let doc = MindMapDocument::from_json_str(r#"{"root": {"children": null}}"#).unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.text, "");
        assert!(root.is_leaf());
    }

    #[test]
    fn missing_or_null_root_is_invalid_input() {
        for text in [r#"{}"#, r#"{"root": null}"#] {
            let doc = MindMapDocument::from_json_str(text).unwrap();
            assert!(matches!(doc.root(), Err(Error::InvalidInput { .. })));
        }
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = MindMapDocument::from_json_str(r#"{"root": {"text": 3}}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn counts_nodes_and_depth() {
        let tree = TreeNode::with_children(
            "a",
            vec![
                TreeNode::with_children("b", vec![TreeNode::leaf("d")]),
                TreeNode::leaf("c"),
            ],
        );
        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.depth(), 2);
        assert_eq!(TreeNode::leaf("x").depth(), 0);
    }
}
