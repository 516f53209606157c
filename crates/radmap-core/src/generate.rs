//! Tree sources.
//!
//! Producing a tree is the job of an external generation service. [`TreeSource`] is the seam it
//! plugs into; [`TemplateGenerator`] is a deterministic offline source that fills the tree from
//! fixed phrase templates, useful for demos, fixtures and tests.

use crate::tree::{MindMapDocument, TreeNode};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const MIN_DEPTH: u32 = 1;
pub const MAX_DEPTH: u32 = 5;
pub const MIN_BRANCHES: u32 = 1;
pub const MAX_BRANCHES: u32 = 8;

/// Parameters sent to a generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub topic: String,
    #[serde(default = "default_depth")]
    pub depth: u32,
    #[serde(default = "default_branches")]
    pub branches: u32,
}

fn default_depth() -> u32 {
    3
}

fn default_branches() -> u32 {
    3
}

impl GenerateRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            depth: default_depth(),
            branches: default_branches(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.topic.trim().is_empty() {
            return Err(Error::invalid_request("topic cannot be empty"));
        }
        if !(MIN_DEPTH..=MAX_DEPTH).contains(&self.depth) {
            return Err(Error::invalid_request(format!(
                "depth must be between {MIN_DEPTH} and {MAX_DEPTH}, got {}",
                self.depth
            )));
        }
        if !(MIN_BRANCHES..=MAX_BRANCHES).contains(&self.branches) {
            return Err(Error::invalid_request(format!(
                "branches must be between {MIN_BRANCHES} and {MAX_BRANCHES}, got {}",
                self.branches
            )));
        }
        Ok(())
    }
}

pub trait TreeSource {
    fn generate(&self, request: &GenerateRequest) -> Result<MindMapDocument>;
}

/// Deterministic template-based outline generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateGenerator;

const TOPIC_SUFFIXES: [&str; 5] = [
    "core concepts",
    "use cases",
    "trends",
    "key technologies",
    "strengths and challenges",
];

const SECOND_LEVEL: [&str; 5] = [
    "Key features",
    "Approaches",
    "Best practices",
    "Common pitfalls",
    "Solutions",
];

const DEEPER_LEVELS: [&str; 4] = ["Details", "Technical notes", "Case studies", "Caveats"];

impl TemplateGenerator {
    fn subtopics(parent: &str, level: u32, count: usize) -> Vec<String> {
        match level {
            0 => TOPIC_SUFFIXES
                .iter()
                .take(count)
                .map(|suffix| format!("{parent}: {suffix}"))
                .collect(),
            1 => SECOND_LEVEL
                .iter()
                .take(count)
                .map(|s| s.to_string())
                .collect(),
            _ => DEEPER_LEVELS
                .iter()
                .take(count)
                .map(|s| s.to_string())
                .collect(),
        }
    }

    fn build(text: String, level: u32, depth: u32, branches: usize) -> TreeNode {
        if level >= depth {
            return TreeNode::leaf(text);
        }
        let children = Self::subtopics(&text, level, branches)
            .into_iter()
            .map(|child| Self::build(child, level + 1, depth, branches))
            .collect();
        TreeNode::with_children(text, children)
    }
}

impl TreeSource for TemplateGenerator {
    fn generate(&self, request: &GenerateRequest) -> Result<MindMapDocument> {
        request.validate()?;
        let topic = request.topic.trim();
        let root = Self::build(
            topic.to_string(),
            0,
            request.depth,
            request.branches as usize,
        );
        let nodes = root.node_count();
        tracing::debug!(
            topic,
            depth = request.depth,
            branches = request.branches,
            nodes,
            "generated template mind map"
        );
        Ok(MindMapDocument {
            root: Some(root),
            metadata: Some(json!({
                "topic": topic,
                "depth": request.depth,
                "branches": request.branches,
                "nodes": nodes,
                "generatedBy": "template",
            })),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(topic: &str, depth: u32, branches: u32) -> GenerateRequest {
        GenerateRequest {
            topic: topic.to_string(),
            depth,
            branches,
        }
    }

    #[test]
    fn validation_bounds() {
        assert!(req("Rust", 1, 1).validate().is_ok());
        assert!(req("Rust", 5, 8).validate().is_ok());
        for bad in [
            req("  ", 3, 3),
            req("Rust", 0, 3),
            req("Rust", 6, 3),
            req("Rust", 3, 0),
            req("Rust", 3, 9),
        ] {
            assert!(matches!(bad.validate(), Err(Error::InvalidRequest { .. })));
        }
    }

    #[test]
    fn request_defaults_from_json() {
        let r: GenerateRequest = serde_json::from_str(r#"{"topic": "Rust"}"#).unwrap();
        assert_eq!(r, GenerateRequest::new("Rust"));
    }

    #[test]
    fn first_level_is_derived_from_the_topic() {
        let doc = TemplateGenerator.generate(&req(" Rust ", 1, 2)).unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.text, "Rust");
        let texts: Vec<&str> = root.children.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["Rust: core concepts", "Rust: use cases"]);
        assert!(root.children.iter().all(TreeNode::is_leaf));
    }

    #[test]
    fn depth_and_branches_shape_the_tree() {
        let doc = TemplateGenerator.generate(&req("Rust", 3, 3)).unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.depth(), 3);
        // 1 + 3 + 9 + 27
        assert_eq!(root.node_count(), 40);
        assert_eq!(doc.metadata.unwrap()["nodes"], 40);
    }

    #[test]
    fn branches_are_capped_by_available_templates() {
        let doc = TemplateGenerator.generate(&req("Rust", 3, 8)).unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.children.len(), 5);
        assert_eq!(root.children[0].children.len(), 5);
        assert_eq!(root.children[0].children[0].children.len(), 4);
        assert_eq!(root.children[0].children[0].children[0].text, "Details");
    }
}
