//! Derived views over a parsed document.
//!
//! Every record is flat, owns its data and serializes with serde, so it can
//! outlive the tree it came from (tables of contents, link checkers, image
//! galleries, search indexing).

use serde::{Deserialize, Serialize};

use crate::id::HeadingIds;
use crate::node::Node;
use crate::tree::{descendants, extract_text_content};

/// One heading, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingRecord {
    pub level: u8,
    pub text: String,
    /// Same anchor id the HTML renderer emits for this heading
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Full text content of the link
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// All headings below `node`.
pub fn extract_headings(node: &Node) -> Vec<HeadingRecord> {
    let mut ids = HeadingIds::new();
    descendants(node)
        .filter_map(|n| {
            let heading = n.as_heading()?;
            let text = extract_text_content(n);
            let id = ids.next_id(&text);
            Some(HeadingRecord {
                level: heading.depth,
                text,
                id,
            })
        })
        .collect()
}

/// All links below `node`.
pub fn extract_links(node: &Node) -> Vec<LinkRecord> {
    descendants(node)
        .filter_map(|n| {
            let link = n.as_link()?;
            Some(LinkRecord {
                url: link.url.clone(),
                title: link.title.clone(),
                text: extract_text_content(n),
            })
        })
        .collect()
}

/// All images below `node`.
pub fn extract_images(node: &Node) -> Vec<ImageRecord> {
    descendants(node)
        .filter_map(Node::as_image)
        .map(|image| ImageRecord {
            url: image.url.clone(),
            alt: image.alt.clone(),
            title: image.title.clone(),
        })
        .collect()
}

/// Raw front-matter: the first top-level `yaml` node, unparsed.
pub fn extract_front_matter(node: &Node) -> Option<&str> {
    if let Node::Yaml(yaml) = node {
        return Some(&yaml.value);
    }
    node.children()?
        .iter()
        .find_map(Node::as_yaml)
        .map(|yaml| yaml.value.as_str())
}

// =============================================================================
// TreeStats - document statistics
// =============================================================================

/// Node counts collected from one traversal
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    pub heading_count: usize,
    pub link_count: usize,
    pub image_count: usize,
    pub code_block_count: usize,
    pub math_count: usize,
    pub text_count: usize,
    pub node_count: usize,
}

impl TreeStats {
    pub fn collect(node: &Node) -> Self {
        let mut stats = Self::default();
        for n in descendants(node) {
            stats.node_count += 1;
            match n {
                Node::Heading(_) => stats.heading_count += 1,
                Node::Link(_) => stats.link_count += 1,
                Node::Image(_) => stats.image_count += 1,
                Node::CodeBlock(_) => stats.code_block_count += 1,
                Node::Math(_) | Node::InlineMath(_) => stats.math_count += 1,
                Node::Text(_) => stats.text_count += 1,
                _ => {}
            }
        }
        stats
    }

    /// Check if document has any headings
    pub fn has_headings(&self) -> bool {
        self.heading_count > 0
    }

    /// Check if document has any math
    pub fn has_math(&self) -> bool {
        self.math_count > 0
    }
}

// =============================================================================
// SourceStats - raw text statistics
// =============================================================================

/// Counts over the Markdown source text itself.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStats {
    /// Whitespace-separated words
    pub words: usize,
    /// Unicode scalar values
    pub chars: usize,
    /// `\n`-separated lines; an empty source is one line
    pub lines: usize,
}

impl SourceStats {
    pub fn of(markdown: &str) -> Self {
        Self {
            words: markdown.split_whitespace().count(),
            chars: markdown.chars().count(),
            lines: markdown.split('\n').count(),
        }
    }
}
