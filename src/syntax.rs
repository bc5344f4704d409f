//! Generic syntax tree.
//!
//! `SyntaxNode` is the loosely-typed tree a tokenizer hands to the
//! normalizer: a kind string, an open bag of properties and an optional
//! child list. Kind names and property names follow mdast, so trees
//! produced by other mdast tokenizers (as JSON) load directly:
//!
//! ```text
//! {"type": "heading", "depth": 2, "children": [{"type": "text", "value": "Hi"}]}
//! ```
//!
//! Unknown properties (e.g. `position`) are kept and ignored.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::MdResult;

/// Node of the tokenizer's open, dynamically-typed tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyntaxNode {
    /// Kind tag reported by the tokenizer (`"inlineCode"`, `"table"`, ...)
    #[serde(rename = "type")]
    pub kind: CompactString,
    /// Child list; `None` for nodes without a `children` field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<SyntaxNode>>,
    /// Every other field
    #[serde(flatten)]
    pub props: Map<String, Value>,
}

impl SyntaxNode {
    /// Create a container node with an empty child list.
    pub fn new(kind: impl Into<CompactString>) -> Self {
        Self {
            kind: kind.into(),
            children: Some(Vec::new()),
            props: Map::new(),
        }
    }

    /// Create a leaf node (no `children` field).
    pub fn leaf(kind: impl Into<CompactString>) -> Self {
        Self {
            kind: kind.into(),
            children: None,
            props: Map::new(),
        }
    }

    /// Create a leaf carrying a string `value`.
    pub fn with_value(kind: impl Into<CompactString>, value: impl Into<String>) -> Self {
        Self::leaf(kind).prop("value", value.into())
    }

    /// Set a property (builder style).
    pub fn prop(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.props.insert(name.to_string(), value.into());
        self
    }

    /// Set an optional property; `None` leaves it absent.
    pub fn opt_prop<V: Into<Value>>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.prop(name, value),
            None => self,
        }
    }

    /// Append a child, turning a leaf into a container if needed.
    pub fn child(mut self, child: SyntaxNode) -> Self {
        self.children.get_or_insert_with(Vec::new).push(child);
        self
    }

    /// Replace the child list.
    pub fn with_children(mut self, children: Vec<SyntaxNode>) -> Self {
        self.children = Some(children);
        self
    }

    #[inline]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[inline]
    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// Raw property lookup.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.props.get(name)
    }

    /// String property, if present and a string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.props.get(name).and_then(Value::as_str)
    }

    /// Load a generic tree from mdast-style JSON.
    pub fn from_json(json: &str) -> MdResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to mdast-style JSON.
    pub fn to_json(&self) -> MdResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Total number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            if let Some(children) = &node.children {
                stack.extend(children.iter());
            }
        }
        count
    }
}
