//! Block-level node data
//!
//! Nodes that occupy a full line-level region, plus the parts that only live
//! inside block containers (list items, table rows and cells).

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{Align, Node};

/// Per-column alignment of a table, in column order.
pub type AlignRow = SmallVec<[Align; 8]>;

/// Document root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Root {
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    #[serde(default)]
    pub children: Vec<Node>,
}

/// Section heading, `depth` always in `1..=6`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub depth: u8,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Heading {
    pub const MIN_DEPTH: u8 = 1;
    pub const MAX_DEPTH: u8 = 6;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Blockquote {
    #[serde(default)]
    pub children: Vec<Node>,
}

/// Ordered or bullet list.
///
/// `start` is only ever set on ordered lists; `None` means numbering begins
/// at 1. `spread` marks a loose list: items are separated by blank lines or
/// some item has blank lines between its children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct List {
    #[serde(default)]
    pub ordered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub spread: bool,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl List {
    /// First item number (1 when unspecified or unordered).
    pub fn first_number(&self) -> u32 {
        self.start.unwrap_or(1)
    }
}

/// List item with a tri-state task marker.
///
/// - `Some(false)` – open task (`- [ ]`)
/// - `Some(true)` – completed task (`- [x]`)
/// - `None` – plain item, not a task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl ListItem {
    pub fn is_task(&self) -> bool {
        self.checked.is_some()
    }
}

/// Fenced or indented code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
}

/// Raw HTML, block or inline. Serialized verbatim only when allowed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Html {
    pub value: String,
}

/// GFM table. `align.len()` equals the cell count of every row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub align: AlignRow,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Table {
    pub fn column_count(&self) -> usize {
        self.align.len()
    }

    /// Iterate rows (children that are `tableRow` nodes).
    pub fn rows(&self) -> impl Iterator<Item = &TableRow> {
        self.children.iter().filter_map(Node::as_table_row)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub children: Vec<Node>,
}

/// Table cell; `align` is inherited from its column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
    #[serde(default)]
    pub children: Vec<Node>,
}

/// Display math (`$$ … $$`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Math {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
}

/// YAML front-matter, carried unparsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Yaml {
    pub value: String,
}
