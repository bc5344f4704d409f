//! The closed AST.
//!
//! `Node` is a discriminated union over every kind the normalizer can
//! produce. Each variant carries only the fields meaningful for its kind,
//! and every dispatch over it (`kind()`, `children()`, the HTML renderer,
//! the normalizer) is an exhaustive `match`.
//!
//! # Serialized form
//!
//! ```text
//! {"type": "heading", "depth": 1, "children": [{"type": "text", "value": "Title"}]}
//! ```
//!
//! Absent optional attributes are omitted, so `listItem.checked` keeps its
//! three states: `true`, `false`, or no key at all.

mod block;
mod inline;
mod types;

pub use block::{
    AlignRow, Blockquote, CodeBlock, Heading, Html, List, ListItem, Math, Paragraph, Root, Table,
    TableCell, TableRow, Yaml,
};
pub use inline::{Code, Emphasis, Image, InlineMath, Link, Mark, Strong, Text};
pub use types::{Align, NodeKind};

use serde::{Deserialize, Serialize};

use crate::error::{MdError, MdResult};
use crate::tree::descendants;

/// A node of the closed Markdown AST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Root(Root),
    Paragraph(Paragraph),
    Heading(Heading),
    Blockquote(Blockquote),
    List(List),
    ListItem(ListItem),
    Code(Code),
    CodeBlock(CodeBlock),
    Emphasis(Emphasis),
    Strong(Strong),
    Mark(Mark),
    Link(Link),
    Image(Image),
    Text(Text),
    ThematicBreak,
    Html(Html),
    Table(Table),
    TableRow(TableRow),
    TableCell(TableCell),
    Math(Math),
    InlineMath(InlineMath),
    Yaml(Yaml),
}

impl Node {
    impl_node_dispatch! {
        containers: Root, Paragraph, Heading, Blockquote, List, ListItem, Emphasis, Strong,
            Mark, Link, Table, TableRow, TableCell;
        leaves: Code, CodeBlock, Image, Text, Html, Math, InlineMath, Yaml;
        units: ThematicBreak;
    }

    impl_node_accessors!(
        Root, Paragraph, Heading, Blockquote, List, ListItem, Code, CodeBlock, Emphasis, Strong,
        Mark, Link, Image, Text, Html, Table, TableRow, TableCell, Math, InlineMath, Yaml,
    );

    /// Check if this is a thematic break.
    #[inline]
    pub fn is_thematic_break(&self) -> bool {
        matches!(self, Self::ThematicBreak)
    }

    /// Whether this kind can hold children (even if it currently holds none).
    #[inline]
    pub fn is_container(&self) -> bool {
        self.children().is_some()
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.children().map_or(0, <[Node]>::len)
    }

    /// True when this node has no children.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check the shape guarantees of normalized trees on a tree that was
    /// built by hand or loaded from JSON.
    ///
    /// - heading depth is within 1..=6
    /// - `start` appears only on ordered lists
    /// - lists hold only items, tables only rows, rows only cells
    /// - every table row has one cell per column, aligned as its column
    pub fn validate(&self) -> MdResult<()> {
        for node in descendants(self) {
            match node {
                Self::Heading(heading) => {
                    let range = Heading::MIN_DEPTH..=Heading::MAX_DEPTH;
                    if !range.contains(&heading.depth) {
                        return Err(MdError::invalid_field(
                            "heading",
                            "depth",
                            format!("expected 1..=6, found {}", heading.depth),
                        ));
                    }
                }
                Self::List(list) => {
                    if !list.ordered && list.start.is_some() {
                        return Err(MdError::invalid_field(
                            "list",
                            "start",
                            "only ordered lists carry a start number",
                        ));
                    }
                    expect_children(node, NodeKind::ListItem)?;
                }
                Self::Table(table) => {
                    expect_children(node, NodeKind::TableRow)?;
                    for row in table.rows() {
                        check_row(row, &table.align)?;
                    }
                }
                Self::TableRow(_) => expect_children(node, NodeKind::TableCell)?,
                _ => {}
            }
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Constructors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn root(children: Vec<Node>) -> Self {
        Self::Root(Root { children })
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Self::Paragraph(Paragraph { children })
    }

    pub fn heading(depth: u8, children: Vec<Node>) -> Self {
        Self::Heading(Heading { depth, children })
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(Text::new(value))
    }

    pub fn emphasis(children: Vec<Node>) -> Self {
        Self::Emphasis(Emphasis { children })
    }

    pub fn strong(children: Vec<Node>) -> Self {
        Self::Strong(Strong { children })
    }

    pub fn mark(children: Vec<Node>) -> Self {
        Self::Mark(Mark { children })
    }

    pub fn link(url: impl Into<String>, children: Vec<Node>) -> Self {
        Self::Link(Link {
            url: url.into(),
            title: None,
            children,
        })
    }

    pub fn image(url: impl Into<String>, alt: Option<&str>) -> Self {
        Self::Image(Image {
            url: url.into(),
            alt: alt.map(str::to_string),
            title: None,
        })
    }

    pub fn inline_code(value: impl Into<String>) -> Self {
        Self::Code(Code { value: value.into() })
    }

    pub fn list_item(checked: Option<bool>, children: Vec<Node>) -> Self {
        Self::ListItem(ListItem { checked, children })
    }
}

fn expect_children(parent: &Node, expected: NodeKind) -> MdResult<()> {
    let children = parent.children().unwrap_or_default();
    match children.iter().find(|child| child.kind() != expected) {
        Some(child) => Err(MdError::invalid_field(
            parent.kind().to_string(),
            "children",
            format!("expected `{expected}`, found `{}`", child.kind()),
        )),
        None => Ok(()),
    }
}

fn check_row(row: &TableRow, align: &[Align]) -> MdResult<()> {
    if row.children.len() != align.len() {
        return Err(MdError::invalid_field(
            "tableRow",
            "children",
            format!("expected {} cells, found {}", align.len(), row.children.len()),
        ));
    }
    for (cell, column) in row.children.iter().zip(align) {
        if let Node::TableCell(cell) = cell {
            if cell.align != column.explicit() {
                return Err(MdError::invalid_field(
                    "tableCell",
                    "align",
                    format!("cell alignment differs from its column ({column})"),
                ));
            }
        }
    }
    Ok(())
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Self::Text(text)
    }
}
