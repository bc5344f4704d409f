//! Generic tree → closed AST.
//!
//! The normalizer is the only place where the open vocabulary of a
//! tokenizer meets the closed [`Node`] schema. Dispatch is on the mdast kind
//! string; every field is read, type-checked and defaulted here so the
//! typed tree never has to.
//!
//! # Policies
//!
//! | Input | `Strict` | `Lenient` |
//! |-------|----------|-----------|
//! | unknown container | `UnsupportedNodeKind` | children spliced into parent |
//! | unknown leaf with string `value` | `UnsupportedNodeKind` | `text(value)` |
//! | other unknown leaf | `UnsupportedNodeKind` | dropped |
//! | heading depth outside 1..=6 | `InvalidField` | clamped |
//! | wrong child under list/table/row | `InvalidField` | wrapped |
//!
//! Missing or ill-typed required fields fail under both policies. A generic
//! `break` has no schema kind and always becomes a `"\n"` text node.
//!
//! The walk keeps its own stack, so the depth limit is the only bound on
//! nesting.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{MdError, MdResult};
use crate::options::DEFAULT_MAX_DEPTH;
use crate::node::{
    Align, AlignRow, Blockquote, Code, CodeBlock, Emphasis, Heading, Html, Image, InlineMath, Link,
    List, ListItem, Mark, Math, Node, NodeKind, Paragraph, Root, Strong, Table, TableCell,
    TableRow, Yaml,
};
use crate::syntax::SyntaxNode;

use super::Transform;

// =============================================================================
// Configuration
// =============================================================================

/// How the normalizer treats input outside the closed schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Fail on the first unsupported or malformed node.
    #[default]
    Strict,
    /// Substitute, clamp or wrap, logging each substitution.
    Lenient,
}

impl Policy {
    pub const fn is_strict(self) -> bool {
        matches!(self, Self::Strict)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Lenient => "lenient",
        }
    }
}

/// Maps a [`SyntaxNode`] tree onto the closed [`Node`] schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    policy: Policy,
    max_depth: usize,
    pedantic: bool,
}

impl Normalizer {
    pub const DEFAULT_MAX_DEPTH: usize = DEFAULT_MAX_DEPTH;

    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            max_depth: Self::DEFAULT_MAX_DEPTH,
            pedantic: false,
        }
    }

    pub fn strict() -> Self {
        Self::new(Policy::Strict)
    }

    pub fn lenient() -> Self {
        Self::new(Policy::Lenient)
    }

    /// Maximum nesting depth; the root counts as level 1.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Drop `start` from ordered lists.
    pub fn with_pedantic(mut self, pedantic: bool) -> Self {
        self.pedantic = pedantic;
        self
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    #[inline]
    pub fn policy(&self) -> Policy {
        self.policy
    }

    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    #[inline]
    pub fn pedantic(&self) -> bool {
        self.pedantic
    }

    pub fn validate(&self) -> MdResult<()> {
        if self.max_depth == 0 {
            return Err(MdError::invalid_config("maxDepth", "must be at least 1"));
        }
        Ok(())
    }

    /// Normalize a tree (or subtree).
    ///
    /// If the top node itself is substituted away under the lenient policy,
    /// whatever it produced is wrapped in a `root`.
    pub fn normalize(&self, tree: SyntaxNode) -> MdResult<Node> {
        self.validate()?;
        let node = match self.lower(tree)? {
            Lowered::One(node) => node,
            Lowered::Spliced(children) => Node::root(children),
            Lowered::Dropped => Node::root(Vec::new()),
        };
        debug!(kind = %node.kind(), policy = self.policy.as_str(), "normalized tree");
        Ok(node)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::strict()
    }
}

impl Transform<SyntaxNode> for Normalizer {
    type Output = Node;

    fn transform(&self, input: SyntaxNode) -> MdResult<Node> {
        self.normalize(input)
    }
}

// =============================================================================
// Lowering
// =============================================================================

/// What one generic node turned into.
enum Lowered {
    One(Node),
    Spliced(Vec<Node>),
    Dropped,
}

/// A generic container whose children are still being lowered.
struct Frame {
    kind: CompactString,
    props: Map<String, Value>,
    pending: std::vec::IntoIter<SyntaxNode>,
    done: Vec<Node>,
}

impl Frame {
    fn attach(&mut self, lowered: Lowered) {
        match lowered {
            Lowered::One(node) => self.done.push(node),
            Lowered::Spliced(nodes) => self.done.extend(nodes),
            Lowered::Dropped => {}
        }
    }
}

impl Normalizer {
    /// Post-order walk with an explicit stack, so nesting depth costs heap
    /// rather than call stack.
    fn lower(&self, tree: SyntaxNode) -> MdResult<Lowered> {
        let mut stack: Vec<Frame> = Vec::new();
        let mut current = tree;
        loop {
            self.enter(&current, stack.len() + 1)?;

            let SyntaxNode {
                kind,
                children,
                props,
            } = current;
            let mut lowered = match children {
                Some(children) => {
                    stack.push(Frame {
                        kind,
                        props,
                        done: Vec::with_capacity(children.len()),
                        pending: children.into_iter(),
                    });
                    None
                }
                None => Some(self.build(&kind, props, None)?),
            };

            // Climb until some frame still has a child to descend into.
            loop {
                let Some(frame) = stack.last_mut() else {
                    return Ok(lowered.unwrap_or(Lowered::Dropped));
                };
                if let Some(result) = lowered.take() {
                    frame.attach(result);
                }
                if let Some(child) = frame.pending.next() {
                    current = child;
                    break;
                }
                let Some(frame) = stack.pop() else {
                    return Ok(Lowered::Dropped);
                };
                lowered = Some(self.build(&frame.kind, frame.props, Some(frame.done))?);
            }
        }
    }

    /// Checks made before any child of `node` is visited.
    fn enter(&self, node: &SyntaxNode, depth: usize) -> MdResult<()> {
        if depth > self.max_depth {
            return Err(MdError::TooDeep {
                limit: self.max_depth,
            });
        }
        if self.policy.is_strict() && !is_schema_kind(node.kind()) {
            return Err(MdError::unsupported(node.kind()));
        }
        Ok(())
    }

    /// Build one node from its properties and already-lowered children.
    /// `children` is `None` for generic leaves.
    fn build(
        &self,
        kind: &str,
        props: Map<String, Value>,
        children: Option<Vec<Node>>,
    ) -> MdResult<Lowered> {
        let mut props = Props::new(kind, props);
        if !is_schema_kind(kind) {
            return self.substitute(kind, children, props);
        }

        let node = match kind {
            "root" => Node::Root(Root {
                children: children.unwrap_or_default(),
            }),
            "paragraph" => Node::Paragraph(Paragraph {
                children: children.unwrap_or_default(),
            }),
            "heading" => Node::Heading(Heading {
                depth: self.heading_depth(&mut props)?,
                children: children.unwrap_or_default(),
            }),
            "blockquote" => Node::Blockquote(Blockquote {
                children: children.unwrap_or_default(),
            }),
            "list" => {
                let ordered = props.take_bool("ordered")?.unwrap_or(false);
                let start = props.take_u32("start")?;
                let start = match (ordered, self.pedantic) {
                    (true, false) => start,
                    _ => None,
                };
                Node::List(List {
                    ordered,
                    start,
                    spread: props.take_bool("spread")?.unwrap_or(false),
                    children: self.structured(kind, children, NodeKind::ListItem)?,
                })
            }
            "listItem" => Node::ListItem(ListItem {
                checked: props.take_bool("checked")?,
                children: children.unwrap_or_default(),
            }),
            "inlineCode" => Node::Code(Code {
                value: props.require_str("value")?,
            }),
            "code" => Node::CodeBlock(CodeBlock {
                value: props.require_str("value")?,
                lang: props.take_str("lang")?,
                meta: props.take_str("meta")?,
            }),
            "emphasis" => Node::Emphasis(Emphasis {
                children: children.unwrap_or_default(),
            }),
            "strong" => Node::Strong(Strong {
                children: children.unwrap_or_default(),
            }),
            "mark" => Node::Mark(Mark {
                children: children.unwrap_or_default(),
            }),
            "link" => Node::Link(Link {
                url: props.require_str("url")?,
                title: props.take_str("title")?,
                children: children.unwrap_or_default(),
            }),
            "image" => Node::Image(Image {
                url: props.require_str("url")?,
                alt: props.take_str("alt")?,
                title: props.take_str("title")?,
            }),
            "text" => Node::text(props.require_str("value")?),
            "break" => Node::text("\n"),
            "thematicBreak" => Node::ThematicBreak,
            "html" => Node::Html(Html {
                value: props.require_str("value")?,
            }),
            "table" => self.table(kind, &mut props, children)?,
            "tableRow" => Node::TableRow(TableRow {
                children: self.structured(kind, children, NodeKind::TableCell)?,
            }),
            "tableCell" => Node::TableCell(TableCell {
                align: props.take_align("align")?.and_then(Align::explicit),
                children: children.unwrap_or_default(),
            }),
            "math" => Node::Math(Math {
                value: props.require_str("value")?,
                meta: props.take_str("meta")?,
            }),
            "inlineMath" => Node::InlineMath(InlineMath {
                value: props.require_str("value")?,
            }),
            "yaml" => Node::Yaml(Yaml {
                value: props.require_str("value")?,
            }),
            other => return Err(MdError::unsupported(other)),
        };
        Ok(Lowered::One(node))
    }

    /// Children of a container that admits exactly one child kind.
    fn structured(
        &self,
        parent: &str,
        children: Option<Vec<Node>>,
        expected: NodeKind,
    ) -> MdResult<Vec<Node>> {
        children
            .unwrap_or_default()
            .into_iter()
            .map(|child| {
                if child.kind() == expected {
                    return Ok(child);
                }
                match self.policy {
                    Policy::Strict => Err(MdError::invalid_field(
                        parent,
                        "children",
                        format!("expected `{expected}`, found `{}`", child.kind()),
                    )),
                    Policy::Lenient => {
                        warn!(parent, found = %child.kind(), %expected, "wrapping misplaced child");
                        Ok(wrap(expected, child))
                    }
                }
            })
            .collect()
    }

    fn heading_depth(&self, props: &mut Props<'_>) -> MdResult<u8> {
        let raw = props.require_int("depth")?;
        let range = i64::from(Heading::MIN_DEPTH)..=i64::from(Heading::MAX_DEPTH);
        if range.contains(&raw) {
            return Ok(raw as u8);
        }
        match self.policy {
            Policy::Strict => Err(MdError::invalid_field(
                "heading",
                "depth",
                format!("expected 1..=6, found {raw}"),
            )),
            Policy::Lenient => {
                let clamped = raw.clamp(*range.start(), *range.end()) as u8;
                warn!(depth = raw, clamped, "clamping heading depth");
                Ok(clamped)
            }
        }
    }

    /// Build a table whose rows all have exactly one cell per column.
    fn table(
        &self,
        kind: &str,
        props: &mut Props<'_>,
        children: Option<Vec<Node>>,
    ) -> MdResult<Node> {
        let mut align = props.take_align_row("align")?;
        let mut rows = self.structured(kind, children, NodeKind::TableRow)?;

        if align.is_empty() {
            let columns = rows.iter().map(Node::len).max().unwrap_or(0);
            align.resize(columns, Align::None);
        }
        let columns = align.len();

        for row in &mut rows {
            let Some(cells) = row.children_mut() else {
                continue;
            };
            if cells.len() != columns {
                debug!(found = cells.len(), columns, "reshaping table row");
            }
            cells.truncate(columns);
            cells.resize_with(columns, || Node::TableCell(TableCell::default()));
            for (cell, column) in cells.iter_mut().zip(&align) {
                if let Node::TableCell(cell) = cell {
                    cell.align = column.explicit();
                }
            }
        }

        Ok(Node::Table(Table {
            align,
            children: rows,
        }))
    }

    fn substitute(
        &self,
        kind: &str,
        children: Option<Vec<Node>>,
        props: Props<'_>,
    ) -> MdResult<Lowered> {
        if self.policy.is_strict() {
            return Err(MdError::unsupported(kind));
        }
        if let Some(children) = children {
            warn!(kind, "splicing children of unsupported node");
            return Ok(Lowered::Spliced(children));
        }
        match props.into_value() {
            Some(value) => {
                warn!(kind, "replacing unsupported leaf with text");
                Ok(Lowered::One(Node::text(value)))
            }
            None => {
                warn!(kind, "dropping unsupported leaf");
                Ok(Lowered::Dropped)
            }
        }
    }
}

/// Generic kinds with a counterpart in the closed schema.
fn is_schema_kind(kind: &str) -> bool {
    matches!(
        kind,
        "root"
            | "paragraph"
            | "heading"
            | "blockquote"
            | "list"
            | "listItem"
            | "inlineCode"
            | "code"
            | "emphasis"
            | "strong"
            | "mark"
            | "link"
            | "image"
            | "text"
            | "break"
            | "thematicBreak"
            | "html"
            | "table"
            | "tableRow"
            | "tableCell"
            | "math"
            | "inlineMath"
            | "yaml"
    )
}

/// Put `node` inside the container kind its parent requires.
fn wrap(expected: NodeKind, node: Node) -> Node {
    match expected {
        NodeKind::ListItem => Node::ListItem(ListItem {
            checked: None,
            children: vec![node],
        }),
        NodeKind::TableCell => Node::TableCell(TableCell {
            align: None,
            children: vec![node],
        }),
        NodeKind::TableRow => {
            let cell = match node {
                cell @ Node::TableCell(_) => cell,
                other => wrap(NodeKind::TableCell, other),
            };
            Node::TableRow(TableRow {
                children: vec![cell],
            })
        }
        _ => node,
    }
}

// =============================================================================
// Field access
// =============================================================================

/// Owned property bag of one generic node, with typed accessors.
///
/// JSON `null` counts as absent everywhere.
struct Props<'a> {
    kind: &'a str,
    map: Map<String, Value>,
}

impl<'a> Props<'a> {
    fn new(kind: &'a str, map: Map<String, Value>) -> Self {
        Self { kind, map }
    }

    fn take(&mut self, field: &str) -> Option<Value> {
        self.map.remove(field).filter(|value| !value.is_null())
    }

    fn mismatch(&self, field: &'static str, expected: &str, found: &Value) -> MdError {
        MdError::invalid_field(
            self.kind,
            field,
            format!("expected {expected}, found {}", json_type(found)),
        )
    }

    fn take_str(&mut self, field: &'static str) -> MdResult<Option<String>> {
        match self.take(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(self.mismatch(field, "string", &other)),
        }
    }

    fn require_str(&mut self, field: &'static str) -> MdResult<String> {
        self.take_str(field)?
            .ok_or_else(|| MdError::invalid_field(self.kind, field, "missing"))
    }

    fn take_bool(&mut self, field: &'static str) -> MdResult<Option<bool>> {
        match self.take(field) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(b)),
            Some(other) => Err(self.mismatch(field, "boolean", &other)),
        }
    }

    fn require_int(&mut self, field: &'static str) -> MdResult<i64> {
        match self.take(field) {
            None => Err(MdError::invalid_field(self.kind, field, "missing")),
            Some(value) => value
                .as_i64()
                .ok_or_else(|| self.mismatch(field, "integer", &value)),
        }
    }

    fn take_u32(&mut self, field: &'static str) -> MdResult<Option<u32>> {
        match self.take(field) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| self.mismatch(field, "unsigned 32-bit integer", &value)),
        }
    }

    fn take_align(&mut self, field: &'static str) -> MdResult<Option<Align>> {
        match self.take(field) {
            None => Ok(None),
            Some(Value::String(token)) => token.parse().map(Some),
            Some(other) => Err(self.mismatch(field, "alignment token", &other)),
        }
    }

    fn take_align_row(&mut self, field: &'static str) -> MdResult<AlignRow> {
        match self.take(field) {
            None => Ok(AlignRow::new()),
            Some(Value::Array(tokens)) => tokens
                .into_iter()
                .map(|token| match token {
                    Value::Null => Ok(Align::None),
                    Value::String(token) => token.parse(),
                    other => Err(self.mismatch(field, "alignment token", &other)),
                })
                .collect(),
            Some(other) => Err(self.mismatch(field, "array", &other)),
        }
    }

    /// The string `value` of an unsupported leaf, if it has one.
    fn into_value(mut self) -> Option<String> {
        match self.take("value") {
            Some(Value::String(s)) => Some(s),
            _ => None,
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
