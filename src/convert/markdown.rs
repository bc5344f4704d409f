//! Markdown text to generic syntax tree.
//!
//! Wraps `markdown::to_mdast` and lowers its typed mdast into [`SyntaxNode`]s
//! that carry mdast kind and field names. The adapter does not decide what
//! the closed schema admits: footnotes, strikethrough, TOML front-matter and
//! MDX nodes are passed through under their mdast names and left to the
//! normalizer's policy.
//!
//! Reference-style links and images are resolved here against their
//! definitions, so the generic tree only ever contains inline `link` and
//! `image` nodes for them. Definitions themselves are dropped.
//!
//! Lowering walks the mdast with an explicit stack and stops with
//! [`MdError::TooDeep`] as soon as nesting passes the limit, so arbitrarily
//! deep input never recurses.

use markdown::mdast;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::debug;

use crate::error::{MdError, MdResult};
use crate::options::{DEFAULT_MAX_DEPTH, ParseOptions};
use crate::syntax::SyntaxNode;

use super::markers;

/// Tokenize Markdown into the generic tree, nesting at most
/// [`DEFAULT_MAX_DEPTH`] levels.
pub fn tokenize(markdown: &str, options: &ParseOptions) -> MdResult<SyntaxNode> {
    tokenize_with_limit(markdown, options, DEFAULT_MAX_DEPTH)
}

/// Tokenize Markdown into the generic tree, nesting at most `max_depth`
/// levels (the root is level 1).
pub fn tokenize_with_limit(
    markdown: &str,
    options: &ParseOptions,
    max_depth: usize,
) -> MdResult<SyntaxNode> {
    let ast = markdown::to_mdast(markdown, &options.to_mdast())
        .map_err(|e| MdError::Tokenize(format!("{e}")))?;

    let lowering = Lowering {
        definitions: collect_definitions(&ast),
        max_depth,
    };
    let mut root = lowering
        .lower(ast)?
        .unwrap_or_else(|| SyntaxNode::new("root"));

    if options.mark {
        markers::split_marks(&mut root);
    }

    debug!(
        bytes = markdown.len(),
        nodes = root.node_count(),
        "tokenized markdown"
    );
    Ok(root)
}

// =============================================================================
// Lowering
// =============================================================================

/// Link target of a `[label]: url "title"` definition.
#[derive(Debug, Clone)]
struct Target {
    url: String,
    title: Option<String>,
}

/// Gather link definitions in document order; the first definition of an
/// identifier wins.
fn collect_definitions(root: &mdast::Node) -> FxHashMap<String, Target> {
    let mut definitions = FxHashMap::default();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if let mdast::Node::Definition(def) = node {
            definitions
                .entry(def.identifier.clone())
                .or_insert_with(|| Target {
                    url: def.url.clone(),
                    title: def.title.clone(),
                });
        }
        if let Some(children) = node.children() {
            stack.extend(children.iter().rev());
        }
    }
    definitions
}

/// A container whose mdast children are still being lowered.
struct Frame {
    node: SyntaxNode,
    pending: std::vec::IntoIter<mdast::Node>,
    done: Vec<SyntaxNode>,
}

impl Frame {
    fn new(node: SyntaxNode, children: Vec<mdast::Node>) -> Self {
        Self {
            node,
            done: Vec::with_capacity(children.len()),
            pending: children.into_iter(),
        }
    }

    fn finish(self) -> SyntaxNode {
        self.node.with_children(self.done)
    }
}

struct Lowering {
    definitions: FxHashMap<String, Target>,
    max_depth: usize,
}

impl Lowering {
    /// Lower a whole tree; `None` when the top node vanishes.
    fn lower(&self, root: mdast::Node) -> MdResult<Option<SyntaxNode>> {
        let Some((head, children)) = self.shell(root) else {
            return Ok(None);
        };
        let Some(children) = children else {
            return Ok(Some(head));
        };

        let mut stack = vec![Frame::new(head, children)];
        loop {
            // The top frame sits at depth `stack.len()`; its children one below.
            let depth = stack.len();
            let Some(frame) = stack.last_mut() else {
                break;
            };
            if let Some(child) = frame.pending.next() {
                if depth >= self.max_depth {
                    let mut rest = vec![child];
                    rest.extend(stack.drain(..).flat_map(|frame| frame.pending));
                    dismantle(rest);
                    return Err(MdError::TooDeep {
                        limit: self.max_depth,
                    });
                }
                let Some((head, children)) = self.shell(child) else {
                    continue;
                };
                match children {
                    Some(children) => stack.push(Frame::new(head, children)),
                    None => frame.done.push(head),
                }
                continue;
            }

            let Some(frame) = stack.pop() else {
                break;
            };
            let node = frame.finish();
            match stack.last_mut() {
                Some(parent) => parent.done.push(node),
                None => return Ok(Some(node)),
            }
        }
        Ok(None)
    }

    /// One node without its children, plus the mdast children still to
    /// lower (`None` for leaves). `None` overall for nodes that vanish
    /// (definitions).
    fn shell(&self, node: mdast::Node) -> Option<(SyntaxNode, Option<Vec<mdast::Node>>)> {
        let shell = match node {
            mdast::Node::Root(node) => container("root", node.children),
            mdast::Node::Blockquote(node) => container("blockquote", node.children),
            mdast::Node::List(node) => {
                // Loose when items are separated by blank lines or any item
                // holds blank-line separated blocks.
                let spread = node.spread
                    || node.children.iter().any(|item| match item {
                        mdast::Node::ListItem(item) => item.spread,
                        _ => false,
                    });
                let (list, children) = container("list", node.children);
                (
                    list.prop("ordered", node.ordered)
                        .opt_prop("start", node.start)
                        .prop("spread", spread),
                    children,
                )
            }
            mdast::Node::ListItem(node) => {
                let (item, children) = container("listItem", node.children);
                (
                    item.opt_prop("checked", node.checked)
                        .prop("spread", node.spread),
                    children,
                )
            }
            mdast::Node::Break(_) => leaf(SyntaxNode::leaf("break")),
            mdast::Node::InlineCode(node) => {
                leaf(SyntaxNode::with_value("inlineCode", node.value))
            }
            mdast::Node::InlineMath(node) => {
                leaf(SyntaxNode::with_value("inlineMath", node.value))
            }
            mdast::Node::Delete(node) => container("delete", node.children),
            mdast::Node::Emphasis(node) => container("emphasis", node.children),
            mdast::Node::Strong(node) => container("strong", node.children),
            mdast::Node::Image(node) => leaf(image(node.url, node.alt, node.title)),
            mdast::Node::ImageReference(node) => leaf(match self.definitions.get(&node.identifier) {
                Some(target) => image(target.url.clone(), node.alt, target.title.clone()),
                None => SyntaxNode::with_value("imageReference", node.alt)
                    .prop("identifier", node.identifier),
            }),
            mdast::Node::Link(node) => {
                let (link, children) = container("link", node.children);
                (
                    link.prop("url", node.url).opt_prop("title", node.title),
                    children,
                )
            }
            mdast::Node::LinkReference(node) => match self.definitions.get(&node.identifier) {
                Some(target) => {
                    let (link, children) = container("link", node.children);
                    (
                        link.prop("url", target.url.clone())
                            .opt_prop("title", target.title.clone()),
                        children,
                    )
                }
                None => {
                    let (reference, children) = container("linkReference", node.children);
                    (reference.prop("identifier", node.identifier), children)
                }
            },
            mdast::Node::FootnoteReference(node) => leaf(
                SyntaxNode::leaf("footnoteReference").prop("identifier", node.identifier),
            ),
            mdast::Node::FootnoteDefinition(node) => {
                let (definition, children) = container("footnoteDefinition", node.children);
                (definition.prop("identifier", node.identifier), children)
            }
            mdast::Node::Text(node) => leaf(SyntaxNode::with_value("text", node.value)),
            mdast::Node::Code(node) => leaf(
                SyntaxNode::with_value("code", node.value)
                    .opt_prop("lang", node.lang)
                    .opt_prop("meta", node.meta),
            ),
            mdast::Node::Math(node) => {
                leaf(SyntaxNode::with_value("math", node.value).opt_prop("meta", node.meta))
            }
            mdast::Node::Heading(node) => {
                let (heading, children) = container("heading", node.children);
                (heading.prop("depth", node.depth), children)
            }
            mdast::Node::Table(node) => {
                let align: Vec<Value> = node.align.into_iter().map(align_value).collect();
                let (table, children) = container("table", node.children);
                (table.prop("align", align), children)
            }
            mdast::Node::TableRow(node) => container("tableRow", node.children),
            mdast::Node::TableCell(node) => container("tableCell", node.children),
            mdast::Node::ThematicBreak(_) => leaf(SyntaxNode::leaf("thematicBreak")),
            mdast::Node::Definition(_) => return None,
            mdast::Node::Paragraph(node) => container("paragraph", node.children),
            mdast::Node::Toml(node) => leaf(SyntaxNode::with_value("toml", node.value)),
            mdast::Node::Yaml(node) => leaf(SyntaxNode::with_value("yaml", node.value)),
            mdast::Node::Html(node) => leaf(SyntaxNode::with_value("html", node.value)),
            mdast::Node::MdxJsxFlowElement(node) => container("mdxJsxFlowElement", node.children),
            mdast::Node::MdxJsxTextElement(node) => container("mdxJsxTextElement", node.children),
            mdast::Node::MdxjsEsm(node) => leaf(SyntaxNode::with_value("mdxjsEsm", node.value)),
            mdast::Node::MdxTextExpression(node) => {
                leaf(SyntaxNode::with_value("mdxTextExpression", node.value))
            }
            mdast::Node::MdxFlowExpression(node) => {
                leaf(SyntaxNode::with_value("mdxFlowExpression", node.value))
            }
        };
        Some(shell)
    }
}

/// Drop mdast subtrees one node at a time instead of one call per level.
fn dismantle(mut nodes: Vec<mdast::Node>) {
    while let Some(mut node) = nodes.pop() {
        if let Some(children) = node.children_mut() {
            nodes.append(children);
        }
    }
}

fn container(
    kind: &'static str,
    children: Vec<mdast::Node>,
) -> (SyntaxNode, Option<Vec<mdast::Node>>) {
    (SyntaxNode::new(kind), Some(children))
}

fn leaf(node: SyntaxNode) -> (SyntaxNode, Option<Vec<mdast::Node>>) {
    (node, None)
}

fn image(url: String, alt: String, title: Option<String>) -> SyntaxNode {
    let alt = (!alt.is_empty()).then_some(alt);
    SyntaxNode::leaf("image")
        .prop("url", url)
        .opt_prop("alt", alt)
        .opt_prop("title", title)
}

/// mdast JSON encodes an unaligned column as `null`.
fn align_value(align: mdast::AlignKind) -> Value {
    match align {
        mdast::AlignKind::Left => Value::from("left"),
        mdast::AlignKind::Center => Value::from("center"),
        mdast::AlignKind::Right => Value::from("right"),
        mdast::AlignKind::None => Value::Null,
    }
}
