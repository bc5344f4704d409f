//! Traversal over the closed AST.
//!
//! All traversals are pre-order, left to right, and iterative: the explicit
//! stack means arbitrarily deep trees never hit a recursion limit.

use smallvec::SmallVec;

use crate::node::Node;

/// Visit every node in document order with its parent.
///
/// The root is visited first with parent `None`; every other node exactly
/// once with `Some(parent)`.
pub fn walk<'a, F>(root: &'a Node, mut visit: F)
where
    F: FnMut(&'a Node, Option<&'a Node>),
{
    let mut stack: SmallVec<[(&'a Node, Option<&'a Node>); 32]> = SmallVec::new();
    stack.push((root, None));

    while let Some((node, parent)) = stack.pop() {
        visit(node, parent);
        if let Some(children) = node.children() {
            // Push in reverse so children are visited left-to-right
            stack.extend(children.iter().rev().map(|child| (child, Some(node))));
        }
    }
}

/// All nodes matching `predicate`, in [`walk`] order.
pub fn find<'a, P>(root: &'a Node, mut predicate: P) -> Vec<&'a Node>
where
    P: FnMut(&Node) -> bool,
{
    descendants(root).filter(|node| predicate(node)).collect()
}

/// Concatenated `text` values below `node`, without separators.
///
/// Inline code, math and images contribute nothing.
pub fn extract_text_content(node: &Node) -> String {
    let mut out = String::new();
    for node in descendants(node) {
        if let Node::Text(text) = node {
            out.push_str(&text.value);
        }
    }
    out
}

/// Pre-order iterator over `root` and everything below it.
pub fn descendants(root: &Node) -> Descendants<'_> {
    Descendants::new(root)
}

// =============================================================================
// Descendants - depth-first node traversal
// =============================================================================

/// Depth-first iterator over nodes
pub struct Descendants<'a> {
    stack: SmallVec<[&'a Node; 32]>,
}

impl<'a> Descendants<'a> {
    fn new(root: &'a Node) -> Self {
        let mut stack = SmallVec::new();
        stack.push(root);
        Self { stack }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let Some(children) = node.children() {
            self.stack.extend(children.iter().rev());
        }
        Some(node)
    }
}
