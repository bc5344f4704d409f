//! `==highlight==` marks.
//!
//! The tokenizer has no construct for marks, so they are recovered from
//! `text` nodes after tokenizing. A mark opens at `==` followed by a
//! non-whitespace character other than `=`, and closes at the next `==`
//! preceded by non-whitespace.
//!
//! Marks inside one text node are split first. A mark may then span other
//! inline nodes, as in `==**b**==`: it opens at the last `==` of one text
//! sibling and closes in a later text sibling. Text directly inside a
//! `mark` is left alone.

use crate::syntax::SyntaxNode;

const FENCE: &str = "==";

/// Split every `text` node below `root` into text and `mark` nodes.
pub fn split_marks(root: &mut SyntaxNode) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        let is_mark = node.is("mark");
        let Some(children) = node.children.as_mut() else {
            continue;
        };
        if !is_mark {
            split_children(children);
        }
        stack.extend(children.iter_mut());
    }
}

fn split_children(children: &mut Vec<SyntaxNode>) {
    let mut rebuilt = Vec::with_capacity(children.len());
    for child in children.drain(..) {
        match text_value(&child).and_then(split_text) {
            Some(parts) => rebuilt.extend(parts),
            None => rebuilt.push(child),
        }
    }
    *children = rebuilt;
    span_marks(children);
}

fn text_value(node: &SyntaxNode) -> Option<&str> {
    if node.is("text") { node.get_str("value") } else { None }
}

/// Turn fences sitting in different text siblings into `mark` nodes.
fn span_marks(children: &mut Vec<SyntaxNode>) {
    let mut index = 0;
    while index < children.len() {
        let Some(span) = find_span(children, index) else {
            index += 1;
            continue;
        };

        let opening = text_value(&children[index]).unwrap_or_default().to_owned();
        let closing = text_value(&children[span.close_node]).unwrap_or_default().to_owned();
        let (head, tail) = (&opening[..span.open], &opening[span.open + FENCE.len()..]);
        let (before, after) = (&closing[..span.close], &closing[span.close + FENCE.len()..]);

        let mut inner: Vec<SyntaxNode> = children.drain(index + 1..span.close_node).collect();
        if !tail.is_empty() {
            inner.insert(0, SyntaxNode::with_value("text", tail));
        }
        if !before.is_empty() {
            inner.push(SyntaxNode::with_value("text", before));
        }

        let mut replacement = Vec::with_capacity(3);
        if !head.is_empty() {
            replacement.push(SyntaxNode::with_value("text", head));
        }
        replacement.push(SyntaxNode::new("mark").with_children(inner));
        if !after.is_empty() {
            replacement.push(SyntaxNode::with_value("text", after));
        }

        // Resume at the text after the mark, which may open another span.
        let resume = index + usize::from(!head.is_empty()) + 1;
        children.splice(index..index + 2, replacement);
        index = resume;
    }
}

/// Fence positions of a mark opening in text sibling `index`.
struct Span {
    /// Byte offset of the opening fence in the opening text.
    open: usize,
    /// Sibling index of the text holding the closing fence.
    close_node: usize,
    /// Byte offset of the closing fence in that text.
    close: usize,
}

fn find_span(children: &[SyntaxNode], index: usize) -> Option<Span> {
    let opening = text_value(&children[index])?;
    let open = opening.rfind(FENCE)?;
    let tail = &opening[open + FENCE.len()..];
    if tail.starts_with(char::is_whitespace) {
        return None;
    }

    for (close_node, sibling) in children.iter().enumerate().skip(index + 1) {
        let Some(text) = text_value(sibling) else {
            continue;
        };
        let mut from = 0;
        while let Some(offset) = text[from..].find(FENCE) {
            let close = from + offset;
            let spaced = match text[..close].chars().next_back() {
                Some(c) => c.is_whitespace(),
                // Empty content counts as spaced.
                None if close_node == index + 1 => {
                    tail.chars().next_back().is_none_or(char::is_whitespace)
                }
                // Otherwise the fence follows an inline node.
                None => text_value(&children[close_node - 1])
                    .is_some_and(|previous| previous.ends_with(char::is_whitespace)),
            };
            if !spaced {
                return Some(Span {
                    open,
                    close_node,
                    close,
                });
            }
            from = close + 1;
        }
    }
    None
}

/// Split one text value; `None` when it contains no mark.
fn split_text(value: &str) -> Option<Vec<SyntaxNode>> {
    let mut parts = Vec::new();
    let mut plain_start = 0;
    let mut cursor = 0;

    while let Some(offset) = value[cursor..].find(FENCE) {
        let open = cursor + offset;
        let inner = open + FENCE.len();
        match closing_fence(&value[inner..]) {
            Some(len) => {
                if open > plain_start {
                    parts.push(SyntaxNode::with_value("text", &value[plain_start..open]));
                }
                let content = SyntaxNode::with_value("text", &value[inner..inner + len]);
                parts.push(SyntaxNode::new("mark").child(content));
                cursor = inner + len + FENCE.len();
                plain_start = cursor;
            }
            None => cursor = open + 1,
        }
    }

    if parts.is_empty() {
        return None;
    }
    if plain_start < value.len() {
        parts.push(SyntaxNode::with_value("text", &value[plain_start..]));
    }
    Some(parts)
}

/// Byte length of the marked content in `rest`, if a valid close exists.
fn closing_fence(rest: &str) -> Option<usize> {
    let first = rest.chars().next()?;
    if first.is_whitespace() || first == '=' {
        return None;
    }

    let mut from = first.len_utf8();
    while let Some(offset) = rest[from..].find(FENCE) {
        let close = from + offset;
        let before = rest[..close].chars().next_back()?;
        if !before.is_whitespace() {
            return Some(close);
        }
        from = close + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn para(text: &str) -> SyntaxNode {
        SyntaxNode::new("paragraph").child(SyntaxNode::with_value("text", text))
    }

    fn describe(node: &SyntaxNode) -> Vec<String> {
        node.children
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|child| match child.kind() {
                "mark" => {
                    let inner = &child.children.as_ref().unwrap()[0];
                    format!("mark:{}", inner.get_str("value").unwrap())
                }
                kind => format!("{kind}:{}", child.get_str("value").unwrap_or_default()),
            })
            .collect()
    }

    #[test]
    fn test_single_mark() {
        let mut node = para("a ==b c== d");
        split_marks(&mut node);
        assert_eq!(describe(&node), ["text:a ", "mark:b c", "text: d"]);
    }

    #[test]
    fn test_multiple_marks() {
        let mut node = para("==x== and ==y==");
        split_marks(&mut node);
        assert_eq!(describe(&node), ["mark:x", "text: and ", "mark:y"]);
    }

    #[test]
    fn test_whitespace_flanking_is_not_a_mark() {
        for text in ["a == b == c", "a ==b ==", "== x==", "====", "a = = b"] {
            let mut node = para(text);
            split_marks(&mut node);
            assert_eq!(describe(&node), [format!("text:{text}")], "{text}");
        }
    }

    #[test]
    fn test_extra_equals_shifts_opening() {
        let mut node = para("a ===b==");
        split_marks(&mut node);
        assert_eq!(describe(&node), ["text:a =", "mark:b"]);
    }

    #[test]
    fn test_nested_containers() {
        let mut root = SyntaxNode::new("root")
            .child(SyntaxNode::new("emphasis").child(SyntaxNode::with_value("text", "==é==")));
        split_marks(&mut root);
        let emphasis = &root.children.as_ref().unwrap()[0];
        assert_eq!(describe(emphasis), ["mark:é"]);
    }

    fn text(value: &str) -> SyntaxNode {
        SyntaxNode::with_value("text", value)
    }

    fn strong(value: &str) -> SyntaxNode {
        SyntaxNode::new("strong").child(text(value))
    }

    #[test]
    fn test_mark_around_inline_node() {
        let mut node = SyntaxNode::new("paragraph").with_children(vec![
            text("=="),
            strong("b"),
            text("=="),
        ]);
        split_marks(&mut node);

        let expected = SyntaxNode::new("paragraph")
            .child(SyntaxNode::new("mark").child(strong("b")));
        assert_eq!(node, expected);
    }

    #[test]
    fn test_mark_spans_siblings() {
        let mut node = SyntaxNode::new("paragraph").with_children(vec![
            text("a ==b "),
            SyntaxNode::new("emphasis").child(text("c")),
            text(" d== e ==f=="),
        ]);
        split_marks(&mut node);

        let mark = SyntaxNode::new("mark").with_children(vec![
            text("b "),
            SyntaxNode::new("emphasis").child(text("c")),
            text(" d"),
        ]);
        let expected = SyntaxNode::new("paragraph").with_children(vec![
            text("a "),
            mark,
            text(" e "),
            SyntaxNode::new("mark").child(text("f")),
        ]);
        assert_eq!(node, expected);
    }

    #[test]
    fn test_unclosed_span_untouched() {
        for last in ["b", " ==", "= ="] {
            let mut node = SyntaxNode::new("paragraph").with_children(vec![
                text("a =="),
                strong("x"),
                text(last),
            ]);
            let original = node.clone();
            split_marks(&mut node);
            assert_eq!(node, original, "{last}");
        }
    }

    #[test]
    fn test_deep_nesting() {
        let mut node = text("==x==");
        for _ in 0..3_000 {
            node = SyntaxNode::new("emphasis").child(node);
        }
        split_marks(&mut node);

        let mut current = &node;
        while let Some(children) = current.children.as_ref() {
            current = &children[0];
        }
        assert_eq!(current.get_str("value"), Some("x"));
    }

    #[test]
    fn test_code_untouched() {
        let mut node =
            SyntaxNode::new("paragraph").child(SyntaxNode::with_value("inlineCode", "==x=="));
        split_marks(&mut node);
        assert_eq!(describe(&node), ["inlineCode:==x=="]);
    }
}
