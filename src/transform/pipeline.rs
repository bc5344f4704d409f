//! Markdown processing pipeline.
//!
//! A `Pipeline` is a plain, cloneable value holding one complete
//! configuration: parse options, normalizer policy, render settings and the
//! math backend. Any number can coexist; none of them carry state between
//! calls.
//!
//! ```text
//! markdown ──tokenize──▶ SyntaxNode ──normalize──▶ Node ──render──▶ HTML
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::convert::tokenize_with_limit;
use crate::error::MdResult;
use crate::hash::StableHasher;
use crate::math::{MathMl, MathRenderer};
use crate::node::Node;
use crate::options::ParseOptions;
use crate::render::{HtmlRenderer, RenderConfig};
use crate::syntax::SyntaxNode;

use super::{Normalizer, Policy, Transform};

// =============================================================================
// Pipeline
// =============================================================================

/// Configured Markdown → AST → HTML pipeline.
///
/// # Example
///
/// ```ignore
/// use tola_mdast::transform::{Pipeline, Policy};
///
/// let pipeline = Pipeline::new()
///     .with_policy(Policy::Lenient)
///     .with_render_config(RenderConfig::default().with_class_prefix("md-"));
///
/// let html = pipeline.render_to_html("# Hello\n")?;
/// ```
#[derive(Clone)]
pub struct Pipeline {
    options: ParseOptions,
    normalizer: Normalizer,
    render: RenderConfig,
    math: Arc<dyn MathRenderer>,
}

impl Pipeline {
    /// Default options, strict policy, MathML math.
    pub fn new() -> Self {
        Self {
            options: ParseOptions::default(),
            normalizer: Normalizer::default(),
            render: RenderConfig::default(),
            math: Arc::new(MathMl),
        }
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self.normalizer = self.normalizer.with_pedantic(options.pedantic);
        self
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.normalizer = self.normalizer.with_policy(policy);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.normalizer = self.normalizer.with_max_depth(max_depth);
        self
    }

    pub fn with_render_config(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }

    pub fn with_math_renderer(mut self, math: Arc<dyn MathRenderer>) -> Self {
        self.math = math;
        self
    }

    #[inline]
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    #[inline]
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    #[inline]
    pub fn render_config(&self) -> &RenderConfig {
        &self.render
    }

    /// Reject out-of-domain configuration values.
    pub fn validate(&self) -> MdResult<()> {
        self.normalizer.validate()?;
        self.render.validate()
    }

    /// Tokenize only, yielding the generic tree.
    pub fn tokenize(&self, markdown: &str) -> MdResult<SyntaxNode> {
        self.validate()?;
        tokenize_with_limit(markdown, &self.options, self.normalizer.max_depth())
    }

    /// Normalize a generic tree produced elsewhere (e.g. loaded from
    /// mdast JSON).
    pub fn normalize(&self, tree: SyntaxNode) -> MdResult<Node> {
        self.validate()?;
        self.normalizer.transform(tree)
    }

    /// Parse Markdown into the closed AST.
    pub fn parse(&self, markdown: &str) -> MdResult<Node> {
        let tree = self.tokenize(markdown)?;
        let root = self.normalizer.transform(tree)?;
        debug!(
            bytes = markdown.len(),
            policy = self.normalizer.policy().as_str(),
            "parsed markdown"
        );
        Ok(root)
    }

    /// Render an already-parsed tree.
    pub fn render_node(&self, node: &Node) -> String {
        HtmlRenderer::new(&self.render)
            .with_math(self.math.as_ref())
            .with_breaks(self.options.breaks)
            .render(node)
    }

    /// Parse and render in one step.
    pub fn render_to_html(&self, markdown: &str) -> MdResult<String> {
        let root = self.parse(markdown)?;
        Ok(self.render_node(&root))
    }

    /// Parse many documents. Runs on the rayon pool with the `parallel`
    /// feature; results keep input order either way.
    pub fn parse_batch<S>(&self, documents: &[S]) -> Vec<MdResult<Node>>
    where
        S: AsRef<str> + Sync,
    {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            documents
                .par_iter()
                .map(|doc| self.parse(doc.as_ref()))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            documents.iter().map(|doc| self.parse(doc.as_ref())).collect()
        }
    }

    /// Stable hash of everything that can change a result.
    pub fn fingerprint(&self) -> u64 {
        let hasher = self.options.hash_into(StableHasher::new());
        let hasher = self.render.hash_into(hasher);
        hasher
            .update_str(self.normalizer.policy().as_str())
            .update_usize(self.normalizer.max_depth())
            .update_str(self.math.name())
            .finish()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("options", &self.options)
            .field("normalizer", &self.normalizer)
            .field("render", &self.render)
            .field("math", &self.math.name())
            .finish()
    }
}

// =============================================================================
// Convenience functions
// =============================================================================

/// Parse with the default pipeline.
pub fn parse_markdown(markdown: &str) -> MdResult<Node> {
    Pipeline::new().parse(markdown)
}

/// Parse and render with the default pipeline.
pub fn render_markdown_to_html(markdown: &str) -> MdResult<String> {
    Pipeline::new().render_to_html(markdown)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MdError;
    use crate::extract::extract_headings;
    use crate::math::MathMode;
    use crate::node::{Align, NodeKind};
    use crate::tree::extract_text_content;

    static_assertions::assert_impl_all!(Pipeline: Send, Sync, Clone);

    #[test]
    fn test_heading_and_task_list() {
        let root = parse_markdown("# Title\n\n- [ ] todo\n- [x] done\n").unwrap();
        let children = root.children().unwrap();
        assert_eq!(children.len(), 2);

        let heading = children[0].as_heading().unwrap();
        assert_eq!(heading.depth, 1);
        assert_eq!(heading.children, [Node::text("Title")]);

        let list = children[1].as_list().unwrap();
        assert!(!list.ordered);
        let checked: Vec<_> = list
            .children
            .iter()
            .map(|item| item.as_list_item().unwrap().checked)
            .collect();
        assert_eq!(checked, [Some(false), Some(true)]);
    }

    #[test]
    fn test_table_alignment() {
        let md = "| a | b | c |\n| :-- | :-: | --: |\n| 1 | 2 | 3 |\n";
        let root = parse_markdown(md).unwrap();
        let table = root.children().unwrap()[0].as_table().unwrap();
        assert_eq!(table.align.as_slice(), [Align::Left, Align::Center, Align::Right]);

        for row in table.rows() {
            let aligns: Vec<_> = row
                .children
                .iter()
                .map(|cell| cell.as_table_cell().unwrap().align)
                .collect();
            assert_eq!(aligns, [Some(Align::Left), Some(Align::Center), Some(Align::Right)]);
        }
    }

    #[test]
    fn test_text_adjacency() {
        let root = parse_markdown("a*b*c").unwrap();
        assert_eq!(extract_text_content(&root), "abc");
    }

    #[test]
    fn test_hard_break_matches_soft_break() {
        let md = "a  \nb\\\nc\nd\n";
        assert_eq!(render_markdown_to_html(md).unwrap(), "<p>a\nb\nc\nd</p>\n");

        let breaks = Pipeline::new().with_options(ParseOptions::default().with_breaks(true));
        assert_eq!(
            breaks.render_to_html(md).unwrap(),
            "<p>a<br />\nb<br />\nc<br />\nd</p>\n"
        );
    }

    #[test]
    fn test_loose_and_tight_lists() {
        let tight = render_markdown_to_html("- a\n- b\n").unwrap();
        assert_eq!(tight, "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");

        let loose = render_markdown_to_html("- a\n\n- b\n").unwrap();
        assert_eq!(loose, "<ul>\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n</ul>\n");

        let root = parse_markdown("- a\n\n  b\n- c\n").unwrap();
        assert!(root.children().unwrap()[0].as_list().unwrap().spread);
    }

    #[test]
    fn test_mark_around_strong() {
        let root = parse_markdown("==**b**==\n").unwrap();
        let para = root.children().unwrap()[0].as_paragraph().unwrap();
        assert_eq!(para.children, [Node::mark(vec![Node::strong(vec![Node::text("b")])])]);
    }

    #[test]
    fn test_raw_html_default_deny() {
        let md = "<div>secret</div>\n\ntext\n";
        let html = render_markdown_to_html(md).unwrap();
        assert!(!html.contains("secret"));
        assert!(html.contains("<p>text</p>"));

        let trusted = Pipeline::new().with_render_config(RenderConfig::TRUSTED);
        assert!(trusted.render_to_html(md).unwrap().contains("<div>secret</div>"));
    }

    #[test]
    fn test_strikethrough_policy() {
        let err = parse_markdown("~~x~~\n").unwrap_err();
        assert!(matches!(err, MdError::UnsupportedNodeKind { ref kind } if kind == "delete"));

        let root = Pipeline::new()
            .with_policy(Policy::Lenient)
            .parse("~~x~~\n")
            .unwrap();
        let para = root.children().unwrap()[0].as_paragraph().unwrap();
        assert_eq!(para.children, [Node::text("x")]);
    }

    #[test]
    fn test_commonmark_has_no_task_items() {
        let pipeline = Pipeline::new().with_options(ParseOptions::COMMONMARK);
        let root = pipeline.parse("- [ ] todo\n").unwrap();
        let list = root.children().unwrap()[0].as_list().unwrap();
        assert_eq!(list.children[0].as_list_item().unwrap().checked, None);
    }

    #[test]
    fn test_ordered_start_and_pedantic() {
        let md = "3. a\n4. b\n";
        let list = |pipeline: &Pipeline| {
            let root = pipeline.parse(md).unwrap();
            root.children().unwrap()[0].as_list().unwrap().start
        };
        assert_eq!(list(&Pipeline::new()), Some(3));

        let pedantic = Pipeline::new().with_options(ParseOptions::default().with_pedantic(true));
        assert_eq!(list(&pedantic), None);
        assert!(pedantic.render_to_html(md).unwrap().starts_with("<ol>\n"));
    }

    #[test]
    fn test_front_matter() {
        let root = parse_markdown("---\ntitle: Hello\n---\n\n# Body\n").unwrap();
        let children = root.children().unwrap();
        assert_eq!(children[0].as_yaml().unwrap().value, "title: Hello");
        assert_eq!(children[1].kind(), NodeKind::Heading);

        let html = render_markdown_to_html("---\ntitle: Hello\n---\n\n# Body\n").unwrap();
        assert!(!html.contains("title: Hello"));
    }

    #[test]
    fn test_math() {
        let root = parse_markdown("$$\nE = mc^2\n$$\n\nInline $x^2$ here.\n").unwrap();
        let children = root.children().unwrap();
        assert_eq!(children[0].as_math().unwrap().value, "E = mc^2");
        let para = children[1].as_paragraph().unwrap();
        assert!(para.children.iter().any(|n| n.as_inline_math().is_some_and(|m| m.value == "x^2")));

        let html = render_markdown_to_html("Inline $x^2$ here.\n").unwrap();
        assert!(html.contains("<math"));
    }

    #[test]
    fn test_custom_math_renderer() {
        struct Echo;
        impl MathRenderer for Echo {
            fn name(&self) -> &'static str {
                "echo"
            }
            fn render(&self, tex: &str, _mode: MathMode) -> MdResult<String> {
                Ok(format!("[{tex}]"))
            }
        }

        let pipeline = Pipeline::new().with_math_renderer(Arc::new(Echo));
        let html = pipeline.render_to_html("$a$\n").unwrap();
        assert_eq!(html, "<p><span class=\"math-inline\">[a]</span></p>\n");
        assert_ne!(pipeline.fingerprint(), Pipeline::new().fingerprint());
    }

    #[test]
    fn test_mark() {
        let root = parse_markdown("a ==b== c\n").unwrap();
        let para = root.children().unwrap()[0].as_paragraph().unwrap();
        assert_eq!(
            para.children,
            [Node::text("a "), Node::mark(vec![Node::text("b")]), Node::text(" c")]
        );

        let off = Pipeline::new().with_options(ParseOptions::default().with_mark(false));
        let root = off.parse("a ==b== c\n").unwrap();
        assert_eq!(extract_text_content(&root), "a ==b== c");
    }

    #[test]
    fn test_heading_ids_agree() {
        let md = "# Intro\n\n## Intro\n\n### Next Steps\n";
        let pipeline = Pipeline::new();
        let root = pipeline.parse(md).unwrap();
        let html = pipeline.render_node(&root);

        for heading in extract_headings(&root) {
            assert!(html.contains(&format!("id=\"{}\"", heading.id)), "{}", heading.id);
        }
    }

    #[test]
    fn test_reparse_is_equal() {
        let md = "# A\n\n> quote *em* `code`\n\n1. x\n2. y\n\n---\n\n| h |\n| - |\n| v |\n";
        assert_eq!(parse_markdown(md).unwrap(), parse_markdown(md).unwrap());
        assert_eq!(
            render_markdown_to_html(md).unwrap(),
            render_markdown_to_html(md).unwrap()
        );
    }

    #[test]
    fn test_invalid_configuration_checked_first() {
        let pipeline = Pipeline::new()
            .with_render_config(RenderConfig::default().with_class_prefix("no spaces"));
        assert!(matches!(pipeline.tokenize("x"), Err(MdError::InvalidConfiguration { .. })));
        assert!(matches!(pipeline.parse("x"), Err(MdError::InvalidConfiguration { .. })));

        let pipeline = Pipeline::new().with_max_depth(0);
        assert!(matches!(pipeline.parse("x"), Err(MdError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_too_deep() {
        let md = format!("{}deep\n", "> ".repeat(20));
        let err = Pipeline::new().with_max_depth(8).parse(&md).unwrap_err();
        assert!(matches!(err, MdError::TooDeep { limit: 8 }));
    }

    #[test]
    fn test_default_depth_limit() {
        let md = format!("{}x\n", "> ".repeat(10_000));
        let err = Pipeline::new().parse(&md).unwrap_err();
        assert!(matches!(err, MdError::TooDeep { limit: 256 }), "{err:?}");

        // root + 250 quotes + paragraph + text
        let md = format!("{}x\n", "> ".repeat(250));
        let root = Pipeline::new().parse(&md).unwrap();
        assert_eq!(extract_text_content(&root), "x");
    }

    #[test]
    fn test_normalize_external_tree() {
        let tree = SyntaxNode::from_json(
            r#"{"type": "root", "children": [{"type": "paragraph", "children": [{"type": "text", "value": "hi"}]}]}"#,
        )
        .unwrap();
        let root = Pipeline::new().normalize(tree).unwrap();
        assert_eq!(root, Node::root(vec![Node::paragraph(vec![Node::text("hi")])]));
    }

    #[test]
    fn test_parse_batch_keeps_order() {
        let docs = ["# one\n", "~~bad~~\n", "two\n"];
        let results = Pipeline::new().parse_batch(&docs);
        assert_eq!(results.len(), 3);
        assert_eq!(extract_text_content(results[0].as_ref().unwrap()), "one");
        assert!(results[1].is_err());
        assert_eq!(extract_text_content(results[2].as_ref().unwrap()), "two");
    }

    #[test]
    fn test_fingerprint_tracks_configuration() {
        let base = Pipeline::new().fingerprint();
        assert_eq!(base, Pipeline::new().fingerprint());
        assert_ne!(base, Pipeline::new().with_policy(Policy::Lenient).fingerprint());
        assert_ne!(
            base,
            Pipeline::new()
                .with_render_config(RenderConfig::TRUSTED)
                .fingerprint()
        );
        assert_ne!(
            base,
            Pipeline::new()
                .with_options(ParseOptions::default().with_gfm(false))
                .fingerprint()
        );
    }
}
