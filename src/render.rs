//! HTML Rendering for the closed AST
//!
//! Serializes a [`Node`] tree straight to an HTML string. Text and attribute
//! values are escaped; raw `html` nodes pass through only when the
//! configuration allows it. Every block element ends with a newline.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::attr::{Attrs, AttrsExt, IMAGE_SCHEMES, LINK_SCHEMES, LinkType, safe_url};
use crate::error::{MdError, MdResult};
use crate::hash::StableHasher;
use crate::id::HeadingIds;
use crate::math::{MathMl, MathMode, MathRenderer};
use crate::node::{Image, Link, List, ListItem, Node, TableCell};
use crate::tree::extract_text_content;

// =============================================================================
// RenderConfig
// =============================================================================

/// Configuration for HTML rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    /// Prepended to every class name the renderer generates.
    pub class_name_prefix: String,
    /// Emit raw `html` nodes verbatim. Off by default.
    pub allow_html: bool,
}

impl RenderConfig {
    /// No class prefix, raw HTML dropped.
    pub const DEFAULT: Self = Self {
        class_name_prefix: String::new(),
        allow_html: false,
    };

    /// For content from a trusted author: raw HTML passes through.
    pub const TRUSTED: Self = Self {
        class_name_prefix: String::new(),
        allow_html: true,
    };

    /// Create a new config.
    pub fn new(class_name_prefix: impl Into<String>, allow_html: bool) -> Self {
        Self {
            class_name_prefix: class_name_prefix.into(),
            allow_html,
        }
    }

    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_name_prefix = prefix.into();
        self
    }

    pub fn with_allow_html(mut self, allow_html: bool) -> Self {
        self.allow_html = allow_html;
        self
    }

    /// The prefix may only contain ASCII letters, digits, `-` and `_`.
    pub fn validate(&self) -> MdResult<()> {
        let prefix = &self.class_name_prefix;
        if let Some(bad) = prefix
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_')))
        {
            return Err(MdError::invalid_config(
                "classNamePrefix",
                format!("`{prefix}` contains `{bad}`, which is not valid in a class name"),
            ));
        }
        Ok(())
    }

    /// Prefixed class name.
    pub fn class(&self, name: &str) -> String {
        format!("{}{name}", self.class_name_prefix)
    }

    pub(crate) fn hash_into(&self, hasher: StableHasher) -> StableHasher {
        hasher
            .update_str("render")
            .update_str(&self.class_name_prefix)
            .update(&[u8::from(self.allow_html)])
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// =============================================================================
// HtmlRenderer
// =============================================================================

/// Renders closed-AST trees to HTML.
///
/// # Example
///
/// ```ignore
/// let config = RenderConfig::default().with_class_prefix("md-");
/// let html = HtmlRenderer::new(&config).with_breaks(true).render(&root);
/// ```
pub struct HtmlRenderer<'a> {
    config: &'a RenderConfig,
    math: &'a dyn MathRenderer,
    breaks: bool,
}

impl<'a> HtmlRenderer<'a> {
    /// Renderer with the MathML backend and soft breaks kept as newlines.
    pub fn new(config: &'a RenderConfig) -> Self {
        Self {
            config,
            math: &MathMl,
            breaks: false,
        }
    }

    pub fn with_math(mut self, math: &'a dyn MathRenderer) -> Self {
        self.math = math;
        self
    }

    /// Render newlines inside text as `<br />`.
    pub fn with_breaks(mut self, breaks: bool) -> Self {
        self.breaks = breaks;
        self
    }

    /// Render a tree to HTML string.
    ///
    /// Heading ids are allocated per call, so rendering the same tree twice
    /// yields identical output.
    pub fn render(&self, node: &Node) -> String {
        let mut writer = Writer {
            renderer: self,
            out: String::new(),
            ids: HeadingIds::new(),
            tight: false,
        };
        writer.node(node);
        writer.out
    }
}

/// Render a tree with default math and break handling.
pub fn render_html(node: &Node, config: &RenderConfig) -> String {
    HtmlRenderer::new(config).render(node)
}

// =============================================================================
// Writer
// =============================================================================

struct Writer<'r, 'a> {
    renderer: &'r HtmlRenderer<'a>,
    out: String,
    ids: HeadingIds,
    /// Inside a tight list, item paragraphs render without `<p>`.
    tight: bool,
}

impl Writer<'_, '_> {
    fn class(&self, name: &str) -> String {
        self.renderer.config.class(name)
    }

    fn nodes(&mut self, nodes: &[Node]) {
        for node in nodes {
            self.node(node);
        }
    }

    fn node(&mut self, node: &Node) {
        match node {
            Node::Root(root) => self.nodes(&root.children),
            Node::Paragraph(para) => {
                self.element("p", &Attrs::new(), &para.children);
                self.out.push('\n');
            }
            Node::Heading(heading) => {
                let id = self.ids.next_id(&extract_text_content(node));
                let tag = heading_tag(heading.depth);
                self.element(tag, &vec![("id", id)], &heading.children);
                self.out.push('\n');
            }
            Node::Blockquote(quote) => {
                self.open("blockquote", &Attrs::new());
                self.out.push('\n');
                self.nodes(&quote.children);
                self.close("blockquote");
                self.out.push('\n');
            }
            Node::List(list) => self.list(list),
            Node::ListItem(item) => self.list_item(item),
            Node::Code(code) => {
                self.open("code", &Attrs::new());
                self.out.push_str(&escape_html(&code.value));
                self.close("code");
            }
            Node::CodeBlock(block) => {
                let mut code_attrs = Attrs::new();
                if let Some(lang) = block.lang.as_deref().filter(|lang| !lang.is_empty()) {
                    code_attrs.add_class(self.class(&format!("language-{lang}")));
                }
                self.open("pre", &vec![("class", self.class("code-block"))]);
                self.open("code", &code_attrs);
                self.out.push_str(&escape_html(&block.value));
                self.close("code");
                self.close("pre");
                self.out.push('\n');
            }
            Node::Emphasis(em) => self.element("em", &Attrs::new(), &em.children),
            Node::Strong(strong) => self.element("strong", &Attrs::new(), &strong.children),
            Node::Mark(mark) => self.element("mark", &Attrs::new(), &mark.children),
            Node::Link(link) => self.link(link),
            Node::Image(image) => self.image(image),
            Node::Text(text) => self.text(&text.value),
            Node::ThematicBreak => self.out.push_str("<hr />\n"),
            Node::Html(html) => {
                if self.renderer.config.allow_html {
                    self.out.push_str(&html.value);
                } else {
                    debug!(bytes = html.value.len(), "dropping raw html");
                }
            }
            Node::Table(table) => {
                self.out.push_str("<table>\n");
                let mut rows = table.children.iter();
                if let Some(head) = rows.next() {
                    self.out.push_str("<thead>\n");
                    self.row(head, "th");
                    self.out.push_str("</thead>\n");
                }
                let mut body = rows.peekable();
                if body.peek().is_some() {
                    self.out.push_str("<tbody>\n");
                    for row in body {
                        self.row(row, "td");
                    }
                    self.out.push_str("</tbody>\n");
                }
                self.out.push_str("</table>\n");
            }
            Node::TableRow(_) => self.row(node, "td"),
            Node::TableCell(cell) => self.cell(cell, "td"),
            Node::Math(math) => self.math(&math.value, MathMode::Display),
            Node::InlineMath(math) => self.math(&math.value, MathMode::Inline),
            Node::Yaml(_) => {}
        }
    }

    fn list(&mut self, list: &List) {
        let tag = if list.ordered { "ol" } else { "ul" };
        let mut attrs = Attrs::new();
        if list.ordered && list.first_number() != 1 {
            attrs.set_attr("start", list.first_number().to_string());
        }
        let has_tasks = list
            .children
            .iter()
            .any(|item| item.as_list_item().is_some_and(ListItem::is_task));
        if has_tasks {
            attrs.add_class(self.class("contains-task-list"));
        }

        self.open(tag, &attrs);
        self.out.push('\n');
        let outer = std::mem::replace(&mut self.tight, !list.spread);
        self.nodes(&list.children);
        self.tight = outer;
        self.close(tag);
        self.out.push('\n');
    }

    fn list_item(&mut self, item: &ListItem) {
        let mut attrs = Attrs::new();
        if item.is_task() {
            attrs.add_class(self.class("task-list-item"));
        }
        self.open("li", &attrs);

        if let Some(checked) = item.checked {
            let mut input: Attrs = vec![("type", "checkbox".into()), ("disabled", String::new())];
            if checked {
                input.set_attr("checked", "");
            }
            self.void("input", &input);
            self.out.push(' ');
        }

        if self.tight {
            for child in &item.children {
                match child {
                    Node::Paragraph(para) => self.nodes(&para.children),
                    block => {
                        if !self.out.ends_with('\n') {
                            self.out.push('\n');
                        }
                        self.node(block);
                    }
                }
            }
        } else if !item.children.is_empty() {
            self.out.push('\n');
            self.nodes(&item.children);
        }

        self.close("li");
        self.out.push('\n');
    }

    fn link(&mut self, link: &Link) {
        let href = safe_url(&link.url, LINK_SCHEMES);
        let mut attrs: Attrs = vec![("href", href.to_string())];
        if let Some(title) = &link.title {
            attrs.set_attr("title", title.as_str());
        }
        if LinkType::from_href(href).is_external() {
            attrs.set_attr("target", "_blank");
            attrs.set_attr("rel", "noopener noreferrer");
        }
        self.element("a", &attrs, &link.children);
    }

    fn image(&mut self, image: &Image) {
        let mut attrs: Attrs = vec![
            ("src", safe_url(&image.url, IMAGE_SCHEMES).to_string()),
            ("alt", image.alt.clone().unwrap_or_default()),
        ];
        if let Some(title) = &image.title {
            attrs.set_attr("title", title.as_str());
        }
        attrs.set_attr("loading", "lazy");
        self.void("img", &attrs);
    }

    fn text(&mut self, value: &str) {
        if !self.renderer.breaks {
            self.out.push_str(&escape_html(value));
            return;
        }
        for (i, line) in value.split('\n').enumerate() {
            if i > 0 {
                self.out.push_str("<br />\n");
            }
            self.out.push_str(&escape_html(line));
        }
    }

    fn row(&mut self, row: &Node, cell_tag: &'static str) {
        self.out.push_str("<tr>\n");
        for child in row.children().unwrap_or_default() {
            match child {
                Node::TableCell(cell) => self.cell(cell, cell_tag),
                other => self.node(other),
            }
        }
        self.out.push_str("</tr>\n");
    }

    fn cell(&mut self, cell: &TableCell, tag: &'static str) {
        let mut attrs = Attrs::new();
        if let Some(align) = cell.align {
            attrs.add_class(self.class(&format!("align-{align}")));
        }
        self.element(tag, &attrs, &cell.children);
        self.out.push('\n');
    }

    fn math(&mut self, tex: &str, mode: MathMode) {
        let (tag, class) = match mode {
            MathMode::Inline => ("span", "math-inline"),
            MathMode::Display => ("div", "math-display"),
        };
        let backend = self.renderer.math;
        match backend.render(tex, mode) {
            Ok(markup) => {
                self.open(tag, &vec![("class", self.class(class))]);
                self.out.push_str(&markup);
                self.close(tag);
            }
            Err(err) => {
                warn!(error = %err, backend = backend.name(), "math failed to render; showing source");
                self.open("code", &vec![("class", self.class("math-error"))]);
                self.out.push_str(&escape_html(tex));
                self.close("code");
            }
        }
        if mode == MathMode::Display {
            self.out.push('\n');
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tag output
    // ─────────────────────────────────────────────────────────────────────────

    fn element(&mut self, tag: &str, attrs: &Attrs, children: &[Node]) {
        self.open(tag, attrs);
        self.nodes(children);
        self.close(tag);
    }

    fn open(&mut self, tag: &str, attrs: &Attrs) {
        self.out.push('<');
        self.out.push_str(tag);
        render_attrs(attrs, &mut self.out);
        self.out.push('>');
    }

    fn void(&mut self, tag: &str, attrs: &Attrs) {
        self.out.push('<');
        self.out.push_str(tag);
        render_attrs(attrs, &mut self.out);
        self.out.push_str(" />");
    }

    fn close(&mut self, tag: &str) {
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
    }
}

fn heading_tag(depth: u8) -> &'static str {
    match depth {
        0 | 1 => "h1",
        2 => "h2",
        3 => "h3",
        4 => "h4",
        5 => "h5",
        _ => "h6",
    }
}

/// Render attributes to HTML.
fn render_attrs(attrs: &Attrs, output: &mut String) {
    for (name, value) in attrs.iter() {
        output.push(' ');
        output.push_str(name);
        output.push_str("=\"");
        output.push_str(&escape_attr(value));
        output.push('"');
    }
}

/// Escape HTML special characters.
fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape attribute value special characters.
fn escape_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::heading_id;
    use crate::node::{Align, CodeBlock, Html, InlineMath, Math, Table, TableRow, Yaml};

    fn render(node: &Node) -> String {
        render_html(node, &RenderConfig::default())
    }

    fn cell(align: Option<Align>, text: &str) -> Node {
        Node::TableCell(TableCell {
            align,
            children: vec![Node::text(text)],
        })
    }

    struct FailingMath;

    impl MathRenderer for FailingMath {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn render(&self, tex: &str, _mode: MathMode) -> MdResult<String> {
            Err(MdError::MalformedMath {
                tex: tex.to_string(),
                reason: "always fails".into(),
            })
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_attr("\"x\""), "&quot;x&quot;");
    }

    #[test]
    fn test_paragraph_and_inline() {
        let para = Node::paragraph(vec![
            Node::text("a < b "),
            Node::strong(vec![Node::text("bold")]),
            Node::text(" "),
            Node::mark(vec![Node::text("hi")]),
            Node::text(" "),
            Node::inline_code("<T>"),
        ]);
        assert_eq!(
            render(&para),
            "<p>a &lt; b <strong>bold</strong> <mark>hi</mark> <code>&lt;T&gt;</code></p>\n"
        );
    }

    #[test]
    fn test_heading_ids() {
        let root = Node::root(vec![
            Node::heading(1, vec![Node::text("Title")]),
            Node::heading(2, vec![Node::text("Title")]),
        ]);
        let id = heading_id("Title");
        assert_eq!(
            render(&root),
            format!("<h1 id=\"{id}\">Title</h1>\n<h2 id=\"{id}-1\">Title</h2>\n")
        );
        assert_eq!(render(&root), render(&root));
    }

    #[test]
    fn test_task_list() {
        let list = Node::List(List {
            ordered: false,
            start: None,
            spread: false,
            children: vec![
                Node::list_item(Some(false), vec![Node::paragraph(vec![Node::text("todo")])]),
                Node::list_item(Some(true), vec![Node::paragraph(vec![Node::text("done")])]),
                Node::list_item(None, vec![Node::paragraph(vec![Node::text("plain")])]),
            ],
        });
        let html = render(&list);
        assert_eq!(
            html,
            "<ul class=\"contains-task-list\">\n\
             <li class=\"task-list-item\"><input type=\"checkbox\" disabled=\"\" /> todo</li>\n\
             <li class=\"task-list-item\"><input type=\"checkbox\" disabled=\"\" checked=\"\" /> done</li>\n\
             <li>plain</li>\n\
             </ul>\n"
        );
    }

    #[test]
    fn test_ordered_start() {
        let list = |start| {
            Node::List(List {
                ordered: true,
                start,
                spread: false,
                children: vec![Node::list_item(None, vec![])],
            })
        };
        assert!(render(&list(Some(3))).starts_with("<ol start=\"3\">\n"));
        assert!(render(&list(Some(1))).starts_with("<ol>\n"));
        assert!(render(&list(None)).starts_with("<ol>\n"));
    }

    #[test]
    fn test_loose_item() {
        let item = Node::list_item(
            None,
            vec![
                Node::paragraph(vec![Node::text("a")]),
                Node::paragraph(vec![Node::text("b")]),
            ],
        );
        assert_eq!(render(&item), "<li>\n<p>a</p>\n<p>b</p>\n</li>\n");
    }

    #[test]
    fn test_list_spread() {
        let item = |text| Node::list_item(None, vec![Node::paragraph(vec![Node::text(text)])]);
        let list = |spread| {
            Node::List(List {
                ordered: false,
                start: None,
                spread,
                children: vec![item("a"), item("b")],
            })
        };
        assert_eq!(render(&list(false)), "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");
        assert_eq!(
            render(&list(true)),
            "<ul>\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_tight_item_with_nested_block() {
        let nested = Node::List(List {
            ordered: false,
            start: None,
            spread: true,
            children: vec![Node::list_item(None, vec![Node::paragraph(vec![Node::text("b")])])],
        });
        let outer = Node::List(List {
            ordered: false,
            start: None,
            spread: false,
            children: vec![Node::list_item(
                None,
                vec![Node::paragraph(vec![Node::text("a")]), nested],
            )],
        });
        assert_eq!(
            render(&outer),
            "<ul>\n<li>a\n<ul>\n<li>\n<p>b</p>\n</li>\n</ul>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_code_block() {
        let block = Node::CodeBlock(CodeBlock {
            value: "let x = 1 < 2;".into(),
            lang: Some("rust".into()),
            meta: None,
        });
        let config = RenderConfig::default().with_class_prefix("md-");
        assert_eq!(
            render_html(&block, &config),
            "<pre class=\"md-code-block\"><code class=\"md-language-rust\">let x = 1 &lt; 2;</code></pre>\n"
        );
    }

    #[test]
    fn test_table() {
        let table = Node::Table(Table {
            align: [Align::Left, Align::None].into_iter().collect(),
            children: vec![
                Node::TableRow(TableRow {
                    children: vec![cell(Some(Align::Left), "a"), cell(None, "b")],
                }),
                Node::TableRow(TableRow {
                    children: vec![cell(Some(Align::Left), "1"), cell(None, "2")],
                }),
            ],
        });
        let config = RenderConfig::default().with_class_prefix("x-");
        assert_eq!(
            render_html(&table, &config),
            "<table>\n<thead>\n<tr>\n<th class=\"x-align-left\">a</th>\n<th>b</th>\n</tr>\n</thead>\n\
             <tbody>\n<tr>\n<td class=\"x-align-left\">1</td>\n<td>2</td>\n</tr>\n</tbody>\n</table>\n"
        );
    }

    #[test]
    fn test_raw_html_gate() {
        let root = Node::root(vec![
            Node::Html(Html {
                value: "<div>secret</div>".into(),
            }),
            Node::paragraph(vec![Node::text("visible")]),
        ]);
        let denied = render(&root);
        assert!(!denied.contains("secret"));
        assert!(denied.contains("visible"));

        let allowed = render_html(&root, &RenderConfig::TRUSTED);
        assert!(allowed.contains("<div>secret</div>"));
    }

    #[test]
    fn test_links_and_images() {
        let link = Node::link("https://rust-lang.org", vec![Node::text("rust")]);
        assert_eq!(
            render(&link),
            "<a href=\"https://rust-lang.org\" target=\"_blank\" rel=\"noopener noreferrer\">rust</a>"
        );

        let local = Node::link("/docs", vec![Node::text("docs")]);
        assert_eq!(render(&local), "<a href=\"/docs\">docs</a>");

        let evil = Node::link("javascript:alert(1)", vec![Node::text("x")]);
        assert_eq!(render(&evil), "<a href=\"\">x</a>");

        let image = Node::image("/a.png", Some("A \"quoted\" alt"));
        assert_eq!(
            render(&image),
            "<img src=\"/a.png\" alt=\"A &quot;quoted&quot; alt\" loading=\"lazy\" />"
        );
    }

    #[test]
    fn test_breaks() {
        let para = Node::paragraph(vec![Node::text("a\nb")]);
        assert_eq!(render(&para), "<p>a\nb</p>\n");

        let config = RenderConfig::default();
        let html = HtmlRenderer::new(&config).with_breaks(true).render(&para);
        assert_eq!(html, "<p>a<br />\nb</p>\n");
    }

    #[test]
    fn test_math() {
        let inline = Node::InlineMath(InlineMath { value: "x^2".into() });
        let html = render(&inline);
        assert!(html.starts_with("<span class=\"math-inline\"><math"));

        let display = Node::Math(Math {
            value: "a < b".into(),
            meta: None,
        });
        let config = RenderConfig::default();
        let html = HtmlRenderer::new(&config).with_math(&FailingMath).render(&display);
        assert_eq!(html, "<code class=\"math-error\">a &lt; b</code>\n");
    }

    #[test]
    fn test_math_failure_is_local() {
        let root = Node::root(vec![
            Node::paragraph(vec![Node::InlineMath(InlineMath { value: "bad".into() })]),
            Node::paragraph(vec![Node::text("after")]),
        ]);
        let config = RenderConfig::default();
        let html = HtmlRenderer::new(&config).with_math(&FailingMath).render(&root);
        assert!(html.contains("math-error"));
        assert!(html.ends_with("<p>after</p>\n"));
    }

    #[test]
    fn test_front_matter_hidden() {
        let root = Node::root(vec![
            Node::Yaml(Yaml { value: "title: x".into() }),
            Node::ThematicBreak,
        ]);
        assert_eq!(render(&root), "<hr />\n");
    }

    #[test]
    fn test_config_validate() {
        assert!(RenderConfig::default().validate().is_ok());
        assert!(RenderConfig::default().with_class_prefix("md_x-").validate().is_ok());

        let err = RenderConfig::default()
            .with_class_prefix("bad prefix")
            .validate()
            .unwrap_err();
        assert!(matches!(err, MdError::InvalidConfiguration { ref field, .. } if field == "classNamePrefix"));
    }
}
