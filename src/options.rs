//! Parse options.
//!
//! Controls which extension constructs the tokenizer recognizes. Rendering
//! options live in [`crate::render::RenderConfig`].

use serde::{Deserialize, Serialize};

use crate::hash::StableHasher;

/// Default nesting limit for tokenizing and normalizing; the root is level 1.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Markdown dialect switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParseOptions {
    /// GitHub-flavored extensions: tables, task items, strikethrough, autolinks
    pub gfm: bool,
    /// Render newlines inside text as `<br />`
    ///
    /// Hard breaks (two trailing spaces or a trailing backslash) become a
    /// `"\n"` text node, the same as a soft line ending, so with this off
    /// they render as plain newlines and cannot be told apart afterwards.
    pub breaks: bool,
    /// Markdown.pl compatibility: ordered lists always number from 1
    pub pedantic: bool,
    /// `$inline$` and `$$ display $$` math
    pub math: bool,
    /// Leading `---` YAML front-matter block
    pub frontmatter: bool,
    /// `==highlight==` marks
    pub mark: bool,
}

impl ParseOptions {
    /// Every extension on (the default).
    pub const DEFAULT: Self = Self {
        gfm: true,
        breaks: false,
        pedantic: false,
        math: true,
        frontmatter: true,
        mark: true,
    };

    /// Plain CommonMark, no extensions.
    pub const COMMONMARK: Self = Self {
        gfm: false,
        breaks: false,
        pedantic: false,
        math: false,
        frontmatter: false,
        mark: false,
    };

    pub fn new() -> Self {
        Self::DEFAULT
    }

    pub fn with_gfm(mut self, gfm: bool) -> Self {
        self.gfm = gfm;
        self
    }

    pub fn with_breaks(mut self, breaks: bool) -> Self {
        self.breaks = breaks;
        self
    }

    pub fn with_pedantic(mut self, pedantic: bool) -> Self {
        self.pedantic = pedantic;
        self
    }

    pub fn with_math(mut self, math: bool) -> Self {
        self.math = math;
        self
    }

    pub fn with_frontmatter(mut self, frontmatter: bool) -> Self {
        self.frontmatter = frontmatter;
        self
    }

    pub fn with_mark(mut self, mark: bool) -> Self {
        self.mark = mark;
        self
    }

    /// Tokenizer options for these switches.
    pub(crate) fn to_mdast(self) -> markdown::ParseOptions {
        let mut options = if self.gfm {
            markdown::ParseOptions::gfm()
        } else {
            markdown::ParseOptions::default()
        };
        options.constructs.frontmatter = self.frontmatter;
        options.constructs.math_flow = self.math;
        options.constructs.math_text = self.math;
        options
    }

    /// Feed every switch into a fingerprint.
    pub(crate) fn hash_into(self, hasher: StableHasher) -> StableHasher {
        [
            self.gfm,
            self.breaks,
            self.pedantic,
            self.math,
            self.frontmatter,
            self.mark,
        ]
        .into_iter()
        .fold(hasher.update_str("parse"), |h, flag| h.update(&[u8::from(flag)]))
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}
