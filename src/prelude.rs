//! Prelude module for common imports.
//!
//! ```ignore
//! use tola_mdast::prelude::*;
//! ```

// Node types
pub use crate::node::{Align, Node, NodeKind};

// Generic tree
pub use crate::syntax::SyntaxNode;

// Options
pub use crate::options::ParseOptions;

// Transform
pub use crate::transform::{
    Normalizer, Pipeline, Policy, Transform, parse_markdown, render_markdown_to_html,
};

// Tree helpers
pub use crate::tree::{descendants, extract_text_content, find, walk};

// Render
pub use crate::render::{HtmlRenderer, RenderConfig, render_html};

// Math
pub use crate::math::{MathMl, MathMode, MathRenderer};

// Extractors
pub use crate::extract::{
    HeadingRecord, ImageRecord, LinkRecord, SourceStats, TreeStats, extract_front_matter,
    extract_headings, extract_images, extract_links,
};

// Error
pub use crate::error::{MdError, MdResult};

// Cache
#[cfg(feature = "cache")]
pub use crate::cache::{CacheKey, SharedParseCache};
