//! tola-mdast - Markdown to a closed, typed AST
//!
//! ## Core Concepts
//!
//! Markdown is tokenized into a generic, mdast-shaped [`SyntaxNode`] tree,
//! then normalized into the closed [`Node`] enum. Everything downstream
//! (HTML rendering, extractors, serialization) matches on `Node` exhaustively,
//! so an unsupported construct is either rejected or substituted up front
//! depending on the [`Policy`].
//!
//! ```text
//! &str ──convert──▶ SyntaxNode ──Normalizer──▶ Node ──render──▶ HTML
//!                                                 └──extract──▶ records
//! ```
//!
//! ## Modules
//! - `convert`: Markdown tokenizer adapter
//! - `syntax`: Generic tree
//! - `node`: Closed AST node types
//! - `transform`: Normalizer and Pipeline
//! - `tree`: Traversal helpers
//! - `render`: HTML rendering
//! - `extract`: Headings, links, images, front-matter, statistics
//! - `serialize`: JSON and versioned snapshots
//!
//! ## Usage
//!
//! ```ignore
//! use tola_mdast::prelude::*;
//!
//! let pipeline = Pipeline::new().with_policy(Policy::Lenient);
//! let root = pipeline.parse("# Hello\n\nWorld\n")?;
//! let html = pipeline.render_node(&root);
//! let toc = extract_headings(&root);
//! ```

#[macro_use]
mod macros;

// =============================================================================
// Core modules
// =============================================================================

/// Error types
pub mod error;

/// Generic mdast-shaped tree
pub mod syntax;

/// Tokenizer options
pub mod options;

/// Deterministic hashing
pub mod hash;

/// Closed AST node types
pub mod node;

/// Traversal helpers
pub mod tree;

/// Heading anchor ids
pub mod id;

/// Attribute helpers and URL sanitizing
pub mod attr;

/// Math backends
pub mod math;

/// HTML rendering
pub mod render;

/// Derived views over a document
pub mod extract;

/// Serialization support
pub mod serialize;

/// Normalizer and Pipeline
pub mod transform;

/// Source converters
pub mod convert;

/// Shared parse cache
#[cfg(feature = "cache")]
pub mod cache;

/// Prelude for common imports
pub mod prelude;

// =============================================================================
// Re-exports
// =============================================================================

// Node types
pub use node::{Align, Node, NodeKind};

// Generic tree
pub use syntax::SyntaxNode;

// Options
pub use options::ParseOptions;

// Transform
pub use transform::{
    Normalizer, Pipeline, Policy, Transform, parse_markdown, render_markdown_to_html,
};

// Tree helpers
pub use tree::{descendants, extract_text_content, find, walk};

// Render
pub use render::{HtmlRenderer, RenderConfig, render_html};

// Math
pub use math::{MathMl, MathMode, MathRenderer};

// Extractors
pub use extract::{
    HeadingRecord, ImageRecord, LinkRecord, SourceStats, TreeStats, extract_front_matter,
    extract_headings, extract_images, extract_links,
};

// Hashing
pub use hash::StableHasher;

// Error types
pub use error::{MdError, MdResult};

// Cache types
#[cfg(feature = "cache")]
pub use cache::{CacheKey, SharedParseCache};
