//! Tree transforms and the parse pipeline.
//!
//! # Module Structure
//!
//! - `Transform` - Core trait for fallible tree-to-tree steps
//! - `Normalizer` - generic `SyntaxNode` tree → closed `Node` tree
//! - `Pipeline` - tokenize → normalize → render, configured once
//!
//! # Example
//!
//! ```ignore
//! use tola_mdast::transform::{Pipeline, Policy};
//!
//! let pipeline = Pipeline::new().with_policy(Policy::Lenient);
//! let root = pipeline.parse("# Title\n")?;
//! let html = pipeline.render_node(&root);
//! ```

mod core;
mod normalizer;
mod pipeline;

pub use self::core::Transform;
pub use normalizer::{Normalizer, Policy};
pub use pipeline::{Pipeline, parse_markdown, render_markdown_to_html};
