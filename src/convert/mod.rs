//! Source converters: Markdown text to the generic syntax tree.
//!
//! | Stage | Module | Function |
//! |-------|--------|----------|
//! | Tokenize + lower to mdast shape | [`markdown`] | [`tokenize()`] |
//! | `==mark==` post-pass | [`markers`] | [`split_marks()`] |
//!
//! The converter only needs to produce a valid [`SyntaxNode`](crate::syntax::SyntaxNode).
//! The normalizer turns that into the closed AST.

pub mod markdown;
pub mod markers;

pub use self::markdown::{tokenize, tokenize_with_limit};
pub use self::markers::split_marks;
