//! Error types for tola-mdast.
//!
//! One enum covers the whole pipeline: tokenizing, normalization, math
//! typesetting, configuration and snapshot (de)serialization.

use thiserror::Error;

/// Errors that can occur while parsing, normalizing or rendering Markdown.
#[derive(Debug, Error)]
pub enum MdError {
    /// The generic tree contained a node kind outside the closed schema
    #[error("unsupported node kind `{kind}`")]
    UnsupportedNodeKind {
        /// Kind string reported by the tokenizer
        kind: String,
    },

    /// A node carried a missing or ill-typed attribute
    #[error("invalid `{field}` on `{kind}` node: {reason}")]
    InvalidField {
        /// Generic kind of the offending node
        kind: String,
        /// Attribute name
        field: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// Nesting exceeded the normalizer's depth limit
    #[error("document nesting exceeds the limit of {limit} levels")]
    TooDeep {
        /// Configured maximum depth
        limit: usize,
    },

    /// A single math expression failed to typeset
    #[error("malformed math `{tex}`: {reason}")]
    MalformedMath {
        /// Raw TeX source of the expression
        tex: String,
        /// Typesetter message
        reason: String,
    },

    /// A configuration value is outside its documented domain
    #[error("invalid configuration for `{field}`: {reason}")]
    InvalidConfiguration {
        /// Option name
        field: String,
        /// Why the value was rejected
        reason: String,
    },

    /// The underlying tokenizer rejected the input
    #[error("tokenizer error: {0}")]
    Tokenize(String),

    /// Snapshot was written with an incompatible schema version
    #[error("schema version mismatch: expected v{expected}, found v{found}")]
    VersionMismatch {
        /// Schema version this build understands
        expected: u32,
        /// Version recorded in the snapshot
        found: u32,
    },

    /// Serialization/deserialization failed
    #[error("serialization error: {0}")]
    Serialize(String),
}

/// Result type alias for tola-mdast operations.
pub type MdResult<T> = Result<T, MdError>;

impl MdError {
    /// Create an unsupported-kind error.
    pub fn unsupported(kind: impl Into<String>) -> Self {
        Self::UnsupportedNodeKind { kind: kind.into() }
    }

    /// Create an invalid-field error.
    pub fn invalid_field(
        kind: impl Into<String>,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            kind: kind.into(),
            field,
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a serialization error from any error type.
    pub fn serialize(err: impl std::error::Error) -> Self {
        Self::Serialize(err.to_string())
    }
}

impl From<serde_json::Error> for MdError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialize(err)
    }
}
