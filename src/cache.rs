//! Shared parse cache.
//!
//! Opt-in memoization of parse and render results for callers that see the
//! same documents repeatedly (watch mode, preview servers). Entries are keyed
//! on the exact input bytes plus the full pipeline fingerprint, so the same
//! text under different options never shares an entry. Failed parses are
//! never cached.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::MdResult;
use crate::hash::StableHasher;
use crate::node::Node;
use crate::transform::Pipeline;

// =============================================================================
// Cache Key
// =============================================================================

/// blake3 digest of (pipeline fingerprint, input).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    pub fn new(pipeline: &Pipeline, markdown: &str) -> Self {
        Self(
            StableHasher::new()
                .update_u64(pipeline.fingerprint())
                .update_str(markdown)
                .finish_bytes(),
        )
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.0[..8] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

// =============================================================================
// Shared cache
// =============================================================================

#[derive(Debug, Default)]
struct Entries {
    ast: FxHashMap<CacheKey, Arc<Node>>,
    html: FxHashMap<CacheKey, Arc<str>>,
}

/// Thread-safe shared parse cache.
///
/// Uses `parking_lot::RwLock` for better performance under contention.
/// Cloning shares the underlying storage.
#[derive(Debug, Clone, Default)]
pub struct SharedParseCache {
    inner: Arc<RwLock<Entries>>,
}

impl SharedParseCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse through `pipeline`, reusing a previous result for the same
    /// input and configuration.
    pub fn parse(&self, pipeline: &Pipeline, markdown: &str) -> MdResult<Arc<Node>> {
        let key = CacheKey::new(pipeline, markdown);
        if let Some(hit) = self.inner.read().ast.get(&key) {
            return Ok(Arc::clone(hit));
        }

        let node = Arc::new(pipeline.parse(markdown)?);
        self.inner.write().ast.insert(key, Arc::clone(&node));
        Ok(node)
    }

    /// Render through `pipeline`, reusing a previous result for the same
    /// input and configuration.
    pub fn render_to_html(&self, pipeline: &Pipeline, markdown: &str) -> MdResult<Arc<str>> {
        let key = CacheKey::new(pipeline, markdown);
        if let Some(hit) = self.inner.read().html.get(&key) {
            return Ok(Arc::clone(hit));
        }

        let node = self.parse(pipeline, markdown)?;
        let html: Arc<str> = Arc::from(pipeline.render_node(&node));
        self.inner.write().html.insert(key, Arc::clone(&html));
        Ok(html)
    }

    /// Check if a parsed tree is cached for this key.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.inner.read().ast.contains_key(key)
    }

    /// Drop both cached forms of one entry.
    pub fn remove(&self, key: &CacheKey) {
        let mut entries = self.inner.write();
        entries.ast.remove(key);
        entries.html.remove(key);
    }

    /// Get the number of cached trees.
    pub fn len(&self) -> usize {
        self.inner.read().ast.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all entries from the cache.
    pub fn clear(&self) {
        let mut entries = self.inner.write();
        entries.ast.clear();
        entries.html.clear();
    }
}

// =============================================================================
// Tests
// =============================================================================
