//! Heading anchor ids
//!
//! Anchor ids must be stable across re-renders and processes, and unique
//! within one document. Each id is built from the heading's slug plus a short
//! content hash of that slug:
//!
//! ```text
//! "Getting Started"  →  slug "getting-started"  →  "heading-getting-started-<hash>"
//! ```
//!
//! `<hash>` is the first six base-36 digits of the slug's blake3 hash, so the
//! same heading text always yields the same id. A repeated id within one
//! document gets an occurrence suffix (`-1`, `-2`, ...), in document order.
//! Headings whose text produces an empty slug get `heading-<hash>`.

use rustc_hash::FxHashMap;

use crate::hash::{StableHasher, to_base36};

/// Prefix shared by every generated anchor id.
pub const ID_PREFIX: &str = "heading";

/// Number of base-36 digits kept from the slug hash.
const HASH_LEN: usize = 6;

/// Lower-case, collapse whitespace runs into single hyphens, and trim
/// leading/trailing hyphens.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for c in text.trim().chars() {
        if c.is_whitespace() {
            pending_hyphen = true;
            continue;
        }
        if pending_hyphen {
            slug.push('-');
            pending_hyphen = false;
        }
        slug.extend(c.to_lowercase());
    }
    slug.trim_matches('-').to_string()
}

/// Stable short hash of a slug.
fn slug_hash(slug: &str) -> String {
    let digest = StableHasher::new()
        .update_str(ID_PREFIX)
        .update_str(slug)
        .finish();
    let mut hash = to_base36(digest);
    hash.truncate(HASH_LEN);
    hash
}

/// The id a heading gets on its first occurrence.
pub fn heading_id(text: &str) -> String {
    let slug = slugify(text);
    let hash = slug_hash(&slug);
    if slug.is_empty() {
        format!("{ID_PREFIX}-{hash}")
    } else {
        format!("{ID_PREFIX}-{slug}-{hash}")
    }
}

// =============================================================================
// HeadingIds
// =============================================================================

/// Per-document id allocator.
///
/// Create one per rendered document and feed it headings in document order;
/// the HTML renderer and [`crate::extract::extract_headings`] both do this,
/// so they always agree.
#[derive(Debug, Default)]
pub struct HeadingIds {
    seen: FxHashMap<String, usize>,
}

impl HeadingIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the id for the next heading with this text.
    pub fn next_id(&mut self, text: &str) -> String {
        let base = heading_id(text);
        let occurrence = self.seen.entry(base.clone()).or_insert(0);
        let id = match *occurrence {
            0 => base,
            n => format!("{base}-{n}"),
        };
        *occurrence += 1;
        id
    }

    /// Number of distinct base ids allocated so far.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
