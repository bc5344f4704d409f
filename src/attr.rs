//! HTML attributes and URL classification for the renderer
//!
//! - Direct `Vec<(&'static str, String)>` for attribute lists
//! - `LinkType` classifies link targets (external links get `target`/`rel`)
//! - `safe_url` blanks URLs whose scheme is not allowed

/// Element attributes as ordered name/value pairs.
///
/// Names are always crate-chosen literals; values are escaped on output.
pub type Attrs = Vec<(&'static str, String)>;

/// Extension trait for attribute operations on Attrs
pub trait AttrsExt {
    /// Get an attribute value by name
    fn get_attr(&self, name: &str) -> Option<&str>;

    /// Set an attribute value (insert or update)
    fn set_attr(&mut self, name: &'static str, value: impl Into<String>);

    /// Append `class` to the `class` attribute, space-separated
    fn add_class(&mut self, class: impl AsRef<str>);
}

impl AttrsExt for Attrs {
    fn get_attr(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    fn set_attr(&mut self, name: &'static str, value: impl Into<String>) {
        let value = value.into();
        if let Some(attr) = self.iter_mut().find(|(k, _)| *k == name) {
            attr.1 = value;
        } else {
            self.push((name, value));
        }
    }

    fn add_class(&mut self, class: impl AsRef<str>) {
        let class = class.as_ref();
        match self.iter_mut().find(|(k, _)| *k == "class") {
            Some((_, existing)) => {
                existing.push(' ');
                existing.push_str(class);
            }
            None => self.push(("class", class.to_string())),
        }
    }
}

// =============================================================================
// LinkType
// =============================================================================

/// Link type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkType {
    #[default]
    None,
    Absolute,  // /path
    Relative,  // ./file
    Fragment,  // #anchor
    External,  // https://...
    Email,     // mailto:...
}

impl LinkType {
    /// Infer link type from href string
    pub fn from_href(href: &str) -> Self {
        let href = href.trim();
        if href.is_empty() {
            return Self::None;
        }
        if starts_with_ignore_case(href, "http://")
            || starts_with_ignore_case(href, "https://")
            || href.starts_with("//")
        {
            Self::External
        } else if starts_with_ignore_case(href, "mailto:") {
            Self::Email
        } else if href.starts_with('/') {
            Self::Absolute
        } else if href.starts_with('#') {
            Self::Fragment
        } else {
            Self::Relative
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, Self::External)
    }
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

// =============================================================================
// URL safety
// =============================================================================

/// Schemes a link may point at.
pub const LINK_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// Schemes an image may load from.
pub const IMAGE_SCHEMES: &[&str] = &["http", "https"];

/// Scheme of `url`, if it has one.
///
/// Follows the URL grammar: a letter, then letters, digits, `+`, `-` or `.`,
/// terminated by `:`. Anything else (paths, fragments, `//host`) is
/// scheme-less.
pub fn url_scheme(url: &str) -> Option<&str> {
    let url = url.trim_start();
    let colon = url.find(':')?;
    let scheme = &url[..colon];
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    chars
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        .then_some(scheme)
}

/// `url` unchanged if it is scheme-less or uses an allowed scheme, else "".
///
/// Whitespace and control characters are stripped before the scheme check,
/// so `java\tscript:` is caught.
pub fn safe_url<'a>(url: &'a str, allowed: &[&str]) -> &'a str {
    let compact: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    match url_scheme(&compact) {
        None => url,
        Some(scheme) if allowed.iter().any(|a| a.eq_ignore_ascii_case(scheme)) => url,
        Some(_) => "",
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attrs_operations() {
        let mut attrs: Attrs = Vec::new();

        attrs.set_attr("id", "main");
        attrs.add_class("a");
        attrs.add_class("b");
        assert_eq!(attrs.get_attr("id"), Some("main"));
        assert_eq!(attrs.get_attr("class"), Some("a b"));
        assert_eq!(attrs.get_attr("href"), None);

        attrs.set_attr("id", "other");
        assert_eq!(attrs.get_attr("id"), Some("other"));
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn test_link_type() {
        assert_eq!(LinkType::from_href("https://example.com"), LinkType::External);
        assert_eq!(LinkType::from_href("HTTP://EXAMPLE.COM"), LinkType::External);
        assert_eq!(LinkType::from_href("//cdn.example.com/x"), LinkType::External);
        assert_eq!(LinkType::from_href("/about"), LinkType::Absolute);
        assert_eq!(LinkType::from_href("#section"), LinkType::Fragment);
        assert_eq!(LinkType::from_href("./file"), LinkType::Relative);
        assert_eq!(LinkType::from_href("mailto:a@b.com"), LinkType::Email);
        assert_eq!(LinkType::from_href(""), LinkType::None);
    }

    #[test]
    fn test_url_scheme() {
        assert_eq!(url_scheme("https://x"), Some("https"));
        assert_eq!(url_scheme("web+app:x"), Some("web+app"));
        assert_eq!(url_scheme("/a:b"), None);
        assert_eq!(url_scheme("docs/page"), None);
        assert_eq!(url_scheme("1abc:x"), None);
    }

    #[test]
    fn test_safe_url() {
        assert_eq!(safe_url("https://x.dev", LINK_SCHEMES), "https://x.dev");
        assert_eq!(safe_url("tel:+123", LINK_SCHEMES), "tel:+123");
        assert_eq!(safe_url("./page#a", LINK_SCHEMES), "./page#a");
        assert_eq!(safe_url("javascript:alert(1)", LINK_SCHEMES), "");
        assert_eq!(safe_url("JaVa\tScript:alert(1)", LINK_SCHEMES), "");
        assert_eq!(safe_url("mailto:a@b", IMAGE_SCHEMES), "");
        assert_eq!(safe_url("data:image/png;base64,AAAA", IMAGE_SCHEMES), "");
    }
}
