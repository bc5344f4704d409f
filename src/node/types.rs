//! Node kind tags and column alignment.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MdError;

// =============================================================================
// NodeKind
// =============================================================================

/// Discriminant of the closed node schema.
///
/// `as_str()` returns the serialized `type` tag of each kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Root,
    Paragraph,
    Heading,
    Blockquote,
    List,
    ListItem,
    Code,
    CodeBlock,
    Emphasis,
    Strong,
    Mark,
    Link,
    Image,
    Text,
    ThematicBreak,
    Html,
    Table,
    TableRow,
    TableCell,
    Math,
    InlineMath,
    Yaml,
}

impl NodeKind {
    /// Serialized tag name (camelCase, mdast style).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Paragraph => "paragraph",
            Self::Heading => "heading",
            Self::Blockquote => "blockquote",
            Self::List => "list",
            Self::ListItem => "listItem",
            Self::Code => "code",
            Self::CodeBlock => "codeBlock",
            Self::Emphasis => "emphasis",
            Self::Strong => "strong",
            Self::Mark => "mark",
            Self::Link => "link",
            Self::Image => "image",
            Self::Text => "text",
            Self::ThematicBreak => "thematicBreak",
            Self::Html => "html",
            Self::Table => "table",
            Self::TableRow => "tableRow",
            Self::TableCell => "tableCell",
            Self::Math => "math",
            Self::InlineMath => "inlineMath",
            Self::Yaml => "yaml",
        }
    }

    /// Phrasing content that may appear inside a paragraph.
    ///
    /// `html` counts as inline because raw HTML may occur in running text.
    pub const fn is_inline(self) -> bool {
        matches!(
            self,
            Self::Code
                | Self::Emphasis
                | Self::Strong
                | Self::Mark
                | Self::Link
                | Self::Image
                | Self::Text
                | Self::Html
                | Self::InlineMath
        )
    }

    /// Line-level content (everything that is not inline, except table
    /// parts and list items which only live inside their containers).
    pub const fn is_block(self) -> bool {
        matches!(
            self,
            Self::Root
                | Self::Paragraph
                | Self::Heading
                | Self::Blockquote
                | Self::List
                | Self::CodeBlock
                | Self::ThematicBreak
                | Self::Html
                | Self::Table
                | Self::Math
                | Self::Yaml
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Align
// =============================================================================

/// Table column alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
    #[default]
    None,
}

impl Align {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::None => "none",
        }
    }

    /// `Some(self)` unless this is `Align::None`.
    pub const fn explicit(self) -> Option<Self> {
        match self {
            Self::None => None,
            other => Some(other),
        }
    }
}

impl FromStr for Align {
    type Err = MdError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            "none" | "" => Ok(Self::None),
            other => Err(MdError::invalid_config(
                "align",
                format!("unrecognized alignment token `{other}`"),
            )),
        }
    }
}

impl fmt::Display for Align {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
