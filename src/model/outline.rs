//! Outline types: heading levels, outline entries and the per-document structure artifact.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hierarchical depth of a heading.
///
/// Serialized as `"H1"` .. `"H4"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
}

impl HeadingLevel {
    /// Numeric depth, 1 for `H1` through 4 for `H4`.
    pub fn depth(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
            HeadingLevel::H4 => 4,
        }
    }

    /// Level for a numeric depth, if one exists.
    pub fn from_depth(depth: u8) -> Option<Self> {
        match depth {
            1 => Some(HeadingLevel::H1),
            2 => Some(HeadingLevel::H2),
            3 => Some(HeadingLevel::H3),
            4 => Some(HeadingLevel::H4),
            _ => None,
        }
    }

    /// The level one step deeper, saturating at `H4`.
    pub fn deeper(self) -> Self {
        Self::from_depth(self.depth() + 1).unwrap_or(HeadingLevel::H4)
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.depth())
    }
}

/// A frozen outline entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// Heading level
    pub level: HeadingLevel,

    /// Normalized heading text
    pub text: String,

    /// Page index (0-based)
    pub page: u32,
}

impl OutlineEntry {
    /// Create a new outline entry.
    pub fn new(level: HeadingLevel, text: impl Into<String>, page: u32) -> Self {
        Self {
            level,
            text: text.into(),
            page,
        }
    }
}

/// Recovered structure of one document; also the persisted artifact format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentStructure {
    /// Document title (possibly empty)
    #[serde(default)]
    pub title: String,

    /// Headings in reading order
    #[serde(default)]
    pub outline: Vec<OutlineEntry>,

    /// Set when extraction failed and the structure is empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DocumentStructure {
    /// Create a structure from a title and an outline.
    pub fn new(title: impl Into<String>, outline: Vec<OutlineEntry>) -> Self {
        Self {
            title: title.into(),
            outline,
            error: None,
        }
    }

    /// The empty structure recorded for a document whose extraction failed.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            outline: Vec::new(),
            error: Some(message.into()),
        }
    }

    /// Whether this structure records a failure.
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}
