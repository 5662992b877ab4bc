//! Page layout tree: blocks → lines → spans, in top-down page coordinates.

use serde::{Deserialize, Serialize};

/// Axis-aligned box; `y` grows downward from the top of the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    /// Create a new box.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

/// A run of text sharing one font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSpan {
    /// The text content
    pub text: String,
    /// Effective font size in points
    pub font_size: f32,
    /// Base font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Font descriptor flags (`/Flags`), 0 when unknown
    pub font_flags: u32,
    /// Position on the page
    pub bbox: BBox,
}

impl LayoutSpan {
    /// Create a span with no font flags.
    pub fn new(text: impl Into<String>, font_size: f32, font_name: impl Into<String>, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            font_size,
            font_name: font_name.into(),
            font_flags: 0,
            bbox,
        }
    }

    /// Set the font descriptor flags.
    pub fn with_flags(mut self, flags: u32) -> Self {
        self.font_flags = flags;
        self
    }
}

/// Spans sharing a baseline, sorted left to right.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutLine {
    pub bbox: BBox,
    pub spans: Vec<LayoutSpan>,
}

impl LayoutLine {
    /// Build a line whose box covers all its spans.
    pub fn from_spans(spans: Vec<LayoutSpan>) -> Self {
        let bbox = spans
            .iter()
            .map(|s| s.bbox)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();
        Self { bbox, spans }
    }

    /// Span texts joined with single spaces.
    pub fn text(&self) -> String {
        self.spans
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A group of consecutive lines (paragraph-like).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutBlock {
    pub lines: Vec<LayoutLine>,
}

/// Layout of a single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    /// Page index (0-based)
    pub index: usize,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Blocks in reading order
    pub blocks: Vec<LayoutBlock>,
}

impl PageLayout {
    /// Create an empty page.
    pub fn new(index: usize, width: f32, height: f32) -> Self {
        Self {
            index,
            width,
            height,
            blocks: Vec::new(),
        }
    }

    /// Create an empty US Letter page.
    pub fn letter(index: usize) -> Self {
        Self::new(index, 612.0, 792.0)
    }

    /// Add a block to the page.
    pub fn add_block(&mut self, block: LayoutBlock) {
        self.blocks.push(block);
    }

    /// All lines in reading order.
    pub fn lines(&self) -> impl Iterator<Item = &LayoutLine> {
        self.blocks.iter().flat_map(|b| b.lines.iter())
    }

    /// Plain text of the page: one line of text per layout line.
    pub fn plain_text(&self) -> String {
        self.lines()
            .map(|l| l.text())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
