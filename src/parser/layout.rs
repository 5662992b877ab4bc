//! Flattening of page layouts into line records.
//!
//! Each non-empty layout line becomes one [`LineRecord`] carrying the visual
//! signals heading classification needs: font size, boldness, position and
//! the whitespace separating it from the previous line.

use unicode_normalization::UnicodeNormalization;

use crate::error::Result;

use super::backend::{LayoutProvider, FORCE_BOLD_FLAG};
use super::options::{ErrorMode, ParseOptions};
use super::page::{BBox, LayoutSpan, PageLayout};

/// Font name fragments that mark a bold face.
const BOLD_INDICATORS: &[&str] = &[
    "bold", "black", "heavy", "demi", "extrab", "fett", "bd", "strong",
];

/// One visual line of text with the attributes of its first span.
#[derive(Debug, Clone, PartialEq)]
pub struct LineRecord {
    /// Span texts joined with single spaces
    pub text: String,
    /// Font size of the first span
    pub font_size: f32,
    /// Whether the first span is bold
    pub is_bold: bool,
    /// Line box, top-down page coordinates
    pub bbox: BBox,
    /// Page index (0-based)
    pub page_index: usize,
    /// Distance from the previous line's bottom to this line's top (0 for the first line)
    pub vertical_gap_above: f32,
    /// Font name of the first span
    pub font_name: String,
    /// Font flags of the first span
    pub font_flags: u32,
}

impl LineRecord {
    /// Create a line record with no font metadata beyond size and weight.
    pub fn new(text: impl Into<String>, font_size: f32, is_bold: bool) -> Self {
        Self {
            text: text.into(),
            font_size,
            is_bold,
            bbox: BBox::default(),
            page_index: 0,
            vertical_gap_above: 0.0,
            font_name: String::new(),
            font_flags: 0,
        }
    }

    /// Set the page index.
    pub fn on_page(mut self, page_index: usize) -> Self {
        self.page_index = page_index;
        self
    }

    /// Set the line box.
    pub fn with_bbox(mut self, bbox: BBox) -> Self {
        self.bbox = bbox;
        self
    }

    /// Set the whitespace above the line.
    pub fn with_gap(mut self, gap: f32) -> Self {
        self.vertical_gap_above = gap;
        self
    }

    /// Top edge of the line.
    pub fn top(&self) -> f32 {
        self.bbox.y0
    }

    /// Number of whitespace-separated words.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Whether a span is set in a bold face, judged by font flags and font name.
pub fn is_bold_span(span: &LayoutSpan) -> bool {
    if span.font_flags & FORCE_BOLD_FLAG != 0 {
        return true;
    }
    let name = span.font_name.to_lowercase();
    BOLD_INDICATORS.iter().any(|ind| name.contains(ind))
}

/// NFC-normalize, collapse whitespace runs to single spaces and trim.
pub fn normalize_text(text: &str) -> String {
    let composed: String = text.nfc().collect();
    composed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Turns page layouts into [`LineRecord`]s.
#[derive(Debug, Clone, Default)]
pub struct LineExtractor {
    options: ParseOptions,
}

impl LineExtractor {
    /// Create an extractor with the given options.
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Line records of one page in reading order.
    pub fn extract_page(&self, page: &PageLayout) -> Vec<LineRecord> {
        let mut records = Vec::new();
        let mut prev_bottom: Option<f32> = None;

        for line in page.lines() {
            let Some(first) = line.spans.first() else {
                continue;
            };
            let text = line.text();
            if text.is_empty() {
                continue;
            }

            let gap = prev_bottom
                .map(|bottom| (line.bbox.y0 - bottom).max(0.0))
                .unwrap_or(0.0);

            records.push(LineRecord {
                text,
                font_size: first.font_size,
                is_bold: is_bold_span(first),
                bbox: line.bbox,
                page_index: page.index,
                vertical_gap_above: gap,
                font_name: first.font_name.clone(),
                font_flags: first.font_flags,
            });
            prev_bottom = Some(line.bbox.y1);
        }

        records
    }

    /// Line records of every page of a document.
    ///
    /// In lenient mode an unreadable page is logged and contributes no lines.
    pub fn extract_document(&self, provider: &dyn LayoutProvider) -> Result<Vec<LineRecord>> {
        let mut records = Vec::new();
        for index in 0..provider.page_count() {
            match provider.page_layout(index) {
                Ok(page) => records.extend(self.extract_page(&page)),
                Err(e) => {
                    if self.options.error_mode == ErrorMode::Strict {
                        return Err(e);
                    }
                    log::warn!("Failed to read layout of page {}: {}", index + 1, e);
                }
            }
        }
        Ok(records)
    }
}
