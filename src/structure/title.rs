//! Title detection from the first page.

use crate::parser::LineRecord;

use super::config::TitleConfig;

/// Locates a document title among the first page's lines.
#[derive(Debug, Clone, Default)]
pub struct TitleExtractor {
    config: TitleConfig,
}

impl TitleExtractor {
    pub fn new(config: TitleConfig) -> Self {
        Self { config }
    }

    /// Title of the document, or an empty string when nothing looks like one.
    ///
    /// Only lines on page index 0 are considered. `page_height` is the height
    /// of that page in the same units as the line boxes.
    pub fn extract(&self, lines: &[LineRecord], page_height: f32) -> String {
        let mut candidates: Vec<&LineRecord> = lines
            .iter()
            .filter(|line| line.page_index == 0 && self.is_candidate(line, page_height))
            .collect();

        if candidates.is_empty() {
            return String::new();
        }
        candidates.sort_by(|a, b| a.top().total_cmp(&b.top()));

        let max_size = candidates
            .iter()
            .map(|c| c.font_size)
            .fold(f32::MIN, f32::max);
        let tier_floor = max_size * self.config.tier_fraction;
        let band_limit = page_height * self.config.band_fraction;

        let parts: Vec<&str> = candidates
            .iter()
            .filter(|c| c.font_size >= tier_floor && c.top() < band_limit)
            .map(|c| c.text.trim())
            .collect();

        if parts.is_empty() {
            candidates[0].text.trim().to_string()
        } else {
            parts.join(" ")
        }
    }

    fn is_candidate(&self, line: &LineRecord, page_height: f32) -> bool {
        !line.text.trim().is_empty()
            && line.top() <= page_height * self.config.max_top_fraction
            && line.word_count() <= self.config.max_words
            && (line.is_bold || line.font_size >= self.config.min_font_size)
    }
}
