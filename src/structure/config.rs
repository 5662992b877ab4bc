//! Heuristic thresholds for heading and title detection.

/// Thresholds used by the heading classifier.
///
/// Ratios are relative to the document's median font size.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingConfig {
    /// A non-bold line must reach this ratio to count as visually salient
    pub bold_or_large_ratio: f32,

    /// Minimum whitespace above a visually salient line, in points
    pub medium_whitespace: f32,

    /// Lines with more words are never visual headings
    pub max_heading_words: usize,

    /// Bold lines at or above this ratio are `H1`
    pub h1_ratio: f32,

    /// Bold lines at or above this ratio are `H2`
    pub h2_ratio: f32,

    /// Lines at or above this ratio (or bold) are `H3`
    pub h3_ratio: f32,

    /// All-uppercase lines must be longer than this to be headings
    pub uppercase_min_chars: usize,

    /// All-uppercase lines at or above this ratio are `H1`, below it `H2`
    pub uppercase_h1_ratio: f32,
}

impl HeadingConfig {
    /// Create a config with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the salience ratio for non-bold lines.
    pub fn with_bold_or_large_ratio(mut self, ratio: f32) -> Self {
        self.bold_or_large_ratio = ratio;
        self
    }

    /// Set the whitespace threshold.
    pub fn with_medium_whitespace(mut self, points: f32) -> Self {
        self.medium_whitespace = points;
        self
    }

    /// Set the maximum heading length in words.
    pub fn with_max_heading_words(mut self, words: usize) -> Self {
        self.max_heading_words = words;
        self
    }

    /// Set the `H1`/`H2`/`H3` ratio tiers.
    pub fn with_level_ratios(mut self, h1: f32, h2: f32, h3: f32) -> Self {
        self.h1_ratio = h1;
        self.h2_ratio = h2;
        self.h3_ratio = h3;
        self
    }
}

impl Default for HeadingConfig {
    fn default() -> Self {
        Self {
            bold_or_large_ratio: 1.2,
            medium_whitespace: 6.0,
            max_heading_words: 30,
            h1_ratio: 1.5,
            h2_ratio: 1.2,
            h3_ratio: 1.1,
            uppercase_min_chars: 5,
            uppercase_h1_ratio: 1.2,
        }
    }
}

/// Thresholds used by the title extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleConfig {
    /// Candidates must start within this fraction of the page height
    pub max_top_fraction: f32,

    /// Candidates may have at most this many words
    pub max_words: usize,

    /// Non-bold candidates need at least this font size
    pub min_font_size: f32,

    /// Fraction of the largest candidate size that still counts as the title tier
    pub tier_fraction: f32,

    /// Tier lines above this fraction of the page height are joined into the title
    pub band_fraction: f32,
}

impl TitleConfig {
    /// Create a config with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum font size for non-bold candidates.
    pub fn with_min_font_size(mut self, size: f32) -> Self {
        self.min_font_size = size;
        self
    }

    /// Set the maximum candidate length in words.
    pub fn with_max_words(mut self, words: usize) -> Self {
        self.max_words = words;
        self
    }
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            max_top_fraction: 0.4,
            max_words: 15,
            min_font_size: 14.0,
            tier_fraction: 0.9,
            band_fraction: 0.25,
        }
    }
}
