//! Document-wide font statistics.

use std::collections::HashMap;

use crate::parser::LineRecord;

/// Fallback baseline when a document has no text lines.
const DEFAULT_BODY_SIZE: f32 = 12.0;

/// Font size statistics used as the scale-free baseline for salience.
#[derive(Debug, Clone, Default)]
pub struct FontStatistics {
    /// Median line font size (upper median for even counts)
    pub median_size: f32,
    /// Most frequent font size, rounded to 0.1pt
    pub body_size: f32,
    /// Observed font sizes with frequency, keyed in tenths of a point
    pub size_histogram: HashMap<i32, usize>,
    /// Number of lines observed
    pub line_count: usize,
}

impl FontStatistics {
    /// Compute statistics over all lines of a document.
    pub fn from_lines(lines: &[LineRecord]) -> Self {
        let mut sizes: Vec<f32> = lines.iter().map(|l| l.font_size).collect();
        if sizes.is_empty() {
            return Self {
                median_size: DEFAULT_BODY_SIZE,
                body_size: DEFAULT_BODY_SIZE,
                ..Self::default()
            };
        }

        sizes.sort_by(|a, b| a.total_cmp(b));
        let median_size = sizes[sizes.len() / 2];

        let mut size_histogram = HashMap::new();
        for size in &sizes {
            *size_histogram.entry((size * 10.0).round() as i32).or_insert(0) += 1;
        }
        let body_size = size_histogram
            .iter()
            .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then(kb.cmp(ka)))
            .map(|(k, _)| *k as f32 / 10.0)
            .unwrap_or(median_size);

        Self {
            median_size,
            body_size,
            size_histogram,
            line_count: sizes.len(),
        }
    }

    /// Font size relative to the median baseline.
    pub fn ratio(&self, font_size: f32) -> f32 {
        if self.median_size > 0.0 {
            font_size / self.median_size
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(sizes: &[f32]) -> Vec<LineRecord> {
        sizes
            .iter()
            .map(|s| LineRecord::new("text", *s, false))
            .collect()
    }

    #[test]
    fn test_median_odd() {
        let stats = FontStatistics::from_lines(&lines(&[10.0, 24.0, 12.0, 10.0, 10.0]));
        assert_eq!(stats.median_size, 10.0);
        assert_eq!(stats.body_size, 10.0);
        assert_eq!(stats.line_count, 5);
    }

    #[test]
    fn test_median_even_takes_upper() {
        let stats = FontStatistics::from_lines(&lines(&[10.0, 12.0, 14.0, 16.0]));
        assert_eq!(stats.median_size, 14.0);
    }

    #[test]
    fn test_empty_document_baseline() {
        let stats = FontStatistics::from_lines(&[]);
        assert_eq!(stats.median_size, 12.0);
        assert_eq!(stats.line_count, 0);
    }

    #[test]
    fn test_ratio() {
        let stats = FontStatistics::from_lines(&lines(&[10.0]));
        assert!((stats.ratio(15.0) - 1.5).abs() < 1e-6);
    }
}
