//! Heuristic structure extraction: title and leveled outline.
//!
//! Flow for one document:
//!
//! 1. Flatten page layouts into [`LineRecord`]s
//! 2. Compute [`FontStatistics`] as the salience baseline
//! 3. Classify each normalized line with [`HeadingClassifier`], keeping the
//!    first occurrence of each heading text
//! 4. Sort candidates by page and vertical position
//! 5. Fold them through the refiner into the final outline
//!
//! The title is detected independently from the first page.

mod classify;
mod config;
mod refine;
mod stats;
mod title;

pub use classify::{
    is_all_uppercase, Classification, HeadingClassifier, HeadingRule, LexiconRule, LineContext,
    ListItemRule, NumberingRule, UppercaseRule, Verdict, VisualRule,
};
pub use config::{HeadingConfig, TitleConfig};
pub use refine::{refine, refine_level, HeadingCandidate};
pub use stats::FontStatistics;
pub use title::TitleExtractor;

use std::collections::HashSet;
use std::path::Path;

use crate::error::Result;
use crate::model::{DocumentStructure, OutlineEntry};
use crate::parser::{normalize_text, LayoutProvider, LineExtractor, LineRecord, LopdfProvider, ParseOptions};

/// Extracts [`DocumentStructure`]s from layout providers.
#[derive(Debug, Default)]
pub struct StructureExtractor {
    classifier: HeadingClassifier,
    titles: TitleExtractor,
    lines: LineExtractor,
}

impl StructureExtractor {
    /// Create an extractor with the given thresholds.
    pub fn new(heading: HeadingConfig, title: TitleConfig) -> Self {
        Self {
            classifier: HeadingClassifier::new(heading),
            titles: TitleExtractor::new(title),
            lines: LineExtractor::default(),
        }
    }

    /// Set the page-level error handling.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.lines = LineExtractor::new(options);
        self
    }

    /// Extract title and outline from a layout provider.
    pub fn extract(&self, provider: &dyn LayoutProvider) -> Result<DocumentStructure> {
        let lines = self.lines.extract_document(provider)?;
        let outline = self.outline(&lines);

        let title = if provider.page_count() == 0 {
            String::new()
        } else {
            match provider.page_height(0) {
                Ok(height) => self.titles.extract(&lines, height),
                Err(e) => {
                    log::warn!("Cannot read first page size, no title: {}", e);
                    String::new()
                }
            }
        };

        Ok(DocumentStructure::new(title, outline))
    }

    /// Extract the structure of a PDF file.
    ///
    /// Never fails: any error is logged and turned into a failed structure
    /// carrying the error message.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> DocumentStructure {
        let path = path.as_ref();
        let result = LopdfProvider::open(path).and_then(|provider| self.extract(&provider));
        match result {
            Ok(structure) => {
                log::debug!(
                    "{}: title '{}', {} headings",
                    path.display(),
                    structure.title,
                    structure.outline.len()
                );
                structure
            }
            Err(e) => {
                log::error!("Failed to extract structure of {}: {}", path.display(), e);
                DocumentStructure::failed(e.to_string())
            }
        }
    }

    /// Outline of a document from its line records.
    pub fn outline(&self, lines: &[LineRecord]) -> Vec<OutlineEntry> {
        let stats = FontStatistics::from_lines(lines);
        log::debug!(
            "Median font size {:.1}pt (body {:.1}pt) over {} lines",
            stats.median_size,
            stats.body_size,
            stats.line_count
        );

        let mut seen: HashSet<String> = HashSet::new();
        let mut candidates = Vec::new();

        for line in lines {
            let text = normalize_text(&line.text);
            if text.is_empty() || seen.contains(&text) {
                continue;
            }
            let Some(classification) = self.classifier.classify(&text, line, &stats) else {
                continue;
            };

            seen.insert(text.clone());
            candidates.push(HeadingCandidate {
                text,
                level: classification.level,
                page: line.page_index as u32,
                y: line.top(),
                font_size: line.font_size,
                is_pattern_based: classification.is_pattern_based,
            });
        }

        candidates.sort_by(|a, b| a.page.cmp(&b.page).then(a.y.total_cmp(&b.y)));
        refine(candidates)
    }
}

/// Extract the structure of a document from any layout provider.
pub fn extract_structure(
    provider: &dyn LayoutProvider,
    heading: &HeadingConfig,
    title: &TitleConfig,
) -> Result<DocumentStructure> {
    StructureExtractor::new(heading.clone(), title.clone()).extract(provider)
}

/// Extract the structure of a PDF file; failures yield a failed structure.
pub fn extract_structure_file<P: AsRef<Path>>(
    path: P,
    heading: &HeadingConfig,
    title: &TitleConfig,
) -> DocumentStructure {
    StructureExtractor::new(heading.clone(), title.clone()).extract_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HeadingLevel;
    use crate::parser::{BBox, LayoutBlock, LayoutLine, LayoutSpan, PageLayout};

    fn push_line(page: &mut PageLayout, text: &str, size: f32, font: &str, top: f32) {
        let bbox = BBox::new(72.0, top, 400.0, top + size);
        page.add_block(LayoutBlock {
            lines: vec![LayoutLine::from_spans(vec![LayoutSpan::new(
                text, size, font, bbox,
            )])],
        });
    }

    fn sample_document() -> Vec<PageLayout> {
        let mut first = PageLayout::letter(0);
        push_line(&mut first, "Field Guide", 24.0, "Helvetica-Bold", 60.0);
        push_line(&mut first, "1. Introduction", 16.0, "Helvetica-Bold", 200.0);
        push_line(&mut first, "Birds are everywhere in this region.", 10.0, "Helvetica", 230.0);
        push_line(&mut first, "They migrate in spring and autumn.", 10.0, "Helvetica", 244.0);
        push_line(&mut first, "Habitats", 10.0, "Helvetica-Bold", 280.0);
        push_line(&mut first, "Wetlands host most species.", 10.0, "Helvetica", 300.0);

        let mut second = PageLayout::letter(1);
        push_line(&mut second, "2.1 Scope", 11.0, "Helvetica", 80.0);
        push_line(&mut second, "The guide covers coastal areas.", 10.0, "Helvetica", 100.0);
        push_line(&mut second, "Habitats", 10.0, "Helvetica-Bold", 140.0);
        push_line(&mut second, "References", 10.0, "Helvetica", 400.0);

        vec![first, second]
    }

    #[test]
    fn test_extract_sample_document() {
        let structure = extract_structure(
            &sample_document(),
            &HeadingConfig::default(),
            &TitleConfig::default(),
        )
        .unwrap();

        assert_eq!(structure.title, "Field Guide");
        let texts: Vec<&str> = structure.outline.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["1. Introduction", "Habitats", "2.1 Scope", "References"]
        );

        let levels: Vec<HeadingLevel> = structure.outline.iter().map(|e| e.level).collect();
        assert_eq!(
            levels,
            vec![HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H2, HeadingLevel::H1]
        );
        assert_eq!(structure.outline[0].page, 0);
        assert_eq!(structure.outline[2].page, 1);
    }

    #[test]
    fn test_outline_is_deduplicated_and_adjacent() {
        let structure = StructureExtractor::default()
            .extract(&sample_document())
            .unwrap();

        let mut seen = HashSet::new();
        for entry in &structure.outline {
            assert!(seen.insert(entry.text.clone()), "duplicate {}", entry.text);
        }
        for pair in structure.outline.windows(2) {
            assert!(pair[1].level.depth() <= pair[0].level.depth() + 1);
        }
    }

    #[test]
    fn test_candidates_sorted_by_position() {
        let lines = vec![
            LineRecord::new("2. Later", 10.0, false)
                .on_page(1)
                .with_bbox(BBox::new(0.0, 50.0, 100.0, 60.0)),
            LineRecord::new("1. Earlier", 10.0, false)
                .on_page(0)
                .with_bbox(BBox::new(0.0, 300.0, 100.0, 310.0)),
            LineRecord::new("Appendix A: Data", 10.0, false)
                .on_page(0)
                .with_bbox(BBox::new(0.0, 100.0, 100.0, 110.0)),
        ];
        let outline = StructureExtractor::default().outline(&lines);
        let texts: Vec<&str> = outline.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["Appendix A: Data", "1. Earlier", "2. Later"]);
    }

    #[test]
    fn test_empty_document() {
        let structure = StructureExtractor::default()
            .extract(&Vec::<PageLayout>::new())
            .unwrap();
        assert_eq!(structure.title, "");
        assert!(structure.outline.is_empty());
    }

    #[test]
    fn test_extract_file_missing_yields_failed_structure() {
        let structure = extract_structure_file(
            "/nonexistent/path/missing.pdf",
            &HeadingConfig::default(),
            &TitleConfig::default(),
        );
        assert!(structure.is_failed());
        assert_eq!(structure.title, "");
        assert!(structure.outline.is_empty());
    }
}
