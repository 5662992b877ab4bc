//! Section assembly from an outline or, failing that, from whole pages.

use std::collections::HashMap;

use crate::model::{DocumentStructure, OutlineEntry, Section};
use crate::parser::LayoutProvider;

/// Builds [`Section`]s for one document.
///
/// Page text is read at most once per page.
pub struct SectionAssembler<'a> {
    provider: &'a dyn LayoutProvider,
    document_id: String,
    page_cache: HashMap<usize, String>,
}

impl<'a> SectionAssembler<'a> {
    pub fn new(provider: &'a dyn LayoutProvider, document_id: impl Into<String>) -> Self {
        Self {
            provider,
            document_id: document_id.into(),
            page_cache: HashMap::new(),
        }
    }

    /// Sections for a document, falling back to whole pages.
    ///
    /// The page fallback applies when there is no structure, the structure
    /// records a failure, its outline is empty, or the outline yields no
    /// section with page text.
    pub fn assemble(&mut self, structure: Option<&DocumentStructure>) -> Vec<Section> {
        let Some(structure) = structure else {
            return self.from_pages();
        };
        if structure.is_failed() || structure.outline.is_empty() {
            return self.from_pages();
        }

        let sections = self.from_outline(&structure.outline);
        if sections.is_empty() {
            log::warn!(
                "No sections from the outline of {}, using pages",
                self.document_id
            );
            return self.from_pages();
        }
        sections
    }

    /// One section per outline entry whose page has text.
    ///
    /// Entry pages are 0-based; the section reports the 1-based number.
    pub fn from_outline(&mut self, outline: &[OutlineEntry]) -> Vec<Section> {
        let mut sections = Vec::new();
        for entry in outline {
            let index = entry.page as usize;
            let text = self.page_text(index);
            if text.is_empty() {
                continue;
            }
            sections.push(Section::new(
                self.document_id.clone(),
                entry.page + 1,
                text,
                entry.text.clone(),
            ));
        }
        sections
    }

    /// One section per non-empty page, titled `Page {n}`.
    pub fn from_pages(&mut self) -> Vec<Section> {
        let mut sections = Vec::new();
        for index in 0..self.provider.page_count() {
            let text = self.page_text(index);
            if !text.is_empty() {
                sections.push(Section::for_page(
                    self.document_id.clone(),
                    index as u32 + 1,
                    text,
                ));
            }
        }
        sections
    }

    fn page_text(&mut self, index: usize) -> String {
        if let Some(text) = self.page_cache.get(&index) {
            return text.clone();
        }

        let text = if index < self.provider.page_count() {
            match self.provider.page_text(index) {
                Ok(text) => text.trim().to_string(),
                Err(e) => {
                    log::warn!(
                        "Cannot read page {} of {}: {}",
                        index + 1,
                        self.document_id,
                        e
                    );
                    String::new()
                }
            }
        } else {
            String::new()
        };

        self.page_cache.insert(index, text.clone());
        text
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::error::Result;
    use crate::model::HeadingLevel;
    use crate::parser::PageLayout;

    /// Pages with fixed text; counts text reads.
    struct TextPages {
        pages: Vec<&'static str>,
        reads: Cell<usize>,
    }

    impl TextPages {
        fn new(pages: Vec<&'static str>) -> Self {
            Self {
                pages,
                reads: Cell::new(0),
            }
        }
    }

    impl LayoutProvider for TextPages {
        fn page_count(&self) -> usize {
            self.pages.len()
        }

        fn page_layout(&self, index: usize) -> Result<PageLayout> {
            Ok(PageLayout::letter(index))
        }

        fn page_text(&self, index: usize) -> Result<String> {
            self.reads.set(self.reads.get() + 1);
            Ok(self.pages[index].to_string())
        }
    }

    #[test]
    fn test_no_outline_uses_pages() {
        let pages = TextPages::new(vec!["First page.", "Second page."]);
        let sections = SectionAssembler::new(&pages, "doc.pdf").assemble(None);
        let titles: Vec<&str> = sections.iter().map(|s| s.section_title.as_str()).collect();
        assert_eq!(titles, vec!["Page 1", "Page 2"]);
        assert_eq!(sections[1].page_number, 2);
        assert_eq!(sections[1].text, "Second page.");
    }

    #[test]
    fn test_empty_pages_skipped() {
        let pages = TextPages::new(vec!["  \n", "Only text."]);
        let sections = SectionAssembler::new(&pages, "doc.pdf").from_pages();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].section_title, "Page 2");
    }

    #[test]
    fn test_outline_sections() {
        let pages = TextPages::new(vec!["Cover text.", "Chapter text."]);
        let structure = DocumentStructure::new(
            "T",
            vec![
                OutlineEntry::new(HeadingLevel::H1, "Intro", 0),
                OutlineEntry::new(HeadingLevel::H2, "Details", 1),
                OutlineEntry::new(HeadingLevel::H2, "More details", 1),
                OutlineEntry::new(HeadingLevel::H1, "Past the end", 9),
            ],
        );
        let sections = SectionAssembler::new(&pages, "doc.pdf").assemble(Some(&structure));

        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0], Section::new("doc.pdf", 1, "Cover text.", "Intro"));
        assert_eq!(sections[2].page_number, 2);
        assert_eq!(sections[2].section_title, "More details");
        assert_eq!(pages.reads.get(), 2);
    }

    #[test]
    fn test_outline_without_text_falls_back() {
        let pages = TextPages::new(vec!["", "Body."]);
        let structure = DocumentStructure::new(
            "",
            vec![OutlineEntry::new(HeadingLevel::H1, "Empty page heading", 0)],
        );
        let sections = SectionAssembler::new(&pages, "doc.pdf").assemble(Some(&structure));
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].section_title, "Page 2");
    }

    #[test]
    fn test_failed_structure_falls_back() {
        let pages = TextPages::new(vec!["Text."]);
        let structure = DocumentStructure::failed("broken");
        let sections = SectionAssembler::new(&pages, "doc.pdf").assemble(Some(&structure));
        assert_eq!(sections[0].section_title, "Page 1");
    }
}
