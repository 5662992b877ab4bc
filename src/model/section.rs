//! Section records: the unit of relevance ranking.

use serde::{Deserialize, Serialize};

/// A titled span of document text tied to one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Source document (PDF file name)
    pub document_id: String,

    /// Page number (1-indexed)
    pub page_number: u32,

    /// Full plain text of the page
    pub text: String,

    /// Heading text, or `Page {n}` for page-based sections
    pub section_title: String,
}

impl Section {
    /// Create a new section.
    pub fn new(
        document_id: impl Into<String>,
        page_number: u32,
        text: impl Into<String>,
        section_title: impl Into<String>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            page_number,
            text: text.into(),
            section_title: section_title.into(),
        }
    }

    /// A page-based section titled `Page {n}`.
    pub fn for_page(document_id: impl Into<String>, page_number: u32, text: impl Into<String>) -> Self {
        Self::new(document_id, page_number, text, format!("Page {}", page_number))
    }
}

/// A section selected by the ranker.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSection {
    /// The selected section
    pub section: Section,

    /// 1-based position in the relevance ordering
    pub importance_rank: usize,

    /// Similarity to the query
    pub score: f32,
}

/// Extractive summary paired with a ranked section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsectionSummary {
    /// Source document
    pub document_id: String,

    /// Page number (1-indexed)
    pub page_number: u32,

    /// Leading sentences of the section text
    pub refined_text: String,
}
