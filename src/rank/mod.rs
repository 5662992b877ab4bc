//! Relevance ranking of sections against a persona query.
//!
//! The query and all section texts are embedded in two batched calls, every
//! section is scored by similarity to the query, and the best `top_n` are
//! kept with a short extractive summary each.
//!
//! Ordering is deterministic: higher scores first, equal scores in extraction
//! order, NaN scores last.

mod embed;
#[cfg(feature = "onnx")]
mod onnx;
mod summary;

pub use embed::{cosine_similarity, l2_normalize, Embedder, Embedding, HashingEmbedder, DEFAULT_HASH_DIM};
#[cfg(feature = "onnx")]
pub use onnx::OnnxEmbedder;
pub use summary::{split_sentences, summarize};

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::model::{
    ExtractedSection, Query, RankedSection, Section, SubsectionAnalysis, SubsectionSummary,
};

/// Options for ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankOptions {
    /// Number of output ranks; lists are padded to this length
    pub top_n: usize,

    /// Sentences kept in each summary
    pub summary_sentences: usize,
}

impl RankOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of ranks.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Set the summary length in sentences.
    pub fn with_summary_sentences(mut self, sentences: usize) -> Self {
        self.summary_sentences = sentences;
        self
    }
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            top_n: 5,
            summary_sentences: 3,
        }
    }
}

/// Selected sections in rank order with their summaries.
#[derive(Debug, Clone, Default)]
pub struct Ranking {
    /// Selected sections, rank 1 first
    pub ranked: Vec<RankedSection>,

    /// Summary for each entry of `ranked`, same order
    pub summaries: Vec<SubsectionSummary>,

    /// Requested number of ranks
    pub top_n: usize,
}

impl Ranking {
    /// Extracted-section records, padded with null entries to `top_n`.
    pub fn extracted_sections(&self) -> Vec<ExtractedSection> {
        let mut out: Vec<ExtractedSection> = self
            .ranked
            .iter()
            .map(|r| ExtractedSection {
                document: Some(r.section.document_id.clone()),
                section_title: Some(r.section.section_title.clone()),
                importance_rank: r.importance_rank,
                page_number: Some(r.section.page_number),
            })
            .collect();
        for rank in out.len() + 1..=self.top_n {
            out.push(ExtractedSection::padding(rank));
        }
        out
    }

    /// Subsection-analysis records, padded with null entries to `top_n`.
    pub fn subsection_analysis(&self) -> Vec<SubsectionAnalysis> {
        let mut out: Vec<SubsectionAnalysis> = self
            .summaries
            .iter()
            .map(|s| SubsectionAnalysis {
                document: Some(s.document_id.clone()),
                refined_text: Some(s.refined_text.clone()),
                page_number: Some(s.page_number),
            })
            .collect();
        out.resize(self.top_n.max(out.len()), SubsectionAnalysis::default());
        out
    }
}

/// Ranks sections by embedding similarity to a query.
pub struct RelevanceRanker<'a> {
    embedder: &'a dyn Embedder,
    options: RankOptions,
}

impl<'a> RelevanceRanker<'a> {
    pub fn new(embedder: &'a dyn Embedder, options: RankOptions) -> Self {
        Self { embedder, options }
    }

    /// Rank `sections` against `query`.
    pub fn rank(&self, query: &Query, sections: &[Section]) -> Result<Ranking> {
        let top_n = self.options.top_n;
        if top_n == 0 || sections.is_empty() {
            return Ok(Ranking {
                top_n,
                ..Ranking::default()
            });
        }

        let query_text = query.text();
        let query_vec = self
            .embedder
            .embed(&[query_text.as_str()])?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("embedder returned no query vector".to_string()))?;

        let texts: Vec<&str> = sections.iter().map(|s| s.text.as_str()).collect();
        let vectors = self.embedder.embed(&texts)?;
        if vectors.len() != sections.len() {
            return Err(Error::Embedding(format!(
                "embedder returned {} vectors for {} sections",
                vectors.len(),
                sections.len()
            )));
        }
        log::debug!(
            "Embedded {} sections with {} embedder",
            sections.len(),
            self.embedder.name()
        );

        let scores: Vec<f32> = vectors
            .iter()
            .map(|v| self.embedder.similarity(&query_vec, v))
            .collect();

        let order = rank_order(&scores);

        let mut ranking = Ranking {
            top_n,
            ..Ranking::default()
        };
        for (position, &index) in order.iter().take(top_n).enumerate() {
            let section = &sections[index];
            ranking.summaries.push(SubsectionSummary {
                document_id: section.document_id.clone(),
                page_number: section.page_number,
                refined_text: summarize(&section.text, self.options.summary_sentences),
            });
            ranking.ranked.push(RankedSection {
                section: section.clone(),
                importance_rank: position + 1,
                score: scores[index],
            });
        }

        Ok(ranking)
    }
}

/// Indices of `scores` from most to least relevant.
///
/// Ties keep extraction order; NaN scores go last.
pub fn rank_order(scores: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| compare_scores(scores[a], scores[b]).then(a.cmp(&b)));
    order
}

fn compare_scores(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}
