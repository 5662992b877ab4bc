//! # docsift
//!
//! Heuristic PDF structure extraction and persona-driven section ranking.
//!
//! PDFs carry no semantic tags, so docsift recovers a title and a leveled
//! outline (H1-H4) from visual layout signals: font size relative to the
//! document median, weight, whitespace and section numbering. The outline is
//! then cut into page sections, which are ranked against a persona query by
//! embedding similarity and summarized extractively.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docsift::{extract_structure_file, HeadingConfig, TitleConfig};
//!
//! let structure = extract_structure_file(
//!     "document.pdf",
//!     &HeadingConfig::default(),
//!     &TitleConfig::default(),
//! );
//! println!("{}", structure.title);
//! for entry in &structure.outline {
//!     println!("{} {} (page {})", entry.level, entry.text, entry.page);
//! }
//! ```
//!
//! Processing a folder of collections:
//!
//! ```no_run
//! use docsift::Docsift;
//!
//! let reports = Docsift::new().with_top_n(5).run("input-root")?;
//! for report in reports {
//!     match report {
//!         Ok(r) => println!("{}: {} sections", r.name, r.sections),
//!         Err(e) => eprintln!("{}", e),
//!     }
//! }
//! # Ok::<(), docsift::Error>(())
//! ```
//!
//! ## Features
//!
//! - **Rule-based headings**: ordered, independently testable heuristics
//! - **Tunable thresholds**: every ratio and limit lives in a config struct
//! - **Failure isolation**: per-document timeouts, failed documents fall back to pages
//! - **Parallel extraction**: documents of a collection are processed with Rayon
//! - **Pluggable embeddings**: hashing embedder built in, ONNX models with the `onnx` feature

pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod rank;
pub mod render;
pub mod structure;

// Re-export commonly used types
pub use detect::{detect_version_from_bytes, detect_version_from_path, has_pdf_extension};
pub use error::{Error, Result};
pub use model::{
    CollectionInput, CollectionOutput, DocumentStructure, ExtractedSection, HeadingLevel,
    OutlineEntry, Query, RankedSection, Section, SubsectionAnalysis, SubsectionSummary,
};
pub use parser::{ErrorMode, LayoutProvider, LopdfProvider, ParseOptions};
pub use pipeline::{
    discover_collections, Collection, CollectionReport, CollectionRunner, PipelineOptions,
    SectionAssembler,
};
#[cfg(feature = "onnx")]
pub use rank::OnnxEmbedder;
pub use rank::{Embedder, Embedding, HashingEmbedder, RankOptions, Ranking, RelevanceRanker};
pub use render::JsonFormat;
pub use structure::{
    extract_structure, extract_structure_file, HeadingConfig, StructureExtractor, TitleConfig,
};

use std::path::Path;
use std::time::Duration;

/// Builder for running the whole pipeline.
///
/// # Example
///
/// ```no_run
/// use docsift::Docsift;
///
/// let structure = Docsift::new().strict().extract("document.pdf");
/// assert!(!structure.is_failed());
/// ```
pub struct Docsift {
    options: PipelineOptions,
    embedder: Box<dyn Embedder>,
}

impl Docsift {
    /// Create a builder with default options and the hashing embedder.
    pub fn new() -> Self {
        Self {
            options: PipelineOptions::default(),
            embedder: Box::new(HashingEmbedder::default()),
        }
    }

    /// Replace all pipeline options.
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Use a different embedding backend.
    pub fn with_embedder(mut self, embedder: Box<dyn Embedder>) -> Self {
        self.embedder = embedder;
        self
    }

    /// Set the number of ranked sections.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.options.rank = self.options.rank.with_top_n(top_n);
        self
    }

    /// Set the per-document timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.document_timeout = timeout;
        self
    }

    /// Set the heading thresholds.
    pub fn with_heading_config(mut self, config: HeadingConfig) -> Self {
        self.options.heading = config;
        self
    }

    /// Set the title thresholds.
    pub fn with_title_config(mut self, config: TitleConfig) -> Self {
        self.options.title = config;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options.parallel = false;
        self
    }

    /// Fail a document on its first unreadable page.
    pub fn strict(mut self) -> Self {
        self.options.error_mode = ErrorMode::Strict;
        self
    }

    /// Only write structure artifacts, skip ranking.
    pub fn structure_only(mut self) -> Self {
        self.options.structure_only = true;
        self
    }

    /// Current options.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Extract the structure of a single PDF; failures yield a failed structure.
    pub fn extract<P: AsRef<Path>>(&self, path: P) -> DocumentStructure {
        StructureExtractor::new(self.options.heading.clone(), self.options.title.clone())
            .with_parse_options(ParseOptions::new().with_error_mode(self.options.error_mode))
            .extract_file(path)
    }

    /// Process every collection under `root`.
    ///
    /// Each entry is the report of one collection or the reason it was
    /// skipped or failed; one failing (or panicking) collection never stops
    /// the others.
    pub fn run<P: AsRef<Path>>(self, root: P) -> Result<Vec<Result<CollectionReport>>> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(Error::Other(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let collections = discover_collections(root, &self.options)?;
        let runner = CollectionRunner::new(self.options, self.embedder);
        Ok(collections
            .into_iter()
            .map(|found| found.and_then(|collection| runner.run_contained(&collection)))
            .collect())
    }
}

impl Default for Docsift {
    fn default() -> Self {
        Self::new()
    }
}
