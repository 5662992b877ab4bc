//! Collection processing.
//!
//! A root folder holds one subfolder per collection:
//!
//! ```text
//! root/
//! ├── parsed_json/<collection>/<stem>.json   structure artifacts (written)
//! └── <collection>/
//!     ├── challenge1b_input.json             descriptor
//!     ├── challenge1b_output.json            ranked result (written)
//!     └── pdfs/*.pdf
//! ```
//!
//! Stage 1 extracts a structure artifact for every PDF, each document on its
//! own worker thread under a timeout. Stage 2 starts once stage 1 is done,
//! assembles sections for the documents listed in the descriptor (again one
//! worker thread and timeout per document) and ranks them against the
//! persona query.
//!
//! Parallel stage 1 waits on its workers from a dedicated rayon pool; lopdf
//! schedules its own parsing work on the global pool, which must stay free.

mod artifact;
mod assemble;

pub use artifact::{artifact_path, load_artifact, write_artifact};
pub use assemble::SectionAssembler;

use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::detect::has_pdf_extension;
use crate::error::{Error, Result};
use crate::model::{CollectionInput, CollectionOutput, DocumentStructure, OutputMetadata, Section};
use crate::parser::{ErrorMode, LopdfProvider, ParseOptions};
use crate::rank::{Embedder, RankOptions, RelevanceRanker};
use crate::render::{write_json, JsonFormat};
use crate::structure::{HeadingConfig, StructureExtractor, TitleConfig};

/// Options for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Heading thresholds
    pub heading: HeadingConfig,

    /// Title thresholds
    pub title: TitleConfig,

    /// Ranking options
    pub rank: RankOptions,

    /// Extract documents of a collection in parallel
    pub parallel: bool,

    /// Size of the stage 1 pool; 0 lets rayon decide
    pub threads: usize,

    /// Time budget for one document's structure extraction
    pub document_timeout: Duration,

    /// How unreadable pages are handled
    pub error_mode: ErrorMode,

    /// Stop after writing structure artifacts
    pub structure_only: bool,

    /// Formatting of written JSON
    pub json_format: JsonFormat,

    /// Descriptor file name inside a collection
    pub input_file: String,

    /// PDF folder name inside a collection
    pub pdf_dir: String,

    /// Output file name inside a collection
    pub output_file: String,

    /// Artifact folder name inside the root
    pub parsed_dir: String,
}

impl PipelineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the heading thresholds.
    pub fn with_heading(mut self, heading: HeadingConfig) -> Self {
        self.heading = heading;
        self
    }

    /// Set the title thresholds.
    pub fn with_title(mut self, title: TitleConfig) -> Self {
        self.title = title;
        self
    }

    /// Set the ranking options.
    pub fn with_rank(mut self, rank: RankOptions) -> Self {
        self.rank = rank;
        self
    }

    /// Enable or disable parallel extraction.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the stage 1 pool size (0 for rayon's default).
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set the per-document timeout.
    pub fn with_document_timeout(mut self, timeout: Duration) -> Self {
        self.document_timeout = timeout;
        self
    }

    /// Set the error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Only write structure artifacts.
    pub fn structure_only(mut self, enabled: bool) -> Self {
        self.structure_only = enabled;
        self
    }

    /// Set the JSON format.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            heading: HeadingConfig::default(),
            title: TitleConfig::default(),
            rank: RankOptions::default(),
            parallel: true,
            threads: 0,
            document_timeout: Duration::from_secs(60),
            error_mode: ErrorMode::default(),
            structure_only: false,
            json_format: JsonFormat::Pretty,
            input_file: "challenge1b_input.json".to_string(),
            pdf_dir: "pdfs".to_string(),
            output_file: "challenge1b_output.json".to_string(),
            parsed_dir: "parsed_json".to_string(),
        }
    }
}

/// A collection folder with all required inputs present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    /// Folder name
    pub name: String,
    pub input_path: PathBuf,
    pub pdf_dir: PathBuf,
    pub output_path: PathBuf,
    /// Where this collection's structure artifacts go
    pub artifact_dir: PathBuf,
}

impl Collection {
    /// Check a collection folder for its descriptor and PDF folder.
    pub fn open<P: AsRef<Path>>(root: P, name: &str, options: &PipelineOptions) -> Result<Self> {
        let root = root.as_ref();
        let dir = root.join(name);
        let input_path = dir.join(&options.input_file);
        let pdf_dir = dir.join(&options.pdf_dir);

        if !input_path.is_file() {
            return Err(Error::InvalidCollection {
                name: name.to_string(),
                reason: format!("no {} found", options.input_file),
            });
        }
        if !pdf_dir.is_dir() {
            return Err(Error::InvalidCollection {
                name: name.to_string(),
                reason: format!("no {}/ folder found", options.pdf_dir),
            });
        }

        Ok(Self {
            name: name.to_string(),
            output_path: dir.join(&options.output_file),
            artifact_dir: root.join(&options.parsed_dir).join(name),
            input_path,
            pdf_dir,
        })
    }

    /// Read the collection descriptor.
    pub fn load_input(&self) -> Result<CollectionInput> {
        let content = fs::read_to_string(&self.input_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// PDF file names in the PDF folder, sorted.
    pub fn pdf_files(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.pdf_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && has_pdf_extension(&path) {
                files.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Subfolders of `root` in name order, each either a usable collection or the
/// reason it is skipped. The artifact folder itself is not listed.
pub fn discover_collections<P: AsRef<Path>>(
    root: P,
    options: &PipelineOptions,
) -> Result<Vec<Result<Collection>>> {
    let root = root.as_ref();
    let mut names = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name != options.parsed_dir {
            names.push(name);
        }
    }
    names.sort();

    Ok(names
        .iter()
        .map(|name| Collection::open(root, name, options))
        .collect())
}

/// Outcome of structure extraction for one PDF.
#[derive(Debug, Clone)]
pub struct DocumentReport {
    pub filename: String,
    pub structure: DocumentStructure,
}

/// Outcome of processing one collection.
#[derive(Debug, Clone, Default)]
pub struct CollectionReport {
    pub name: String,
    /// Documents that went through structure extraction
    pub documents: usize,
    /// Documents whose structure extraction failed
    pub failed_documents: usize,
    /// Sections pooled for ranking
    pub sections: usize,
    /// Written output file, if ranking ran
    pub output_path: Option<PathBuf>,
}

/// Runs both pipeline stages for collections.
pub struct CollectionRunner {
    options: PipelineOptions,
    embedder: Box<dyn Embedder>,
}

impl CollectionRunner {
    pub fn new(options: PipelineOptions, embedder: Box<dyn Embedder>) -> Self {
        Self { options, embedder }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Like [`CollectionRunner::run`], but a panic anywhere in the collection
    /// becomes [`Error::Worker`] instead of unwinding into the caller.
    pub fn run_contained(&self, collection: &Collection) -> Result<CollectionReport> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.run(collection))) {
            Ok(result) => result,
            Err(payload) => {
                let err = Error::Worker(format!(
                    "collection {} panicked: {}",
                    collection.name,
                    panic_message(payload.as_ref())
                ));
                log::error!("{}", err);
                Err(err)
            }
        }
    }

    /// Process one collection: extract, assemble, rank, write.
    pub fn run(&self, collection: &Collection) -> Result<CollectionReport> {
        log::info!("Processing collection {}", collection.name);

        let reports = self.extract_documents(collection)?;
        let mut report = CollectionReport {
            name: collection.name.clone(),
            documents: reports.len(),
            failed_documents: reports.iter().filter(|r| r.structure.is_failed()).count(),
            ..CollectionReport::default()
        };

        if self.options.structure_only {
            return Ok(report);
        }

        let (output, sections) = self.rank_collection(collection)?;
        write_json(&collection.output_path, &output, self.options.json_format)?;
        log::info!("Output written to {}", collection.output_path.display());

        report.sections = sections;
        report.output_path = Some(collection.output_path.clone());
        Ok(report)
    }

    /// Stage 1: write a structure artifact for every PDF of the collection.
    pub fn extract_documents(&self, collection: &Collection) -> Result<Vec<DocumentReport>> {
        let files = collection.pdf_files()?;
        log::info!("Extracting structure of {} PDFs", files.len());

        let extract = |filename: &String| DocumentReport {
            filename: filename.clone(),
            structure: self.extract_with_timeout(&collection.pdf_dir.join(filename)),
        };
        let reports: Vec<DocumentReport> = if self.options.parallel {
            let pool = ThreadPoolBuilder::new()
                .num_threads(self.options.threads)
                .thread_name(|i| format!("docsift-stage1-{}", i))
                .build()
                .map_err(|e| Error::Worker(e.to_string()))?;
            pool.install(|| files.par_iter().map(extract).collect())
        } else {
            files.iter().map(extract).collect()
        };

        for report in &reports {
            let path = artifact_path(&collection.artifact_dir, &report.filename);
            write_artifact(&path, &report.structure, self.options.json_format)?;
            log::debug!("Artifact saved: {}", path.display());
        }

        Ok(reports)
    }

    /// Extract one document on a worker thread, bounded by the timeout.
    ///
    /// Timeouts and worker panics produce a failed structure; a timed-out
    /// worker is left to finish on its own.
    pub fn extract_with_timeout(&self, path: &Path) -> DocumentStructure {
        let worker_path = path.to_path_buf();
        let heading = self.options.heading.clone();
        let title = self.options.title.clone();
        let parse = ParseOptions::new().with_error_mode(self.options.error_mode);

        let job = move || {
            StructureExtractor::new(heading, title)
                .with_parse_options(parse)
                .extract_file(&worker_path)
        };
        match run_isolated("docsift-extract", self.options.document_timeout, job) {
            Ok(structure) => structure,
            Err(err) => {
                log::error!("{}: {}", path.display(), err);
                DocumentStructure::failed(err.to_string())
            }
        }
    }

    /// Stage 2: assemble sections from artifacts and rank them.
    ///
    /// Returns the output document and the number of pooled sections.
    pub fn rank_collection(&self, collection: &Collection) -> Result<(CollectionOutput, usize)> {
        let input = collection.load_input()?;
        let query = input.query();
        log::info!("Persona: {}", query.role);
        log::info!("Job to be done: {}", query.task);

        let sections = self.collect_sections(collection, &input);
        if sections.is_empty() {
            return Err(Error::NoSections(collection.name.clone()));
        }
        log::info!("Total sections extracted: {}", sections.len());

        let ranker = RelevanceRanker::new(self.embedder.as_ref(), self.options.rank.clone());
        let ranking = ranker.rank(&query, &sections)?;

        let output = CollectionOutput {
            metadata: OutputMetadata {
                input_documents: input.filenames(),
                persona: query.role,
                job_to_be_done: query.task,
                processing_timestamp: timestamp(),
            },
            extracted_sections: ranking.extracted_sections(),
            subsection_analysis: ranking.subsection_analysis(),
        };
        Ok((output, sections.len()))
    }

    /// Pooled sections of every listed document, in descriptor order.
    ///
    /// Each document is assembled on a worker thread under the document
    /// timeout; a document that times out or panics contributes no sections.
    pub fn collect_sections(&self, collection: &Collection, input: &CollectionInput) -> Vec<Section> {
        let mut sections = Vec::new();

        for filename in input.filenames() {
            let pdf_path = collection.pdf_dir.join(&filename);
            if !pdf_path.is_file() {
                log::warn!("PDF file not found: {}", pdf_path.display());
                continue;
            }

            let artifact = artifact_path(&collection.artifact_dir, &filename);
            let document_id = filename.clone();
            let job = move || assemble_document(&pdf_path, &artifact, &document_id);
            match run_isolated("docsift-assemble", self.options.document_timeout, job) {
                Ok(found) => sections.extend(found),
                Err(e) => log::warn!("Skipping {}: {}", filename, e),
            }
        }

        sections
    }
}

/// Sections of one document from its artifact, or from its pages when the
/// artifact is missing or unusable.
fn assemble_document(pdf_path: &Path, artifact: &Path, document_id: &str) -> Vec<Section> {
    let provider = match LopdfProvider::open(pdf_path) {
        Ok(provider) => provider,
        Err(e) => {
            log::warn!("Cannot open {}: {}", pdf_path.display(), e);
            return Vec::new();
        }
    };

    let structure = match load_artifact(artifact) {
        Ok(structure) => Some(structure),
        Err(e) => {
            log::warn!(
                "No usable artifact for {} ({}), using pages",
                document_id,
                e
            );
            None
        }
    };

    SectionAssembler::new(&provider, document_id).assemble(structure.as_ref())
}

/// Run `job` on its own named thread and wait at most `timeout` for it.
///
/// A job that panics yields [`Error::Worker`]; one that outlives the timeout
/// yields [`Error::Timeout`] and is left to finish on its own.
pub fn run_isolated<T, F>(name: &str, timeout: Duration, job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = bounded(1);
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            let _ = tx.send(job());
        })
        .map_err(|e| Error::Worker(e.to_string()))?;

    match rx.recv_timeout(timeout) {
        Ok(value) => Ok(value),
        Err(RecvTimeoutError::Timeout) => Err(Error::Timeout(timeout)),
        Err(RecvTimeoutError::Disconnected) => {
            Err(Error::Worker(format!("{} worker panicked", name)))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Local time in ISO-8601 with microseconds.
fn timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}
