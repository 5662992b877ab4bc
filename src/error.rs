//! Error types for docsift library.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for docsift operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during structure extraction and ranking.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted and cannot be read.
    #[error("Document is encrypted")]
    Encrypted,

    /// Page index is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(usize, usize),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The embedding backend failed or returned malformed vectors.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// A document did not finish within the configured time budget.
    #[error("Document processing timed out after {0:?}")]
    Timeout(Duration),

    /// A document worker terminated without producing a result.
    #[error("Document worker failed: {0}")]
    Worker(String),

    /// A collection folder is missing required inputs.
    #[error("Invalid collection {name}: {reason}")]
    InvalidCollection {
        /// Collection folder name
        name: String,
        /// What is missing
        reason: String,
    },

    /// No document of the collection produced a single section.
    #[error("No sections extracted from the PDFs of collection {0}")]
    NoSections(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}
