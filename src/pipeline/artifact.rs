//! Persisted per-document structure artifacts.
//!
//! Artifacts decouple structure extraction from assembly and ranking: stage 2
//! can run again over existing `parsed_json/` files without re-reading layout.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::model::{DocumentStructure, HeadingLevel, OutlineEntry};
use crate::render::{write_json, JsonFormat};

/// Artifact file for a PDF: `<dir>/<stem>.json`.
pub fn artifact_path<P: AsRef<Path>>(dir: P, pdf_filename: &str) -> PathBuf {
    let stem = Path::new(pdf_filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| pdf_filename.to_string());
    dir.as_ref().join(format!("{}.json", stem))
}

/// Write an artifact, creating its directory.
pub fn write_artifact<P: AsRef<Path>>(
    path: P,
    structure: &DocumentStructure,
    format: JsonFormat,
) -> Result<()> {
    write_json(path, structure, format)
}

#[derive(Deserialize)]
struct RawArtifact {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    outline: Vec<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Load an artifact, tolerating sloppy entries.
///
/// Outline entries without a non-negative integer `page` or a string `text`
/// are dropped; an unknown or missing `level` reads as `H1`.
pub fn load_artifact<P: AsRef<Path>>(path: P) -> Result<DocumentStructure> {
    let content = fs::read_to_string(path)?;
    let raw: RawArtifact = serde_json::from_str(&content)?;

    let outline = raw.outline.iter().filter_map(parse_entry).collect();

    Ok(DocumentStructure {
        title: raw.title.unwrap_or_default(),
        outline,
        error: raw.error,
    })
}

fn parse_entry(value: &Value) -> Option<OutlineEntry> {
    let text = value.get("text")?.as_str()?;
    let page = u32::try_from(value.get("page")?.as_u64()?).ok()?;
    let level = value
        .get("level")
        .and_then(Value::as_str)
        .and_then(parse_level)
        .unwrap_or(HeadingLevel::H1);
    Some(OutlineEntry::new(level, text, page))
}

fn parse_level(tag: &str) -> Option<HeadingLevel> {
    let digits = tag.trim().strip_prefix(['H', 'h'])?;
    HeadingLevel::from_depth(digits.parse().ok()?)
}
