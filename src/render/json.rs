//! JSON rendering of structure artifacts and collection outputs.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize a value to JSON. Non-ASCII text is written as-is.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value)?,
        JsonFormat::Compact => serde_json::to_string(value)?,
    };
    Ok(json)
}

/// Serialize a value and write it to `path`, creating parent directories.
pub fn write_json<T: Serialize + ?Sized, P: AsRef<Path>>(
    path: P,
    value: &T,
    format: JsonFormat,
) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, to_json(value, format)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DocumentStructure, HeadingLevel, OutlineEntry};

    fn structure() -> DocumentStructure {
        DocumentStructure::new(
            "Guide de voyage",
            vec![OutlineEntry::new(HeadingLevel::H1, "Côte d'Azur", 0)],
        )
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&structure(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"title\""));
        assert!(json.contains("\"level\": \"H1\""));
        assert!(json.contains("Côte d'Azur"));
        assert!(json.contains('\n'));
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&structure(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_write_json_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parsed_json").join("c1").join("a.json");
        write_json(&path, &structure(), JsonFormat::Pretty).unwrap();
        let back: DocumentStructure =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, structure());
    }
}
