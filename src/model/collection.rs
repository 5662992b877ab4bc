//! Collection descriptor (input) and ranked result (output) documents.

use serde::{Deserialize, Serialize};

/// Input descriptor of a collection: who is asking, for what, over which PDFs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionInput {
    /// The persona issuing the query
    #[serde(default)]
    pub persona: Persona,

    /// The task the persona wants to accomplish
    #[serde(default)]
    pub job_to_be_done: JobToBeDone,

    /// Documents of the collection, in ranking order of precedence
    #[serde(default)]
    pub documents: Vec<DocumentRef>,
}

impl CollectionInput {
    /// Build the ranking query from persona and task.
    pub fn query(&self) -> Query {
        Query::new(
            self.persona.role.clone().unwrap_or_default(),
            self.job_to_be_done.task.clone().unwrap_or_default(),
        )
    }

    /// File names of all listed documents that carry one.
    pub fn filenames(&self) -> Vec<String> {
        self.documents
            .iter()
            .filter_map(|d| d.filename.clone())
            .collect()
    }
}

/// Persona description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Persona {
    /// Missing or `null` reads as an empty role
    #[serde(default)]
    pub role: Option<String>,
}

/// Job-to-be-done description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobToBeDone {
    /// Missing or `null` reads as an empty task
    #[serde(default)]
    pub task: Option<String>,
}

/// A document listed in the descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentRef {
    /// PDF file name inside the collection's `pdfs/` folder
    #[serde(default)]
    pub filename: Option<String>,

    /// Optional human title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Ranking query: persona role plus task description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub role: String,
    pub task: String,
}

impl Query {
    /// Create a new query.
    pub fn new(role: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            task: task.into(),
        }
    }

    /// The single string embedded for ranking.
    pub fn text(&self) -> String {
        format!("{} {}", self.role, self.task)
    }
}

/// Final ranked result of a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionOutput {
    pub metadata: OutputMetadata,
    pub extracted_sections: Vec<ExtractedSection>,
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}

/// Run metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputMetadata {
    pub input_documents: Vec<String>,
    pub persona: String,
    pub job_to_be_done: String,
    /// ISO-8601 local timestamp
    pub processing_timestamp: String,
}

/// One ranked section; all fields except the rank are null on padded entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSection {
    pub document: Option<String>,
    pub section_title: Option<String>,
    pub importance_rank: usize,
    pub page_number: Option<u32>,
}

impl ExtractedSection {
    /// Placeholder for a rank no section filled.
    pub fn padding(importance_rank: usize) -> Self {
        Self {
            document: None,
            section_title: None,
            importance_rank,
            page_number: None,
        }
    }
}

/// Summary of one ranked section; all fields are null on padded entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubsectionAnalysis {
    pub document: Option<String>,
    pub refined_text: Option<String>,
    pub page_number: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_descriptor() {
        let json = r#"{
            "challenge_info": {"challenge_id": "round_1b_002"},
            "documents": [{"filename": "a.pdf", "title": "A"}, {"title": "no file"}],
            "persona": {"role": "Travel Planner"},
            "job_to_be_done": {"task": "Plan a trip of 4 days."}
        }"#;
        let input: CollectionInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.filenames(), vec!["a.pdf".to_string()]);
        assert_eq!(input.query().text(), "Travel Planner Plan a trip of 4 days.");
    }

    #[test]
    fn test_parse_descriptor_missing_fields() {
        let input: CollectionInput = serde_json::from_str("{}").unwrap();
        assert!(input.documents.is_empty());
        assert_eq!(input.query().text(), " ");
    }

    #[test]
    fn test_parse_descriptor_null_role_and_task() {
        let json = r#"{
            "persona": {"role": null},
            "job_to_be_done": {"task": null},
            "documents": [{"filename": "a.pdf"}]
        }"#;
        let input: CollectionInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.query(), Query::new("", ""));
        assert_eq!(input.filenames(), vec!["a.pdf".to_string()]);
    }

    #[test]
    fn test_padding_serializes_nulls() {
        let json = serde_json::to_value(ExtractedSection::padding(4)).unwrap();
        assert_eq!(json["importance_rank"], 4);
        assert!(json["document"].is_null());
        assert!(json["section_title"].is_null());
        assert!(json["page_number"].is_null());

        let json = serde_json::to_value(SubsectionAnalysis::default()).unwrap();
        assert!(json["refined_text"].is_null());
    }
}
