//! Data records shared across structure extraction, assembly and ranking.

mod collection;
mod outline;
mod section;

pub use collection::{
    CollectionInput, CollectionOutput, DocumentRef, ExtractedSection, JobToBeDone,
    OutputMetadata, Persona, Query, SubsectionAnalysis,
};
pub use outline::{DocumentStructure, HeadingLevel, OutlineEntry};
pub use section::{RankedSection, Section, SubsectionSummary};
