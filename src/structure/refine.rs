//! Hierarchy refinement of classified heading candidates.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{HeadingLevel, OutlineEntry};

static SECTION_NUMBER: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(\d+)\.(\d+)?\.?(\d+)?").ok());

/// A classified heading before refinement.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingCandidate {
    /// Normalized heading text
    pub text: String,
    pub level: HeadingLevel,
    /// Page index (0-based)
    pub page: u32,
    /// Top edge on the page
    pub y: f32,
    pub font_size: f32,
    /// Level came from explicit section numbering
    pub is_pattern_based: bool,
}

impl HeadingCandidate {
    pub fn new(text: impl Into<String>, level: HeadingLevel, page: u32) -> Self {
        Self {
            text: text.into(),
            level,
            page,
            y: 0.0,
            font_size: 0.0,
            is_pattern_based: false,
        }
    }

    /// Mark the candidate as numbering-based.
    pub fn pattern_based(mut self) -> Self {
        self.is_pattern_based = true;
        self
    }

    /// Set the vertical position.
    pub fn at(mut self, y: f32) -> Self {
        self.y = y;
        self
    }
}

/// Refine candidates (already in reading order) into outline entries.
///
/// A single left-to-right fold; each entry only sees the entry refined just
/// before it. After refinement no entry is more than one level deeper than
/// its predecessor.
pub fn refine(candidates: Vec<HeadingCandidate>) -> Vec<OutlineEntry> {
    let capacity = candidates.len();
    candidates
        .into_iter()
        .fold(Vec::with_capacity(capacity), |mut outline, candidate| {
            let level = refine_level(&candidate, outline.last());
            outline.push(OutlineEntry::new(level, candidate.text, candidate.page));
            outline
        })
}

/// Level of one candidate given the previously refined entry.
pub fn refine_level(candidate: &HeadingCandidate, previous: Option<&OutlineEntry>) -> HeadingLevel {
    let mut level = numbering_level(candidate).unwrap_or(candidate.level);

    let Some(previous) = previous else {
        return level;
    };

    if starts_definition_list(&candidate.text, &previous.text) {
        level = HeadingLevel::H4;
    }

    level.min(previous.level.deeper())
}

/// Level implied by a leading section number such as `2.` or `2.1`.
fn numbering_level(candidate: &HeadingCandidate) -> Option<HeadingLevel> {
    let caps = SECTION_NUMBER.as_ref()?.captures(&candidate.text)?;
    if caps.get(2).is_some() {
        if candidate.is_pattern_based {
            Some(candidate.level)
        } else {
            Some(HeadingLevel::H2)
        }
    } else {
        Some(HeadingLevel::H1)
    }
}

/// "For each ..." right after a line ending in "mean:".
fn starts_definition_list(text: &str, previous_text: &str) -> bool {
    text.to_lowercase().starts_with("for each") && previous_text.to_lowercase().ends_with("mean:")
}

#[cfg(test)]
mod tests {
    use super::*;
    use HeadingLevel::*;

    fn levels(outline: &[OutlineEntry]) -> Vec<HeadingLevel> {
        outline.iter().map(|e| e.level).collect()
    }

    #[test]
    fn test_h1_then_h3_is_demoted() {
        let outline = refine(vec![
            HeadingCandidate::new("Overview", H1, 0),
            HeadingCandidate::new("Details", H3, 0),
        ]);
        assert_eq!(levels(&outline), vec![H1, H2]);
    }

    #[test]
    fn test_numbered_prefix_forces_h2() {
        let outline = refine(vec![
            HeadingCandidate::new("Intro", H1, 0),
            HeadingCandidate::new("2.1 Scope", H3, 0),
            HeadingCandidate::new("4.2.1 Deep", H1, 1),
        ]);
        assert_eq!(levels(&outline), vec![H1, H2, H2]);
    }

    #[test]
    fn test_pattern_based_keeps_level() {
        let outline = refine(vec![
            HeadingCandidate::new("3. Method", H1, 0).pattern_based(),
            HeadingCandidate::new("3.1 Setup", H2, 0).pattern_based(),
            HeadingCandidate::new("3.1.1 Tools", H3, 0).pattern_based(),
        ]);
        assert_eq!(levels(&outline), vec![H1, H2, H3]);
    }

    #[test]
    fn test_bare_number_forces_h1() {
        let outline = refine(vec![
            HeadingCandidate::new("Intro", H2, 0),
            HeadingCandidate::new("5.Results", H3, 0),
        ]);
        assert_eq!(levels(&outline), vec![H2, H1]);
    }

    #[test]
    fn test_for_each_after_mean() {
        let outline = refine(vec![
            HeadingCandidate::new("Terms", H2, 0),
            HeadingCandidate::new("The symbols mean:", H3, 0),
            HeadingCandidate::new("For each entry", H2, 0),
        ]);
        assert_eq!(levels(&outline), vec![H2, H3, H4]);
    }

    #[test]
    fn test_for_each_is_clamped_after_shallow_parent() {
        let outline = refine(vec![
            HeadingCandidate::new("These terms MEAN:", H1, 0),
            HeadingCandidate::new("for each item", H1, 0),
        ]);
        assert_eq!(levels(&outline), vec![H1, H2]);
    }

    #[test]
    fn test_adjacent_levels_never_jump() {
        let outline = refine(vec![
            HeadingCandidate::new("A", H1, 0),
            HeadingCandidate::new("B", H4, 0),
            HeadingCandidate::new("C", H4, 0),
            HeadingCandidate::new("D", H4, 0),
            HeadingCandidate::new("E", H1, 1),
            HeadingCandidate::new("F", H3, 1),
        ]);
        let result = levels(&outline);
        assert_eq!(result, vec![H1, H2, H3, H4, H1, H2]);
        for pair in result.windows(2) {
            assert!(pair[1].depth() <= pair[0].depth() + 1);
        }
    }

    #[test]
    fn test_order_and_pages_preserved() {
        let outline = refine(vec![
            HeadingCandidate::new("First", H1, 0).at(10.0),
            HeadingCandidate::new("Second", H1, 3).at(50.0),
        ]);
        assert_eq!(outline[0], OutlineEntry::new(H1, "First", 0));
        assert_eq!(outline[1], OutlineEntry::new(H1, "Second", 3));
    }

    #[test]
    fn test_empty_input() {
        assert!(refine(Vec::new()).is_empty());
    }
}
