//! Extractive summaries: the leading sentences of a text.

use once_cell::sync::Lazy;
use regex::Regex;

static SENTENCE_END: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"[.!?]\s+").ok());

/// Split text after `.`, `!` or `?` followed by whitespace.
///
/// Sentences keep their closing punctuation and are trimmed; empty pieces
/// are dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    if let Some(re) = SENTENCE_END.as_ref() {
        for m in re.find_iter(text) {
            // punctuation is a single ASCII byte
            sentences.push(&text[start..m.start() + 1]);
            start = m.end();
        }
    }
    sentences.push(&text[start..]);

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// First `max_sentences` sentences joined by single spaces.
pub fn summarize(text: &str, max_sentences: usize) -> String {
    split_sentences(text)
        .into_iter()
        .take(max_sentences)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_three_sentences() {
        let text = "One. Two!  Three?\nFour. Five.";
        assert_eq!(summarize(text, 3), "One. Two! Three?");
    }

    #[test]
    fn test_fewer_sentences_than_limit() {
        assert_eq!(summarize("Only one sentence here", 3), "Only one sentence here");
        assert_eq!(summarize("First. Second.", 3), "First. Second.");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(summarize("", 3), "");
        assert_eq!(summarize("   \n ", 3), "");
    }

    #[test]
    fn test_no_split_without_whitespace() {
        assert_eq!(split_sentences("v1.2 is out. Try it"), vec!["v1.2 is out.", "Try it"]);
    }

    #[test]
    fn test_zero_sentences() {
        assert_eq!(summarize("A. B.", 0), "");
    }
}
