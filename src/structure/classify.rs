//! Heading classification.
//!
//! A line is run through an ordered list of [`HeadingRule`]s and the first
//! rule that reaches a decision wins. The default order is:
//!
//! 1. [`ListItemRule`]: bullets and lowercase numbered items are never headings
//! 2. [`NumberingRule`]: structural numbering such as `2.1 Scope`
//! 3. [`LexiconRule`]: common section names such as `References`
//! 4. [`VisualRule`]: bold or large text set apart by whitespace
//! 5. [`UppercaseRule`]: salient all-caps lines the visual tiers missed

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::HeadingLevel;
use crate::parser::LineRecord;

use super::config::HeadingConfig;
use super::stats::FontStatistics;

static LIST_ITEM_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"^\s*\d+\.\s+[a-z]", r"^\s*[•●▪◦\-–*]\s+"]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
});

static NUMBERING_PATTERNS: Lazy<Vec<(Regex, HeadingLevel)>> = Lazy::new(|| {
    [
        (r"^\s*\d+\.\s+[A-Z]", HeadingLevel::H1),
        (r"^\s*\d+\.\d+\s+[A-Z]", HeadingLevel::H2),
        (r"^\s*\d+\.\d+\.\d+\s+[A-Z]", HeadingLevel::H3),
        (r"^\s*[A-Za-z]+\s+(\d+|[A-Z])\s*[:.]\s+[A-Z]", HeadingLevel::H1),
    ]
    .into_iter()
    .filter_map(|(p, level)| Regex::new(p).ok().map(|re| (re, level)))
    .collect()
});

static LEXICON_PATTERNS: Lazy<Vec<(Regex, HeadingLevel)>> = Lazy::new(|| {
    [
        r"(?i)^table\s+of\s+contents\s*$",
        r"(?i)^references\s*$",
        r"(?i)^acknowledgements\s*$",
        r"(?i)^revision\s+history\s*$",
        r"(?i)^summary\s*$",
        r"(?i)^background\s*$",
        r"(?i)^appendix\s+[a-z]\s*(:.*)?$",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok().map(|re| (re, HeadingLevel::H1)))
    .collect()
});

/// Outcome of a single rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The line is definitely not a heading
    Reject,
    /// The line is a heading at this level
    Heading(HeadingLevel),
    /// No opinion; the next rule decides
    Pass,
}

/// Everything a rule may look at when judging a line.
#[derive(Debug, Clone, Copy)]
pub struct LineContext<'a> {
    /// Normalized line text
    pub text: &'a str,
    pub line: &'a LineRecord,
    pub stats: &'a FontStatistics,
    pub config: &'a HeadingConfig,
}

impl LineContext<'_> {
    fn size_ratio(&self) -> f32 {
        self.stats.ratio(self.line.font_size)
    }

    /// Bold or large, set apart by whitespace, and short enough to be a heading.
    fn is_visually_salient(&self) -> bool {
        (self.line.is_bold || self.size_ratio() >= self.config.bold_or_large_ratio)
            && self.line.vertical_gap_above >= self.config.medium_whitespace
            && self.text.split_whitespace().count() <= self.config.max_heading_words
    }
}

/// A single, independent heading heuristic.
pub trait HeadingRule: Send + Sync {
    /// Short rule name used in debug logs.
    fn name(&self) -> &'static str;

    /// Judge one line.
    fn evaluate(&self, ctx: &LineContext<'_>) -> Verdict;

    /// Whether a heading from this rule comes from explicit numbering.
    fn is_pattern_based(&self) -> bool {
        false
    }
}

/// Rejects bullet points and numbered items that start lowercase.
#[derive(Debug, Default)]
pub struct ListItemRule;

impl HeadingRule for ListItemRule {
    fn name(&self) -> &'static str {
        "list-item"
    }

    fn evaluate(&self, ctx: &LineContext<'_>) -> Verdict {
        if LIST_ITEM_PATTERNS.iter().any(|re| re.is_match(ctx.text)) {
            Verdict::Reject
        } else {
            Verdict::Pass
        }
    }
}

/// Levels lines by their section numbering.
#[derive(Debug, Default)]
pub struct NumberingRule;

impl HeadingRule for NumberingRule {
    fn name(&self) -> &'static str {
        "numbering"
    }

    fn evaluate(&self, ctx: &LineContext<'_>) -> Verdict {
        NUMBERING_PATTERNS
            .iter()
            .find(|(re, _)| re.is_match(ctx.text))
            .map(|(_, level)| Verdict::Heading(*level))
            .unwrap_or(Verdict::Pass)
    }

    fn is_pattern_based(&self) -> bool {
        true
    }
}

/// Matches well-known section names against the whole line.
#[derive(Debug, Default)]
pub struct LexiconRule;

impl HeadingRule for LexiconRule {
    fn name(&self) -> &'static str {
        "lexicon"
    }

    fn evaluate(&self, ctx: &LineContext<'_>) -> Verdict {
        LEXICON_PATTERNS
            .iter()
            .find(|(re, _)| re.is_match(ctx.text))
            .map(|(_, level)| Verdict::Heading(*level))
            .unwrap_or(Verdict::Pass)
    }
}

/// Levels visually salient lines by size ratio and weight.
#[derive(Debug, Default)]
pub struct VisualRule;

impl HeadingRule for VisualRule {
    fn name(&self) -> &'static str {
        "visual"
    }

    fn evaluate(&self, ctx: &LineContext<'_>) -> Verdict {
        if !ctx.is_visually_salient() {
            return Verdict::Pass;
        }

        let ratio = ctx.size_ratio();
        let bold = ctx.line.is_bold;
        let config = ctx.config;

        if bold && ratio >= config.h1_ratio {
            Verdict::Heading(HeadingLevel::H1)
        } else if bold && ratio >= config.h2_ratio {
            Verdict::Heading(HeadingLevel::H2)
        } else if bold || ratio >= config.h3_ratio {
            Verdict::Heading(HeadingLevel::H3)
        } else {
            Verdict::Pass
        }
    }
}

/// All-caps salient lines the size tiers did not catch.
#[derive(Debug, Default)]
pub struct UppercaseRule;

impl HeadingRule for UppercaseRule {
    fn name(&self) -> &'static str {
        "uppercase"
    }

    fn evaluate(&self, ctx: &LineContext<'_>) -> Verdict {
        if !ctx.is_visually_salient()
            || !is_all_uppercase(ctx.text)
            || ctx.text.chars().count() <= ctx.config.uppercase_min_chars
        {
            return Verdict::Pass;
        }

        if ctx.size_ratio() >= ctx.config.uppercase_h1_ratio {
            Verdict::Heading(HeadingLevel::H1)
        } else {
            Verdict::Heading(HeadingLevel::H2)
        }
    }
}

/// True when the text has cased letters and none of them is lowercase.
pub fn is_all_uppercase(text: &str) -> bool {
    let mut has_cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}

/// A heading decision for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub level: HeadingLevel,
    /// Set when the level came from explicit section numbering
    pub is_pattern_based: bool,
}

/// Ordered rule set, first decisive rule wins.
pub struct HeadingClassifier {
    config: HeadingConfig,
    rules: Vec<Box<dyn HeadingRule>>,
}

impl HeadingClassifier {
    /// Classifier with the default rule order.
    pub fn new(config: HeadingConfig) -> Self {
        Self::with_rules(
            config,
            vec![
                Box::new(ListItemRule),
                Box::new(NumberingRule),
                Box::new(LexiconRule),
                Box::new(VisualRule),
                Box::new(UppercaseRule),
            ],
        )
    }

    /// Classifier with a custom rule order.
    pub fn with_rules(config: HeadingConfig, rules: Vec<Box<dyn HeadingRule>>) -> Self {
        Self { config, rules }
    }

    pub fn config(&self) -> &HeadingConfig {
        &self.config
    }

    /// Classify one normalized line; `None` means not a heading.
    pub fn classify(
        &self,
        text: &str,
        line: &LineRecord,
        stats: &FontStatistics,
    ) -> Option<Classification> {
        if text.is_empty() {
            return None;
        }

        let ctx = LineContext {
            text,
            line,
            stats,
            config: &self.config,
        };

        for rule in &self.rules {
            match rule.evaluate(&ctx) {
                Verdict::Pass => continue,
                Verdict::Reject => {
                    log::debug!("'{}' rejected by {} rule", text, rule.name());
                    return None;
                }
                Verdict::Heading(level) => {
                    log::debug!("'{}' classified {} by {} rule", text, level, rule.name());
                    return Some(Classification {
                        level,
                        is_pattern_based: rule.is_pattern_based(),
                    });
                }
            }
        }

        None
    }
}

impl Default for HeadingClassifier {
    fn default() -> Self {
        Self::new(HeadingConfig::default())
    }
}

impl std::fmt::Debug for HeadingClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.rules.iter().map(|r| r.name()).collect();
        f.debug_struct("HeadingClassifier")
            .field("config", &self.config)
            .field("rules", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(median: f32) -> FontStatistics {
        FontStatistics {
            median_size: median,
            body_size: median,
            ..FontStatistics::default()
        }
    }

    fn classify(text: &str, size: f32, bold: bool, gap: f32) -> Option<Classification> {
        let line = LineRecord::new(text, size, bold).with_gap(gap);
        HeadingClassifier::default().classify(text, &line, &stats(10.0))
    }

    fn level(text: &str, size: f32, bold: bool, gap: f32) -> Option<HeadingLevel> {
        classify(text, size, bold, gap).map(|c| c.level)
    }

    #[test]
    fn test_numbered_h1_overrides_visual() {
        let c = classify("1. Introduction", 16.0, true, 20.0).unwrap();
        assert_eq!(c.level, HeadingLevel::H1);
        assert!(c.is_pattern_based);
    }

    #[test]
    fn test_numbered_h2_without_visual_signal() {
        let c = classify("2.1 Scope", 11.0, false, 0.0).unwrap();
        assert_eq!(c.level, HeadingLevel::H2);
        assert!(c.is_pattern_based);
    }

    #[test]
    fn test_numbered_h3_and_appendix() {
        assert_eq!(level("3.2.1 Details", 10.0, false, 0.0), Some(HeadingLevel::H3));
        assert_eq!(level("Appendix A: Costs", 10.0, false, 0.0), Some(HeadingLevel::H1));
        assert_eq!(level("Chapter 3. Scope", 10.0, false, 0.0), Some(HeadingLevel::H1));
    }

    #[test]
    fn test_list_items_rejected() {
        assert_eq!(level("1. install the package", 18.0, true, 30.0), None);
        assert_eq!(level("• Overview", 18.0, true, 30.0), None);
        assert_eq!(level("- Overview", 18.0, true, 30.0), None);
        assert_eq!(level("* Overview", 18.0, true, 30.0), None);
    }

    #[test]
    fn test_lexicon_case_insensitive() {
        assert_eq!(level("REFERENCES", 10.0, false, 0.0), Some(HeadingLevel::H1));
        assert_eq!(level("Table of  Contents", 10.0, false, 0.0), Some(HeadingLevel::H1));
        assert_eq!(level("appendix b", 10.0, false, 0.0), Some(HeadingLevel::H1));
        assert_eq!(level("Appendix C: Glossary", 10.0, false, 0.0), Some(HeadingLevel::H1));
        let c = classify("Summary", 10.0, false, 0.0).unwrap();
        assert!(!c.is_pattern_based);
        assert_eq!(level("Summary of results", 10.0, false, 0.0), None);
    }

    #[test]
    fn test_visual_tiers() {
        assert_eq!(level("Overview", 15.0, true, 10.0), Some(HeadingLevel::H1));
        assert_eq!(level("Overview", 12.0, true, 10.0), Some(HeadingLevel::H2));
        assert_eq!(level("Overview", 10.0, true, 10.0), Some(HeadingLevel::H3));
        assert_eq!(level("Overview", 13.0, false, 10.0), Some(HeadingLevel::H3));
    }

    #[test]
    fn test_visual_requires_whitespace_and_brevity() {
        assert_eq!(level("Overview", 15.0, true, 2.0), None);
        let long = vec!["word"; 31].join(" ");
        assert_eq!(level(&long, 15.0, true, 10.0), None);
        assert_eq!(level("Plain body text", 10.0, false, 10.0), None);
    }

    #[test]
    fn test_uppercase_tier_reachable_with_low_salience_ratio() {
        let config = HeadingConfig::new()
            .with_bold_or_large_ratio(1.05)
            .with_level_ratios(1.5, 1.2, 1.1);
        let classifier = HeadingClassifier::new(config);
        let line = LineRecord::new("KEY FINDINGS", 10.7, false).with_gap(12.0);
        let c = classifier
            .classify("KEY FINDINGS", &line, &stats(10.0))
            .unwrap();
        assert_eq!(c.level, HeadingLevel::H2);

        let line = LineRecord::new("Key findings", 10.7, false).with_gap(12.0);
        assert!(classifier
            .classify("Key findings", &line, &stats(10.0))
            .is_none());
    }

    #[test]
    fn test_is_all_uppercase() {
        assert!(is_all_uppercase("HELLO WORLD 2"));
        assert!(!is_all_uppercase("Hello"));
        assert!(!is_all_uppercase("12345"));
    }

    #[test]
    fn test_empty_text_is_not_heading() {
        assert_eq!(level("", 20.0, true, 20.0), None);
    }

    #[test]
    fn test_custom_rule_order() {
        let classifier =
            HeadingClassifier::with_rules(HeadingConfig::default(), vec![Box::new(LexiconRule)]);
        let line = LineRecord::new("1. Introduction", 16.0, true).with_gap(20.0);
        assert!(classifier
            .classify("1. Introduction", &line, &stats(10.0))
            .is_none());
    }
}
