// src/extractors/mod.rs
pub mod dedup;
pub mod heading;
pub mod label;
pub mod sentence;

use crate::sanitize::{sanitize_long, sanitize_short};
use crate::utils::dom::escape_text;
use serde::{Deserialize, Serialize};

pub use dedup::dedupe;
pub use heading::HeadingMatcher;
pub use label::LabelMatcher;
pub use sentence::SentenceMatcher;

/// One extracted question/answer pair.
///
/// `question` is plain text (see [`crate::sanitize::sanitize_short`]);
/// `answer` is allow-listed HTML (see [`crate::sanitize::sanitize_long`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

impl FaqItem {
    /// Builds an item from plain (already tag-free, entity-decoded) text.
    /// Returns `None` when either side is empty after sanitizing.
    pub fn from_plain_text(question: &str, answer: &str) -> Option<Self> {
        let question = sanitize_short(&escape_text(question));
        let answer = sanitize_long(&escape_text(answer));
        if question.is_empty() || answer.is_empty() {
            return None;
        }
        Some(Self { question, answer })
    }
}

/// A single extraction strategy. Implementations must never panic on
/// malformed input; "nothing found" is an empty vector.
pub trait Matcher: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn find(&self, html: &str) -> Vec<FaqItem>;
}

/// Runs matchers in priority order and keeps the first non-empty result.
pub struct FaqExtractor {
    matchers: Vec<Box<dyn Matcher>>,
}

impl FaqExtractor {
    /// Heading, then label, then sentence fallback.
    pub fn new() -> Self {
        Self::with_matchers(vec![
            Box::new(HeadingMatcher),
            Box::new(LabelMatcher),
            Box::new(SentenceMatcher),
        ])
    }

    pub fn with_matchers(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }

    /// Extracts deduplicated FAQ items. An empty vector means no FAQs were found.
    pub fn extract(&self, html: &str) -> Vec<FaqItem> {
        for matcher in &self.matchers {
            let found = matcher.find(html);
            tracing::debug!("Matcher '{}' produced {} candidate(s)", matcher.name(), found.len());

            if !found.is_empty() {
                let items = dedupe(found);
                tracing::debug!("Using '{}' results: {} unique item(s)", matcher.name(), items.len());
                return items;
            }
        }

        tracing::debug!("No matcher found any FAQ content");
        Vec::new()
    }
}

impl Default for FaqExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts FAQ items from `html` with the default matcher chain.
pub fn extract(html: &str) -> Vec<FaqItem> {
    FaqExtractor::new().extract(html)
}
