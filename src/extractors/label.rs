// src/extractors/label.rs
use super::{FaqItem, Matcher};
use crate::utils::dom::plain_text;
use once_cell::sync::Lazy;
use regex::Regex;

// "Q: <question> A:" up to the start of the answer.
static LABEL_PAIR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)\bQ:\s*(.+?)\s*\bA:\s*").expect("Failed to compile LABEL_PAIR_RE")
});

// The answer runs until the next question marker.
static QUESTION_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bQ:").expect("Failed to compile QUESTION_MARKER_RE")
});

/// Finds `Q: ... A: ...` sequences in the document's plain text.
pub struct LabelMatcher;

impl Matcher for LabelMatcher {
    fn name(&self) -> &'static str {
        "label"
    }

    fn find(&self, html: &str) -> Vec<FaqItem> {
        let text = normalized_lines(&plain_text(html));
        let mut items = Vec::new();
        let mut pos = 0;

        while let Some(caps) = LABEL_PAIR_RE.captures_at(&text, pos) {
            let (Some(whole), Some(question)) = (caps.get(0), caps.get(1)) else {
                break;
            };

            // The answer needs at least one character before the next marker counts.
            let answer_start = whole.end();
            let Some(first) = text[answer_start..].chars().next() else {
                break;
            };
            let answer_end = QUESTION_MARKER_RE
                .find_at(&text, answer_start + first.len_utf8())
                .map_or(text.len(), |m| m.start());

            let question = question.as_str().trim();
            let answer = text[answer_start..answer_end].trim();
            if let Some(item) = FaqItem::from_plain_text(question, answer) {
                items.push(item);
            }

            pos = answer_end;
        }

        items
    }
}

/// Unifies line endings, trims every line and drops the blank ones.
fn normalized_lines(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
