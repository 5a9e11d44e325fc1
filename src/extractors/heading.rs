// src/extractors/heading.rs

// --- Imports ---
use super::{FaqItem, Matcher};
use crate::utils::dom::{element_text, next_element_sibling};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

// --- CSS Selectors (Lazy Static) ---
// Question headings are searched level by level: all h2 first, then h3, then h4.
static QUESTION_HEADING_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["h2", "h3", "h4"]
        .iter()
        .map(|tag| Selector::parse(tag).expect("Failed to compile heading selector"))
        .collect()
});

// Tags accepted as the answer block following a question heading.
const ANSWER_TAGS: [&str; 2] = ["p", "div"];

// --- Regex Patterns (Lazy Static) ---
// Em dash, en dash or hyphen, with any surrounding whitespace.
static DASH_SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*[\u{2014}\u{2013}-]\s*").expect("Failed to compile DASH_SEPARATOR_RE")
});

/// Finds `<h2>`-`<h4>` headings ending in `?` and pairs them with the
/// paragraph that follows, or with the text after a dash in the heading itself.
pub struct HeadingMatcher;

impl Matcher for HeadingMatcher {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn find(&self, html: &str) -> Vec<FaqItem> {
        let document = Html::parse_document(html);
        let mut items = Vec::new();

        for selector in QUESTION_HEADING_SELECTORS.iter() {
            for heading in document.select(selector) {
                let heading_text = element_text(heading);
                let heading_text = heading_text.trim();
                if !heading_text.ends_with('?') {
                    continue;
                }

                let pair = sibling_answer(heading)
                    .map(|answer| (heading_text.to_string(), answer))
                    .or_else(|| split_on_dash(heading_text));

                match pair.and_then(|(q, a)| FaqItem::from_plain_text(&q, &a)) {
                    Some(item) => {
                        tracing::trace!("Heading <{}> matched: '{}'", heading.value().name(), item.question);
                        items.push(item);
                    }
                    None => {
                        tracing::trace!("Question heading without answer: '{}'", heading_text);
                    }
                }
            }
        }

        items
    }
}

/// Text of the next element sibling when it is a paragraph or div.
fn sibling_answer(heading: ElementRef<'_>) -> Option<String> {
    let next = next_element_sibling(heading)?;
    if !ANSWER_TAGS.contains(&next.value().name()) {
        return None;
    }

    let text = element_text(next);
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// "Question - answer" within a single heading. Exactly two non-empty parts.
fn split_on_dash(text: &str) -> Option<(String, String)> {
    let parts: Vec<&str> = DASH_SEPARATOR_RE.split(text).map(str::trim).collect();
    match parts.as_slice() {
        [question, answer] if !question.is_empty() && !answer.is_empty() => {
            Some((question.to_string(), answer.to_string()))
        }
        _ => None,
    }
}
