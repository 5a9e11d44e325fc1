// src/extractors/dedup.rs
use super::FaqItem;
use std::collections::HashSet;

/// Removes case-insensitive duplicates, keeping the first occurrence and
/// the original order.
///
/// The key is a (question, answer) tuple rather than a joined string, so a
/// question that happens to contain a separator can never collide with a
/// different pair.
pub fn dedupe(items: Vec<FaqItem>) -> Vec<FaqItem> {
    let mut seen: HashSet<(String, String)> = HashSet::with_capacity(items.len());
    let before = items.len();

    let unique: Vec<FaqItem> = items
        .into_iter()
        .filter(|item| seen.insert(dedupe_key(item)))
        .collect();

    if unique.len() < before {
        tracing::debug!("Dropped {} duplicate FAQ item(s)", before - unique.len());
    }
    unique
}

fn dedupe_key(item: &FaqItem) -> (String, String) {
    (
        item.question.trim().to_lowercase(),
        item.answer.trim().to_lowercase(),
    )
}
