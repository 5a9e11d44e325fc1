// src/extractors/sentence.rs
use super::{FaqItem, Matcher};
use crate::utils::dom::plain_text;
use once_cell::sync::Lazy;
use regex::Regex;

const MIN_QUESTION_CHARS: usize = 10; // exclusive
const MIN_ANSWER_CHARS: usize = 3; // exclusive

// Terminal punctuation, whitespace, then an uppercase letter or digit.
static SENTENCE_BOUNDARY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([.?!])\s+([\p{Lu}\p{Nd}])").expect("Failed to compile SENTENCE_BOUNDARY_RE")
});

/// Last-resort matcher: a sentence ending in `?` followed by any sentence.
///
/// Adjacent pairs are examined independently, so a sentence used as an
/// answer may also be picked up as the next question.
pub struct SentenceMatcher;

impl Matcher for SentenceMatcher {
    fn name(&self) -> &'static str {
        "sentence"
    }

    fn find(&self, html: &str) -> Vec<FaqItem> {
        let sentences = split_sentences(&plain_text(html));

        sentences
            .windows(2)
            .filter(|pair| {
                let (question, answer) = (&pair[0], &pair[1]);
                question.ends_with('?')
                    && question.chars().count() > MIN_QUESTION_CHARS
                    && answer.chars().count() > MIN_ANSWER_CHARS
            })
            .filter_map(|pair| FaqItem::from_plain_text(&pair[0], &pair[1]))
            .collect()
    }
}

/// Splits text into whitespace-collapsed sentence units.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut units = Vec::new();
    let mut start = 0;

    for caps in SENTENCE_BOUNDARY_RE.captures_iter(text) {
        let (Some(punct), Some(next)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        units.push(&text[start..punct.end()]);
        start = next.start();
    }
    units.push(&text[start..]);

    units
        .into_iter()
        .map(|unit| unit.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|unit| !unit.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences() {
        let units = split_sentences("Is this split? Yes it is. 3 items follow! ok. lowercase stays");
        assert_eq!(units, vec!["Is this split?", "Yes it is.", "3 items follow! ok. lowercase stays"]);
    }

    #[test]
    fn test_split_is_unicode_aware() {
        let units = split_sentences("Ça marche vraiment? Élodie dit oui.");
        assert_eq!(units, vec!["Ça marche vraiment?", "Élodie dit oui."]);
    }

    #[test]
    fn test_question_followed_by_answer() {
        let items = SentenceMatcher.find("<p>Intro text here. How does billing work? Monthly, in advance. Thanks.</p>");

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].question, "How does billing work?");
        assert_eq!(items[0].answer, "<p>Monthly, in advance.</p>");
    }

    #[test]
    fn test_length_thresholds() {
        // "Why not?" is too short to be a question; "No." is too short to be an answer.
        assert!(SentenceMatcher.find("Why not? Because it is.").is_empty());
        assert!(SentenceMatcher.find("Is this long enough? No.").is_empty());
        assert_eq!(SentenceMatcher.find("Is this long enough? Nope.").len(), 1);
    }

    #[test]
    fn test_overlapping_reuse_is_preserved() {
        let items = SentenceMatcher.find("What does it cost today? Is it really free for all? Yes, always.");

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].question, "What does it cost today?");
        assert_eq!(items[0].answer, "<p>Is it really free for all?</p>");
        assert_eq!(items[1].question, "Is it really free for all?");
        assert_eq!(items[1].answer, "<p>Yes, always.</p>");
    }

    #[test]
    fn test_block_boundaries_act_as_whitespace() {
        let items = SentenceMatcher.find("<p>Where are you located?</p><p>In the city centre.</p>");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].question, "Where are you located?");
    }
}
