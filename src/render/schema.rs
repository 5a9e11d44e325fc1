// src/render/schema.rs
//! FAQPage structured data (schema.org JSON-LD).

use crate::extractors::FaqItem;
use crate::utils::dom::plain_text;
use serde::{Deserialize, Serialize};

pub const SCHEMA_CONTEXT: &str = "https://schema.org";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqSchema {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "@type")]
    pub schema_type: String,
    #[serde(rename = "mainEntity")]
    pub main_entity: Vec<QuestionEntity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionEntity {
    #[serde(rename = "@type")]
    pub schema_type: String,
    pub name: String,
    #[serde(rename = "acceptedAnswer")]
    pub accepted_answer: AnswerEntity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEntity {
    #[serde(rename = "@type")]
    pub schema_type: String,
    pub text: String,
}

/// Maps items to FAQPage entries in order. Both `name` and `text` are
/// plain text, whatever markup the display answer carries.
pub fn build_schema(items: &[FaqItem]) -> FaqSchema {
    FaqSchema {
        context: SCHEMA_CONTEXT.to_string(),
        schema_type: "FAQPage".to_string(),
        main_entity: items
            .iter()
            .map(|item| QuestionEntity {
                schema_type: "Question".to_string(),
                name: collapse_whitespace(&item.question),
                accepted_answer: AnswerEntity {
                    schema_type: "Answer".to_string(),
                    text: collapse_whitespace(&plain_text(&item.answer)),
                },
            })
            .collect(),
    }
}

/// Pretty JSON. serde_json leaves `/` and non-ASCII characters unescaped.
pub fn to_json(schema: &FaqSchema) -> serde_json::Result<String> {
    serde_json::to_string_pretty(schema)
}

/// JSON-LD `<script>` element for embedding in a page.
///
/// `<`, `>` and `&` only ever occur inside JSON strings here, so they are
/// written as `\u003c`, `\u003e` and `\u0026`. The payload then holds no
/// markup at all and cannot end the element or switch the HTML tokenizer
/// into an escaped script state (`<!--<script`).
pub fn to_script_tag(schema: &FaqSchema) -> serde_json::Result<String> {
    let json = escape_for_script(&to_json(schema)?);
    Ok(format!("<script type=\"application/ld+json\">\n{}\n</script>", json))
}

fn escape_for_script(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            _ => out.push(c),
        }
    }
    out
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
