// src/render/block.rs
use crate::config::PresentationStyle;
use crate::extractors::FaqItem;
use crate::utils::dom::escape_text;

pub const BLOCK_TITLE: &str = "Frequently Asked Questions";

const BLOCK_STYLE: &str = "<style>\n\
.faq-block { margin: 2em 0; }\n\
.faq-block .faq-title { margin-bottom: 0.75em; }\n\
.faq-block .faq-item { border-bottom: 1px solid #e2e2e2; padding: 0.75em 0; }\n\
.faq-block summary.faq-question { cursor: pointer; font-weight: 600; }\n\
.faq-block p.faq-question { margin: 0 0 0.4em; font-weight: 600; }\n\
.faq-block .faq-answer { margin-top: 0.4em; }\n\
</style>";

/// Rendering options for the FAQ block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockOptions {
    pub presentation_style: PresentationStyle,
}

/// Renders the FAQ block. `items` answers are expected to be sanitized
/// rich text already; questions are plain text and get escaped here.
pub fn build_block(items: &[FaqItem], options: &BlockOptions) -> String {
    let body: String = items
        .iter()
        .map(|item| render_item(item, options.presentation_style))
        .collect();
    wrap(&body)
}

/// Wraps an already-sanitized HTML body (e.g. an unstructured AI reply)
/// in the same container, title and styles as [`build_block`].
pub fn build_raw_block(body_html: &str) -> String {
    wrap(body_html)
}

fn render_item(item: &FaqItem, style: PresentationStyle) -> String {
    let question = escape_text(&item.question);
    match style {
        PresentationStyle::Disclosure => format!(
            "<details class=\"faq-item\"><summary class=\"faq-question\">{}</summary>\
             <div class=\"faq-answer\">{}</div></details>\n",
            question, item.answer
        ),
        PresentationStyle::Static => format!(
            "<div class=\"faq-item\"><p class=\"faq-question\"><strong>{}</strong></p>\
             <div class=\"faq-answer\">{}</div></div>\n",
            question, item.answer
        ),
    }
}

fn wrap(body: &str) -> String {
    format!(
        "<div class=\"faq-block\">\n<h2 class=\"faq-title\">{}</h2>\n<div class=\"faq-items\">\n{}</div>\n</div>\n{}\n",
        BLOCK_TITLE, body, BLOCK_STYLE
    )
}
