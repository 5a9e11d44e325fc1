// src/sanitize.rs
//! Text normalization for extracted questions (plain text) and answers
//! (paragraph-wrapped, allow-listed HTML).

use crate::utils::dom::{escape_attr, escape_text, plain_text};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{node::Node, ElementRef, Html};

/// Maximum length of a short field, in Unicode scalar values.
pub const SHORT_TEXT_MAX_CHARS: usize = 400;

// Tag -> permitted attributes.
const ALLOWED_TAGS: [(&str, &[&str]); 7] = [
    ("a", &["href", "title"]),
    ("br", &[]),
    ("p", &[]),
    ("b", &[]),
    ("strong", &[]),
    ("i", &[]),
    ("em", &[]),
];

const ALLOWED_URL_SCHEMES: [&str; 5] = ["http", "https", "mailto", "ftp", "tel"];

static BLANK_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n[ \t]*\n\s*").expect("Failed to compile BLANK_LINE_RE")
});

// Chunks that already open with a block element are not wrapped again.
static LEADING_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^<(?:p|div|ul|ol|dl|h[1-6]|blockquote|table|pre|section|article)\b")
        .expect("Failed to compile LEADING_BLOCK_RE")
});

/// Plain-text field: markup stripped, whitespace collapsed, trimmed and
/// truncated to [`SHORT_TEXT_MAX_CHARS`] characters.
pub fn sanitize_short(text: &str) -> String {
    let stripped = plain_text(text);
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(&collapsed, SHORT_TEXT_MAX_CHARS)
}

/// Rich-text field: paragraph-wrapped, then filtered down to the allow-list.
pub fn sanitize_long(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    filter_allowed(&auto_paragraph(trimmed))
}

/// Truncates on a character boundary, never inside a multi-byte sequence.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Blank lines start new paragraphs; remaining single newlines become `<br />`.
pub fn auto_paragraph(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

    BLANK_LINE_RE
        .split(&normalized)
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| {
            if LEADING_BLOCK_RE.is_match(chunk) {
                chunk.to_string()
            } else {
                let lines = chunk.lines().map(str::trim).collect::<Vec<_>>();
                format!("<p>{}</p>", lines.join("<br />\n"))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Re-serializes `html` keeping only allow-listed tags and attributes.
/// Disallowed elements lose their markup but keep their text.
pub fn filter_allowed(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::with_capacity(html.len());
    write_filtered(fragment.root_element(), &mut out);
    out
}

fn write_filtered(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&escape_text(text)),
            Node::Element(el) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                let name = el.name();
                let Some(permitted) = allowed_attributes(name) else {
                    tracing::trace!("Dropping disallowed tag <{}>", name);
                    write_filtered(child_el, out);
                    continue;
                };

                out.push('<');
                out.push_str(name);
                for attr in permitted {
                    let Some(value) = el.attr(attr) else {
                        continue;
                    };
                    if *attr == "href" && !is_safe_url(value) {
                        tracing::debug!("Dropping unsafe href {:?}", value);
                        continue;
                    }
                    out.push_str(&format!(" {}=\"{}\"", attr, escape_attr(value)));
                }

                if name == "br" {
                    out.push_str(" />");
                    continue;
                }
                out.push('>');
                write_filtered(child_el, out);
                out.push_str(&format!("</{}>", name));
            }
            _ => {} // Comments and doctypes are never re-emitted
        }
    }
}

fn allowed_attributes(tag: &str) -> Option<&'static [&'static str]> {
    ALLOWED_TAGS
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, attrs)| *attrs)
}

/// Relative URLs pass; absolute ones must use a permitted scheme.
fn is_safe_url(url: &str) -> bool {
    // Browsers ignore embedded whitespace and control chars in the scheme.
    let compact: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    let scheme_end = compact.find(':');
    let path_start = compact.find(['/', '?', '#']);
    match (scheme_end, path_start) {
        (None, _) => true,
        (Some(colon), Some(path)) if path < colon => true,
        (Some(colon), _) => ALLOWED_URL_SCHEMES.contains(&&compact[..colon]),
    }
}
