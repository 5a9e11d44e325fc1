// src/utils/dom.rs
//! Small tree-walk helpers shared by the matchers and the sanitizer.

use scraper::{node::Node, ElementRef, Html};

// Elements whose text never reaches the reader.
const SKIPPED_ELEMENTS: [&str; 5] = ["script", "style", "noscript", "template", "head"];

// Elements that start a new line when flattened to text.
const BLOCK_ELEMENTS: [&str; 29] = [
    "address", "article", "aside", "blockquote", "br", "dd", "details", "div", "dl", "dt",
    "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li",
    "main", "ol", "p", "pre", "section", "summary", "tr",
];

/// Returns the first element that follows `element` among its siblings,
/// skipping text, comment and other non-element nodes.
pub fn next_element_sibling(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

/// Text content of an element, with block boundaries turned into newlines.
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    out
}

/// Strips all markup from an HTML string and returns its text.
///
/// Broken markup is tolerated the way a browser tolerates it; script and
/// style contents are dropped entirely. Entities are decoded. Line breaks
/// are kept between block-level elements so sentence and label patterns
/// still see word boundaries.
pub fn plain_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    element_text(fragment.root_element())
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_ELEMENTS.contains(&name) {
                    continue;
                }
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                let is_block = BLOCK_ELEMENTS.contains(&name);
                if is_block {
                    push_newline(out);
                }
                collect_text(child_el, out);
                if is_block {
                    push_newline(out);
                }
            }
            _ => {} // Comments, doctypes, processing instructions
        }
    }
}

fn push_newline(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Escapes text for use between tags.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes text for use inside a double-quoted attribute value.
pub fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    #[test]
    fn test_next_element_sibling_skips_text_and_comments() {
        let html = "<h2>Why?</h2>\n  <!-- note -->\n  text <p>Because.</p>";
        let doc = Html::parse_fragment(html);
        let h2 = doc.select(&Selector::parse("h2").unwrap()).next().unwrap();

        let next = next_element_sibling(h2).expect("sibling element");
        assert_eq!(next.value().name(), "p");
    }

    #[test]
    fn test_next_element_sibling_none_at_end() {
        let doc = Html::parse_fragment("<div><h2>Last?</h2> trailing text</div>");
        let h2 = doc.select(&Selector::parse("h2").unwrap()).next().unwrap();
        assert!(next_element_sibling(h2).is_none());
    }

    #[test]
    fn test_plain_text_separates_blocks_and_drops_scripts() {
        let text = plain_text("<p>What is it?</p><p>It is a thing.</p><script>alert(1)</script>");
        assert_eq!(text.trim(), "What is it?\nIt is a thing.");
        assert!(!text.contains("alert"));
    }

    #[test]
    fn test_plain_text_tolerates_broken_markup() {
        let text = plain_text("<div><p>Unclosed <b>bold <i>nest</div></b> tail &amp; more");
        assert!(text.contains("Unclosed bold nest"));
        assert!(text.contains("tail & more"));
    }

    #[test]
    fn test_escape_helpers() {
        assert_eq!(escape_text("a < b & c > d"), "a &lt; b &amp; c &gt; d");
        assert_eq!(escape_attr(r#"say "hi" & 'bye'"#), "say &quot;hi&quot; &amp; &#39;bye&#39;");
    }
}
