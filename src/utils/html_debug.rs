// src/utils/html_debug.rs
use crate::utils::error::AppError;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Patterns highlighted by `--debug`: question headings and Q:/A: labels.
pub const FAQ_DEBUG_PATTERNS: [(&str, &str); 3] = [
    (r"(?is)<h[2-4][^>]*>(?:[^<]|<[^/]|</[^h])*?\?(?:\s|</[^h][^>]*>)*</h[2-4]>", "heading"),
    (r"(?i)\bQ:", "question"),
    (r"(?i)\bA:", "answer"),
];

/// Wraps each highlight range of `html` in a marker span and writes the
/// result as a standalone page.
pub fn save_debug_html(html: &str, path: &Path, highlights: &[(usize, usize, &str)]) -> Result<(), AppError> {
    let mut debug_html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<style>\n");
    debug_html.push_str(".hl-heading { background-color: #90EE90; }\n");
    debug_html.push_str(".hl-question { background-color: #FFFF00; }\n");
    debug_html.push_str(".hl-answer { background-color: #ADD8E6; }\n");
    debug_html.push_str(".hl-custom { background-color: #FFC0CB; }\n");
    debug_html.push_str("</style>\n</head>\n<body>\n");

    let mut sorted = highlights.to_vec();
    sorted.sort_by_key(|h| h.0);

    let mut last_pos = 0;
    for (start, end, kind) in sorted {
        // Overlapping ranges keep the earlier one.
        if start < last_pos || end > html.len() || !html.is_char_boundary(start) || !html.is_char_boundary(end) {
            continue;
        }
        debug_html.push_str(&html[last_pos..start]);

        let css_class = match kind {
            "heading" | "question" | "answer" => format!("hl-{}", kind),
            _ => "hl-custom".to_string(),
        };
        debug_html.push_str(&format!(
            "<span class=\"{}\" title=\"{} {}-{}\">{}</span>",
            css_class, kind, start, end, &html[start..end]
        ));
        last_pos = end;
    }
    debug_html.push_str(&html[last_pos..]);
    debug_html.push_str("\n</body>\n</html>");

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, debug_html)?;

    tracing::info!("Saved debug HTML to {}", path.display());
    Ok(())
}

/// Highlights every match of `patterns` (regex, kind) in `html`.
pub fn create_debug_html(html: &str, path: &Path, patterns: &[(&str, &str)]) -> Result<usize, AppError> {
    let mut highlights = Vec::new();

    for (pattern, kind) in patterns {
        let re = Regex::new(pattern).map_err(|e| {
            AppError::Config(format!("Invalid regex pattern '{}': {}", pattern, e))
        })?;
        highlights.extend(re.find_iter(html).map(|m| (m.start(), m.end(), *kind)));
    }

    save_debug_html(html, path, &highlights)?;
    Ok(highlights.len())
}
