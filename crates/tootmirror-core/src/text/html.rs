//! HTML to plain text conversion for source post bodies
//!
//! Mastodon delivers status content as a small, predictable HTML subset:
//! paragraphs, line breaks, links (whose text is already the visible URL,
//! mention or hashtag) and spans. Link targets are dropped and only the
//! visible text is kept.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use tracing::warn;

struct Patterns {
    line_break: Regex,
    paragraph_break: Regex,
    tag: Regex,
    entity: Regex,
    blank_lines: Regex,
}

static PATTERNS: OnceLock<Option<Patterns>> = OnceLock::new();

fn compile_patterns() -> Result<Patterns, regex::Error> {
    Ok(Patterns {
        line_break: Regex::new(r"(?i)<br\s*/?>")?,
        paragraph_break: Regex::new(r"(?i)</p>\s*<p[^>]*>")?,
        tag: Regex::new(r"<[^>]*>")?,
        entity: Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);")?,
        blank_lines: Regex::new(r"\n{3,}")?,
    })
}

fn patterns() -> Option<&'static Patterns> {
    PATTERNS
        .get_or_init(|| match compile_patterns() {
            Ok(patterns) => Some(patterns),
            Err(e) => {
                warn!(error = %e, "Failed to compile HTML patterns");
                None
            }
        })
        .as_ref()
}

/// Convert a status body from HTML to plain text.
///
/// Paragraphs become blank-line separated, `<br>` becomes a newline, all other
/// tags are removed and character entities are decoded.
pub fn html_to_text(html: &str) -> String {
    let Some(p) = patterns() else {
        return html.trim().to_string();
    };

    let text = p.line_break.replace_all(html, "\n");
    let text = p.paragraph_break.replace_all(&text, "\n\n");
    let text = p.tag.replace_all(&text, "");
    let text = p.entity.replace_all(&text, |caps: &Captures| decode_entity(&caps[0], &caps[1]));
    let text = p.blank_lines.replace_all(&text, "\n\n");

    text.trim().to_string()
}

/// Decode a single entity body (`amp`, `#39`, `#x27`); unknown entities are
/// kept verbatim.
fn decode_entity(raw: &str, body: &str) -> String {
    let decoded = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = body.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        match body {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ => None,
        }
    };

    decoded.map_or_else(|| raw.to_string(), String::from)
}
