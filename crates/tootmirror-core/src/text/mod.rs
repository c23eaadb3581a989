//! Weighted length accounting for the destination platform
//!
//! Implements the twitter-text v3 counting rules: text is NFC-normalized,
//! every URL (with or without a scheme) counts as [`URL_WEIGHT`], an emoji
//! sequence counts as
//! [`EMOJI_WEIGHT`], and any other code point counts 1 inside the
//! light-weight ranges and 2 outside them.
//!
//! Counting and truncation share the same unit, a [`Segment`]: either a whole
//! URL or a cluster of code points that must never be split (an emoji sequence,
//! a flag, or a base character with its combining marks).

pub mod html;

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;
use unicode_normalization::UnicodeNormalization;

/// Weight of any URL, whatever its length
pub const URL_WEIGHT: usize = 23;

/// Weight of a single emoji sequence
pub const EMOJI_WEIGHT: usize = 2;

/// Code point ranges that count as a single character
const LIGHT_RANGES: [(u32, u32); 4] = [
    (0x0000, 0x10FF),
    (0x2000, 0x200D),
    (0x2010, 0x201F),
    (0x2032, 0x2037),
];

const ZWJ: char = '\u{200D}';
const VARIATION_SELECTOR_EMOJI: char = '\u{FE0F}';
const KEYCAP: char = '\u{20E3}';

/// Generic top-level domains recognised in URLs written without a scheme.
/// Any two-letter label is taken as a country-code domain.
const GENERIC_TLDS: &[&str] = &[
    "aero", "app", "art", "asia", "biz", "blog", "cat", "cloud", "club", "com", "coop", "design",
    "dev", "edu", "email", "gov", "info", "int", "jobs", "link", "live", "media", "mil", "mobi",
    "museum", "name", "net", "network", "news", "online", "org", "page", "pro", "shop", "site",
    "social", "space", "store", "tech", "tel", "today", "travel", "website", "wiki", "xyz", "zone",
];

static URL_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

fn url_regex() -> Option<&'static Regex> {
    const PATTERN: &str = concat!(
        r"(?i)(?P<scheme>\bhttps?://)[^\s<>]+",
        r"|(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z]{2,}\b(?::\d{1,5})?(?:/[^\s<>]*)?",
    );

    URL_PATTERN
        .get_or_init(|| match Regex::new(PATTERN) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!(error = %e, "Failed to compile URL regex");
                None
            }
        })
        .as_ref()
}

/// A weighted unit of text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Url(&'a str),
    Cluster(&'a str),
}

impl<'a> Segment<'a> {
    pub fn as_str(&self) -> &'a str {
        match self {
            Segment::Url(s) | Segment::Cluster(s) => s,
        }
    }

    pub fn weight(&self) -> usize {
        match self {
            Segment::Url(_) => URL_WEIGHT,
            Segment::Cluster(s) => cluster_weight(s),
        }
    }
}

/// Normalize text to NFC, the form the destination counts in
pub fn normalize(text: &str) -> String {
    text.nfc().collect()
}

/// Weighted length of `text` under destination counting rules.
///
/// Total for any input; the empty string weighs 0.
pub fn weighted_length(text: &str) -> usize {
    let normalized = normalize(text);
    segments(&normalized).iter().map(Segment::weight).sum()
}

/// Longest segment-aligned prefix of `text` whose weight fits in `budget`.
///
/// The returned prefix is NFC-normalized. A URL or emoji sequence that does
/// not fit is dropped whole.
pub fn truncate_to_weight(text: &str, budget: usize) -> String {
    let normalized = normalize(text);
    let mut used = 0;
    let mut end = 0;

    for segment in segments(&normalized) {
        let weight = segment.weight();
        if used + weight > budget {
            break;
        }
        used += weight;
        end += segment.as_str().len();
    }

    normalized[..end].to_string()
}

/// Split already-normalized text into weighted segments, in order.
///
/// Concatenating the segments reproduces `text` exactly.
pub fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut cursor = 0;

    for span in url_spans(text) {
        push_clusters(&text[cursor..span.start], &mut out);
        out.push(Segment::Url(&text[span.clone()]));
        cursor = span.end;
    }
    push_clusters(&text[cursor..], &mut out);

    out
}

fn url_spans(text: &str) -> Vec<Range<usize>> {
    let Some(re) = url_regex() else {
        return Vec::new();
    };

    re.captures_iter(text)
        .filter_map(|caps| {
            let m = caps.get(0)?;
            let url = trim_url(m.as_str());
            let accepted = match caps.name("scheme") {
                Some(scheme) => url.len() > scheme.len(),
                None => {
                    let preceding = text[..m.start()].chars().next_back();
                    !preceding.is_some_and(blocks_bare_domain) && is_bare_domain_url(url)
                }
            };
            accepted.then(|| m.start()..m.start() + url.len())
        })
        .collect()
}

/// Characters that make a following `name.tld` part of a larger token
/// (an email address, a mention or a path) instead of a link
fn blocks_bare_domain(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '@' | '.' | '-' | '_' | '/')
}

/// Whether a schemeless match names a real-looking host.
///
/// The last label must be a known generic domain or a two-letter country
/// code. A bare `name.cc` with no subdomain and no path stays text, so file
/// names such as `setup.py` are not counted as links.
fn is_bare_domain_url(url: &str) -> bool {
    let host_end = url.find([':', '/']).unwrap_or(url.len());
    let host = &url[..host_end];
    let has_path = url[host_end..].contains('/');
    let Some(tld) = host.rsplit('.').next() else {
        return false;
    };
    let tld = tld.to_ascii_lowercase();

    if GENERIC_TLDS.contains(&tld.as_str()) {
        return true;
    }
    let country_code = tld.len() == 2 && tld.bytes().all(|b| b.is_ascii_alphabetic());
    country_code && (has_path || host.matches('.').count() > 1)
}

/// Drop sentence punctuation that trails a URL
fn trim_url(url: &str) -> &str {
    let mut end = url.len();

    while let Some(c) = url[..end].chars().next_back() {
        let head = &url[..end];
        let strip = match c {
            '.' | ',' | ':' | ';' | '!' | '?' | '"' | '\'' => true,
            ')' => head.matches('(').count() < head.matches(')').count(),
            _ => false,
        };
        if !strip {
            break;
        }
        end -= c.len_utf8();
    }

    &url[..end]
}

fn push_clusters<'a>(text: &'a str, out: &mut Vec<Segment<'a>>) {
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        let mut end = start + c.len_utf8();
        let emoji = is_emoji_base(c);

        // Flags are pairs of regional indicators
        if is_regional_indicator(c) {
            if let Some(&(i, next)) = chars.peek() {
                if is_regional_indicator(next) {
                    chars.next();
                    end = i + next.len_utf8();
                }
            }
        }

        loop {
            match chars.peek().copied() {
                Some((i, next)) if is_extender(next) => {
                    chars.next();
                    end = i + next.len_utf8();
                }
                Some((i, ZWJ)) if emoji => {
                    chars.next();
                    end = i + ZWJ.len_utf8();
                    if let Some((j, joined)) = chars.next() {
                        end = j + joined.len_utf8();
                    }
                }
                _ => break,
            }
        }

        out.push(Segment::Cluster(&text[start..end]));
    }
}

fn cluster_weight(cluster: &str) -> usize {
    let Some(first) = cluster.chars().next() else {
        return 0;
    };

    let is_emoji = is_emoji_base(first)
        || cluster
            .chars()
            .any(|c| c == VARIATION_SELECTOR_EMOJI || c == KEYCAP);

    if is_emoji {
        EMOJI_WEIGHT
    } else {
        cluster.chars().map(code_point_weight).sum()
    }
}

fn code_point_weight(c: char) -> usize {
    let cp = c as u32;
    if LIGHT_RANGES
        .iter()
        .any(|&(start, end)| (start..=end).contains(&cp))
    {
        1
    } else {
        2
    }
}

fn is_emoji_base(c: char) -> bool {
    matches!(c as u32,
        0x1F000..=0x1FAFF
        | 0x2300..=0x23FF
        | 0x2600..=0x27BF
        | 0x2B00..=0x2BFF
    )
}

fn is_regional_indicator(c: char) -> bool {
    matches!(c as u32, 0x1F1E6..=0x1F1FF)
}

/// Code points that extend the preceding cluster
fn is_extender(c: char) -> bool {
    matches!(c as u32,
        0xFE00..=0xFE0F      // variation selectors
        | 0x1F3FB..=0x1F3FF  // skin tone modifiers
        | 0x20E3             // combining keycap
        | 0xE0020..=0xE007F  // tag sequences
        | 0x0300..=0x036F    // combining diacritics
        | 0x1AB0..=0x1AFF
        | 0x1DC0..=0x1DFF
        | 0x20D0..=0x20E2
        | 0xFE20..=0xFE2F
    )
}
