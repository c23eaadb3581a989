//! Fitting mirrored text into the destination character limit

use crate::policy::MirrorPolicy;
use crate::text::{truncate_to_weight, weighted_length};

/// Join the non-empty parts with a single space
fn join_nonempty<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Compose `body` followed by `extras` within `policy.character_limit`.
///
/// The fit check measures `body + " " + extras` without the ellipsis marker,
/// so text that fits the limit exactly is returned unchanged even when adding
/// the marker would overflow it. Otherwise the body is cut on segment
/// boundaries and followed by the extras and the ellipsis marker:
///
/// ```text
/// budget = limit - weighted_length(" " + extras + " " + ellipsis)
/// result = body[..budget] + " " + extras + " " + ellipsis
/// ```
///
/// Extras are never shortened. If they alone do not fit, the result is just
/// the extras and the marker, which may exceed the limit.
pub fn compose<S: AsRef<str>>(body: &str, extras: &[S], policy: &MirrorPolicy) -> String {
    let extra = join_nonempty(extras.iter().map(AsRef::as_ref));
    let untruncated = join_nonempty([body, extra.as_str()]);

    if weighted_length(&untruncated) <= policy.character_limit {
        return untruncated;
    }

    let tail = join_nonempty([extra.as_str(), policy.ellipsis_marker.as_str()]);
    let reserved = weighted_length(&format!(" {tail}"));
    let budget = policy.character_limit.saturating_sub(reserved);

    let prefix = truncate_to_weight(body, budget);
    join_nonempty([prefix.trim_end(), tail.as_str()])
}

/// True when [`compose`] had to cut the body
pub fn needs_truncation<S: AsRef<str>>(body: &str, extras: &[S], policy: &MirrorPolicy) -> bool {
    let extra = join_nonempty(extras.iter().map(AsRef::as_ref));
    weighted_length(&join_nonempty([body, extra.as_str()])) > policy.character_limit
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_EXTRAS: [&str; 0] = [];

    fn limit(limit: usize) -> MirrorPolicy {
        MirrorPolicy::default().with_character_limit(limit)
    }

    #[test]
    fn test_rounds_text_when_content_exceeds_limit() {
        let body = "1234567890".repeat(30);
        let result = compose(&body, &["additional"], &limit(240));

        let expected = format!("{} additional ...", &body[..225]);
        assert_eq!(result, expected);
        assert_eq!(weighted_length(&result), 240);
    }

    #[test]
    fn test_keeps_text_within_limit() {
        let result = compose("1234567890", &["additional"], &limit(240));
        assert_eq!(result, "1234567890 additional");
    }

    #[test]
    fn test_exact_fit_ignores_ellipsis_weight() {
        let body = "a".repeat(229);
        let result = compose(&body, &["additional"], &limit(240));
        assert_eq!(result, format!("{body} additional"));
        assert_eq!(weighted_length(&result), 240);
        assert!(!needs_truncation(&body, &["additional"], &limit(240)));
    }

    #[test]
    fn test_no_extras_returns_body_exactly() {
        let body = "a".repeat(240);
        assert_eq!(compose(&body, &NO_EXTRAS, &limit(240)), body);
        assert_eq!(compose("short", &NO_EXTRAS, &limit(240)), "short");
    }

    #[test]
    fn test_empty_extras_are_ignored() {
        assert_eq!(compose("hello", &["", ""], &limit(240)), "hello");
    }

    #[test]
    fn test_empty_body_with_extras() {
        assert_eq!(
            compose("", &["https://example.com/@me/1"], &limit(240)),
            "https://example.com/@me/1"
        );
    }

    #[test]
    fn test_truncation_without_extras() {
        let result = compose("abcdefghij", &NO_EXTRAS, &limit(8));
        // 8 - weight(" ...") = 4
        assert_eq!(result, "abcd ...");
    }

    #[test]
    fn test_custom_ellipsis_marker() {
        let policy = limit(8).with_ellipsis_marker("\u{2026}");
        // The marker weighs 2, plus one separator
        assert_eq!(compose("abcdefghij", &NO_EXTRAS, &policy), "abcde \u{2026}");
    }

    #[test]
    fn test_truncated_prefix_drops_trailing_whitespace() {
        let result = compose("abc     defghijkl", &NO_EXTRAS, &limit(10));
        assert_eq!(result, "abc ...");
    }

    #[test]
    fn test_url_extra_counts_as_url_weight() {
        let url = "https://mastodon.example/@someone/109876543210987654";
        let body = "x".repeat(300);
        let result = compose(&body, &[url], &limit(240));

        // 240 - weight(" " + url + " ...") = 240 - 28 = 212
        assert_eq!(result, format!("{} {url} ...", "x".repeat(212)));
        assert_eq!(weighted_length(&result), 240);
    }

    #[test]
    fn test_truncation_does_not_split_wide_characters() {
        let body = "日".repeat(200);
        let result = compose(&body, &NO_EXTRAS, &limit(240));

        // Budget 236 holds exactly 118 two-weight characters
        assert_eq!(result, format!("{} ...", "日".repeat(118)));
        assert!(weighted_length(&result) <= 240);
    }

    #[test]
    fn test_extras_alone_exceeding_limit_yield_tail_only() {
        let result = compose("body text", &["a-very-long-extra"], &limit(10));
        assert_eq!(result, "a-very-long-extra ...");
    }

    #[test]
    fn test_result_never_exceeds_limit() {
        let bodies = [
            "plain ascii text that keeps going and going".repeat(10),
            "mixed 日本語 👍🏽 with https://example.com/links inside ".repeat(8),
            "e\u{0301}".repeat(300),
        ];
        let extras = ["https://mastodon.example/@me/1"];

        for body in &bodies {
            for limit_value in [30, 100, 240, 280] {
                let policy = limit(limit_value);
                assert!(weighted_length(&compose(body, &extras, &policy)) <= limit_value);
                assert!(weighted_length(&compose(body, &NO_EXTRAS, &policy)) <= limit_value);
            }
        }
    }

    #[test]
    fn test_needs_truncation() {
        assert!(!needs_truncation("1234567890", &["additional"], &limit(240)));
        assert!(needs_truncation(&"1".repeat(241), &NO_EXTRAS, &limit(240)));
    }
}
