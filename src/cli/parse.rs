use std::collections::BTreeSet;

use tootmirror_core::policy::{parse_visibility_list, UrlAppendMode};
use tootmirror_core::post::Visibility;

/// Parse a space-separated visibility list
pub fn parse_visibilities(s: &str) -> std::result::Result<BTreeSet<Visibility>, String> {
    parse_visibility_list(s).map_err(|e| e.to_string())
}

/// Parse URL append mode from string
pub fn parse_url_append_mode(s: &str) -> std::result::Result<UrlAppendMode, String> {
    s.parse::<UrlAppendMode>().map_err(|e| e.to_string())
}
