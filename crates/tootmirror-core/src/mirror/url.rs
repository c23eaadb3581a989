//! Canonical URL append decision

use crate::policy::{MirrorPolicy, UrlAppendMode};
use crate::post::Post;

/// True when the source post's URL must be appended to the mirrored text
pub fn should_append_url(post: &Post, policy: &MirrorPolicy) -> bool {
    let has_media = post.media_count > 0;

    match policy.url_append_mode {
        UrlAppendMode::Always => true,
        UrlAppendMode::OnlyMedia => has_media,
        UrlAppendMode::OnlySensitive => post.is_sensitive,
        UrlAppendMode::MediaOrSensitive => has_media || post.is_sensitive,
        UrlAppendMode::Never => false,
    }
}
