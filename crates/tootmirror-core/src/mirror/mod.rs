//! The mirroring pipeline: eligibility, URL append decision and composition
//!
//! Every function here is pure and takes the policy as an explicit argument.

pub mod compose;
pub mod filter;
pub mod url;

pub use compose::{compose, needs_truncation};
pub use filter::{check_eligibility, is_eligible, Ineligible};
pub use url::should_append_url;

use crate::policy::MirrorPolicy;
use crate::post::Post;

/// Text that will be published for `post`.
///
/// A post behind a content warning is mirrored as its warning text so the
/// hidden body is not exposed. The canonical URL is appended when the policy
/// asks for it and the source provided one.
pub fn render(post: &Post, policy: &MirrorPolicy) -> String {
    let text = post.content_warning().unwrap_or(&post.body);

    let mut extras: Vec<&str> = Vec::new();
    if should_append_url(post, policy) && !post.canonical_url.is_empty() {
        extras.push(&post.canonical_url);
    }

    compose(text, &extras, policy)
}
