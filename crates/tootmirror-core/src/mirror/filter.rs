//! Mirror eligibility

use std::fmt;

use crate::policy::MirrorPolicy;
use crate::post::Post;

/// The gate a post failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligible {
    /// Visibility is not in the allowed set
    Visibility,
    /// Reshares are not mirrored
    Reshare,
    /// Replies and mentions are not mirrored
    Reply,
    /// Sensitive posts are not mirrored
    Sensitive,
}

impl Ineligible {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ineligible::Visibility => "visibility",
            Ineligible::Reshare => "reshare",
            Ineligible::Reply => "reply",
            Ineligible::Sensitive => "sensitive",
        }
    }
}

impl fmt::Display for Ineligible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check every gate in order and report the first one that fails.
pub fn check_eligibility(post: &Post, policy: &MirrorPolicy) -> Result<(), Ineligible> {
    if !policy.allowed_visibilities.contains(&post.visibility) {
        return Err(Ineligible::Visibility);
    }

    if post.is_reshare && !policy.mirror_reshares {
        return Err(Ineligible::Reshare);
    }

    if post.is_reply_or_mention() && !policy.mirror_replies {
        return Err(Ineligible::Reply);
    }

    if post.is_sensitive && !policy.mirror_sensitive {
        return Err(Ineligible::Sensitive);
    }

    Ok(())
}

/// True when `post` may be mirrored under `policy`
pub fn is_eligible(post: &Post, policy: &MirrorPolicy) -> bool {
    check_eligibility(post, policy).is_ok()
}
