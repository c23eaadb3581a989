//! Source post model
//!
//! A [`Post`] is the platform-neutral view of a source status that the
//! filtering and composing pipeline works on. Collaborators build it; the core
//! only reads it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bail_unsupported;
use crate::error::MirrorError;

/// Audience a post was published to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Visible to everyone and listed on public timelines
    Public,
    /// Visible to everyone but kept off public timelines
    Unlisted,
    /// Followers only
    Private,
    /// Mentioned accounts only
    Direct,
}

impl Visibility {
    /// Every visibility, widest audience first
    pub const ALL: [Visibility; 4] = [
        Visibility::Public,
        Visibility::Unlisted,
        Visibility::Private,
        Visibility::Direct,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Unlisted => "unlisted",
            Visibility::Private => "private",
            Visibility::Direct => "direct",
        }
    }
}

impl FromStr for Visibility {
    type Err = MirrorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "unlisted" => Ok(Visibility::Unlisted),
            "private" => Ok(Visibility::Private),
            "direct" => Ok(Visibility::Direct),
            other => bail_unsupported!(
                "visibility",
                other,
                "public, unlisted, private, direct"
            ),
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A source post, read-only to the mirroring pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    /// Author of the post
    #[serde(default)]
    pub account_id: String,
    /// Plain-text body (already converted from HTML)
    #[serde(default)]
    pub body: String,
    /// Warning text the author put in front of the post
    #[serde(default)]
    pub content_warning: Option<String>,
    pub visibility: Visibility,
    /// True when this post reshares another author's post
    #[serde(default)]
    pub is_reshare: bool,
    #[serde(default)]
    pub mentions_count: usize,
    #[serde(default)]
    pub in_reply_to_id: Option<String>,
    #[serde(default)]
    pub is_sensitive: bool,
    #[serde(default)]
    pub media_count: usize,
    /// Permalink of the post on the source platform (empty when unknown)
    #[serde(default)]
    pub canonical_url: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Create a public, plain post with every optional field at its default.
    pub fn new(id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            account_id: String::new(),
            body: body.into(),
            content_warning: None,
            visibility: Visibility::Public,
            is_reshare: false,
            mentions_count: 0,
            in_reply_to_id: None,
            is_sensitive: false,
            media_count: 0,
            canonical_url: String::new(),
            created_at: None,
        }
    }

    /// True when the post replies to another post or mentions an account
    pub fn is_reply_or_mention(&self) -> bool {
        self.mentions_count > 0 || self.in_reply_to_id.is_some()
    }

    /// Content warning, ignoring an empty warning string
    pub fn content_warning(&self) -> Option<&str> {
        self.content_warning
            .as_deref()
            .map(str::trim)
            .filter(|cw| !cw.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_from_str() {
        assert_eq!("public".parse::<Visibility>().unwrap(), Visibility::Public);
        assert_eq!(" Direct ".parse::<Visibility>().unwrap(), Visibility::Direct);
        let err = "followers".parse::<Visibility>().unwrap_err();
        assert!(matches!(err, MirrorError::Unsupported { ref value, .. } if value == "followers"));
    }

    #[test]
    fn test_visibility_display_round_trips_names() {
        for visibility in Visibility::ALL {
            assert_eq!(
                visibility.to_string().parse::<Visibility>().unwrap(),
                visibility
            );
        }
    }

    #[test]
    fn test_missing_optional_fields_default_to_empty() {
        let post: Post =
            serde_json::from_str(r#"{"id": "1", "visibility": "private"}"#).unwrap();
        assert_eq!(post.visibility, Visibility::Private);
        assert!(!post.is_reshare);
        assert!(!post.is_sensitive);
        assert_eq!(post.mentions_count, 0);
        assert_eq!(post.media_count, 0);
        assert!(post.in_reply_to_id.is_none());
        assert!(post.canonical_url.is_empty());
    }

    #[test]
    fn test_reply_or_mention() {
        let mut post = Post::new("1", "hi");
        assert!(!post.is_reply_or_mention());

        post.mentions_count = 1;
        assert!(post.is_reply_or_mention());

        post.mentions_count = 0;
        post.in_reply_to_id = Some("7".into());
        assert!(post.is_reply_or_mention());
    }

    #[test]
    fn test_blank_content_warning_is_absent() {
        let mut post = Post::new("1", "hi");
        post.content_warning = Some("  ".into());
        assert_eq!(post.content_warning(), None);

        post.content_warning = Some("spoilers".into());
        assert_eq!(post.content_warning(), Some("spoilers"));
    }
}
