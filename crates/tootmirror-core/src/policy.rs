//! Mirror policy
//!
//! The policy is resolved once at startup and passed explicitly to every
//! decision function; nothing in the pipeline reads process-wide state.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MirrorError, Result};
use crate::post::Visibility;
use crate::{bail_invalid, bail_missing, bail_unsupported};

/// Default destination character limit
pub const DEFAULT_CHARACTER_LIMIT: usize = 240;

/// Default marker appended to truncated text
pub const DEFAULT_ELLIPSIS_MARKER: &str = "...";

/// When the source post's URL is appended to the mirrored text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlAppendMode {
    Always,
    OnlyMedia,
    OnlySensitive,
    MediaOrSensitive,
    #[default]
    Never,
}

impl UrlAppendMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrlAppendMode::Always => "always",
            UrlAppendMode::OnlyMedia => "only_media",
            UrlAppendMode::OnlySensitive => "only_sensitive",
            UrlAppendMode::MediaOrSensitive => "media_or_sensitive",
            UrlAppendMode::Never => "never",
        }
    }
}

impl FromStr for UrlAppendMode {
    type Err = MirrorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "always" => Ok(UrlAppendMode::Always),
            "only_media" => Ok(UrlAppendMode::OnlyMedia),
            "only_sensitive" => Ok(UrlAppendMode::OnlySensitive),
            "media_or_sensitive" => Ok(UrlAppendMode::MediaOrSensitive),
            "never" => Ok(UrlAppendMode::Never),
            other => bail_unsupported!(
                "url append mode",
                other,
                "always, only_media, only_sensitive, media_or_sensitive, never"
            ),
        }
    }
}

impl fmt::Display for UrlAppendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content policy applied to every source post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorPolicy {
    pub allowed_visibilities: BTreeSet<Visibility>,
    pub mirror_reshares: bool,
    /// Governs both replies and posts that mention other accounts
    pub mirror_replies: bool,
    pub mirror_sensitive: bool,
    pub url_append_mode: UrlAppendMode,
    pub ellipsis_marker: String,
    pub character_limit: usize,
}

impl Default for MirrorPolicy {
    fn default() -> Self {
        Self {
            allowed_visibilities: Visibility::ALL.into_iter().collect(),
            mirror_reshares: false,
            mirror_replies: false,
            mirror_sensitive: false,
            url_append_mode: UrlAppendMode::Never,
            ellipsis_marker: DEFAULT_ELLIPSIS_MARKER.to_string(),
            character_limit: DEFAULT_CHARACTER_LIMIT,
        }
    }
}

impl MirrorPolicy {
    /// Replace the allowed visibilities
    pub fn with_visibilities(mut self, visibilities: impl IntoIterator<Item = Visibility>) -> Self {
        self.allowed_visibilities = visibilities.into_iter().collect();
        self
    }

    pub fn with_url_append_mode(mut self, mode: UrlAppendMode) -> Self {
        self.url_append_mode = mode;
        self
    }

    pub fn with_character_limit(mut self, limit: usize) -> Self {
        self.character_limit = limit;
        self
    }

    pub fn with_ellipsis_marker(mut self, marker: impl Into<String>) -> Self {
        self.ellipsis_marker = marker.into();
        self
    }

    /// Check the invariants a policy must satisfy before mirroring starts
    pub fn validate(&self) -> Result<()> {
        if self.allowed_visibilities.is_empty() {
            bail_missing!("allowed visibilities");
        }
        if self.character_limit == 0 {
            bail_invalid!("character limit", self.character_limit);
        }
        Ok(())
    }
}

/// Parse a space-separated visibility list such as `"public unlisted"`.
///
/// An empty list is rejected: a policy that can never match is treated as a
/// configuration mistake.
pub fn parse_visibility_list(value: &str) -> Result<BTreeSet<Visibility>> {
    let visibilities = value
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<BTreeSet<Visibility>>>()?;

    if visibilities.is_empty() {
        bail_missing!("allowed visibilities");
    }

    Ok(visibilities)
}
