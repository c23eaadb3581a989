//! Argument groups shared by several commands
//!
//! Every setting can also come from the environment variable named in its
//! `env` attribute, so a deployment can be configured without flags.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args};

use super::parse::{parse_url_append_mode, parse_visibilities};
use tootmirror_core::config::{FetchMode, MirrorConfig};
use tootmirror_core::destination::oauth::OAuthCredentials;
use tootmirror_core::destination::TwitterConfig;
use tootmirror_core::error::{MirrorError, Result};
use tootmirror_core::policy::{MirrorPolicy, UrlAppendMode, DEFAULT_CHARACTER_LIMIT};
use tootmirror_core::post::Visibility;
use tootmirror_core::source::MastodonConfig;

/// Which posts are mirrored and how their text is composed
#[derive(Args, Debug, Clone)]
pub struct PolicyArgs {
    /// Mirror reshares (boosts)
    #[arg(long, env = "MIRROR_RESHARES", value_name = "BOOL", default_value_t = false, action = ArgAction::Set)]
    pub mirror_reshares: bool,

    /// Mirror replies and posts that mention other accounts
    #[arg(long, env = "MIRROR_REPLIES", value_name = "BOOL", default_value_t = false, action = ArgAction::Set)]
    pub mirror_replies: bool,

    /// Mirror posts marked sensitive
    #[arg(long, env = "MIRROR_SENSITIVE", value_name = "BOOL", default_value_t = false, action = ArgAction::Set)]
    pub mirror_sensitive: bool,

    /// When to append the source URL (always, only_media, only_sensitive, media_or_sensitive, never)
    #[arg(long, env = "URL_APPEND_MODE", default_value = "never", value_parser = parse_url_append_mode)]
    pub url_append_mode: UrlAppendMode,

    /// Space-separated visibilities that may be mirrored
    #[arg(
        long,
        env = "ALLOWED_VISIBILITIES",
        default_value = "public unlisted private direct",
        value_parser = parse_visibilities
    )]
    pub allowed_visibilities: BTreeSet<Visibility>,

    /// Marker placed after truncated text
    #[arg(long, env = "ELLIPSIS_MARKER", default_value = "...")]
    pub ellipsis_marker: String,

    /// Weighted character limit of the destination
    #[arg(long, env = "CHARACTER_LIMIT", default_value_t = DEFAULT_CHARACTER_LIMIT)]
    pub character_limit: usize,
}

impl PolicyArgs {
    pub fn to_policy(&self) -> Result<MirrorPolicy> {
        let policy = MirrorPolicy {
            allowed_visibilities: self.allowed_visibilities.clone(),
            mirror_reshares: self.mirror_reshares,
            mirror_replies: self.mirror_replies,
            mirror_sensitive: self.mirror_sensitive,
            url_append_mode: self.url_append_mode,
            ellipsis_marker: self.ellipsis_marker.clone(),
            character_limit: self.character_limit,
        };
        policy.validate()?;
        Ok(policy)
    }
}

/// Mastodon connection settings
#[derive(Args, Debug, Clone)]
pub struct MastodonArgs {
    /// Base URL of the Mastodon instance
    #[arg(long, env = "MASTODON_URL")]
    pub mastodon_url: Option<String>,

    /// Mastodon access token
    #[arg(long, env = "MASTODON_ACCESS_TOKEN", hide_env_values = true)]
    pub mastodon_access_token: Option<String>,

    /// Streaming API base URL (defaults to the instance URL)
    #[arg(long, env = "MASTODON_STREAMING_URL")]
    pub mastodon_streaming_url: Option<String>,
}

impl MastodonArgs {
    pub fn to_config(&self) -> Result<MastodonConfig> {
        let url = self
            .mastodon_url
            .as_deref()
            .ok_or_else(|| MirrorError::missing("mastodon url"))?;
        let token = self
            .mastodon_access_token
            .as_deref()
            .ok_or_else(|| MirrorError::missing("mastodon access token"))?;

        let mut config = MastodonConfig::new(url, token);
        config.streaming_url = self.mastodon_streaming_url.clone();
        config.validate()?;
        Ok(config)
    }
}

/// Twitter OAuth 1.0a credentials
#[derive(Args, Debug, Clone)]
pub struct TwitterArgs {
    #[arg(long, env = "TWITTER_CONSUMER_KEY", hide_env_values = true)]
    pub twitter_consumer_key: Option<String>,

    #[arg(long, env = "TWITTER_CONSUMER_SECRET", hide_env_values = true)]
    pub twitter_consumer_secret: Option<String>,

    #[arg(long, env = "TWITTER_ACCESS_TOKEN", hide_env_values = true)]
    pub twitter_access_token: Option<String>,

    #[arg(long, env = "TWITTER_TOKEN_SECRET", hide_env_values = true)]
    pub twitter_token_secret: Option<String>,
}

impl TwitterArgs {
    pub fn to_config(&self) -> Result<TwitterConfig> {
        let config = TwitterConfig::new(OAuthCredentials {
            consumer_key: self.twitter_consumer_key.clone().unwrap_or_default(),
            consumer_secret: self.twitter_consumer_secret.clone().unwrap_or_default(),
            access_token: self.twitter_access_token.clone().unwrap_or_default(),
            token_secret: self.twitter_token_secret.clone().unwrap_or_default(),
        });
        config.validate()?;
        Ok(config)
    }
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Follow the streaming API instead of polling
    #[arg(long, env = "USE_STREAMING", value_name = "BOOL", default_value_t = true, action = ArgAction::Set)]
    pub use_streaming: bool,

    /// Milliseconds between polls when not streaming
    #[arg(long, env = "POLL_INTERVAL_MS", default_value_t = 60_000)]
    pub poll_interval_ms: u64,

    /// Seconds a mirrored post stays deletable
    #[arg(long, env = "RECORD_RETENTION_SECS", default_value_t = 3600)]
    pub record_retention_secs: u64,

    #[command(flatten)]
    pub policy: PolicyArgs,

    #[command(flatten)]
    pub mastodon: MastodonArgs,

    #[command(flatten)]
    pub twitter: TwitterArgs,
}

impl RunArgs {
    pub fn to_config(&self) -> Result<MirrorConfig> {
        let mode = FetchMode::from_flags(
            self.use_streaming,
            Duration::from_millis(self.poll_interval_ms),
        );
        let config = MirrorConfig::new(
            self.policy.to_policy()?,
            self.mastodon.to_config()?,
            self.twitter.to_config()?,
        )
        .with_mode(mode)
        .with_record_retention(Duration::from_secs(self.record_retention_secs));

        config.validate()?;
        Ok(config)
    }
}

#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub mastodon: MastodonArgs,
}

#[derive(Args, Debug, Clone)]
pub struct PreviewArgs {
    /// Post body (reads stdin when omitted)
    pub body: Option<String>,

    /// Text appended after the body, such as a URL (repeatable)
    #[arg(long = "extra", value_name = "TEXT")]
    pub extras: Vec<String>,

    /// Treat the body as Mastodon HTML
    #[arg(long)]
    pub html: bool,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// Mastodon status JSON file (reads stdin when omitted)
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub policy: PolicyArgs,
}
