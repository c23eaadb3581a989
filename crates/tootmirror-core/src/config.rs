//! Process configuration for a mirror run
//!
//! Settings arrive as CLI flags with environment-variable fallbacks and are
//! assembled into a [`MirrorConfig`] once at startup. Validation failures are
//! configuration errors and stop the process before anything is mirrored.

use std::time::Duration;

use crate::bail_invalid;
use crate::destination::TwitterConfig;
use crate::error::Result;
use crate::policy::MirrorPolicy;
use crate::records::{DEFAULT_RETENTION, MAX_RETENTION};
use crate::source::MastodonConfig;

/// Default interval between polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(60_000);

/// Longest accepted interval between polls (one day)
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// How new source posts are discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Subscribe to the user stream
    Streaming,
    /// Fetch new posts every `interval`
    Polling { interval: Duration },
}

impl FetchMode {
    pub fn from_flags(use_streaming: bool, poll_interval: Duration) -> Self {
        if use_streaming {
            FetchMode::Streaming
        } else {
            FetchMode::Polling {
                interval: poll_interval,
            }
        }
    }
}

/// Everything a mirror run needs, resolved once at startup
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    pub policy: MirrorPolicy,
    pub mode: FetchMode,
    pub record_retention: Duration,
    pub mastodon: MastodonConfig,
    pub twitter: TwitterConfig,
}

impl MirrorConfig {
    pub fn new(policy: MirrorPolicy, mastodon: MastodonConfig, twitter: TwitterConfig) -> Self {
        Self {
            policy,
            mode: FetchMode::Streaming,
            record_retention: DEFAULT_RETENTION,
            mastodon,
            twitter,
        }
    }

    pub fn with_mode(mut self, mode: FetchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_record_retention(mut self, retention: Duration) -> Self {
        self.record_retention = retention;
        self
    }

    /// Check the whole configuration; the first problem found is returned
    pub fn validate(&self) -> Result<()> {
        self.policy.validate()?;

        if let FetchMode::Polling { interval } = self.mode {
            if interval.is_zero() || interval > MAX_POLL_INTERVAL {
                bail_invalid!("poll interval", format!("{}ms", interval.as_millis()));
            }
        }
        if self.record_retention.is_zero() || self.record_retention > MAX_RETENTION {
            bail_invalid!(
                "record retention",
                format!("{}s", self.record_retention.as_secs())
            );
        }

        self.mastodon.validate()?;
        self.twitter.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destination::oauth::OAuthCredentials;

    fn valid() -> MirrorConfig {
        MirrorConfig::new(
            MirrorPolicy::default(),
            MastodonConfig::new("https://mastodon.example", "token"),
            TwitterConfig::new(OAuthCredentials {
                consumer_key: "ck".into(),
                consumer_secret: "cs".into(),
                access_token: "at".into(),
                token_secret: "ts".into(),
            }),
        )
    }

    #[test]
    fn test_defaults() {
        let config = valid();
        assert_eq!(config.mode, FetchMode::Streaming);
        assert_eq!(config.record_retention, Duration::from_secs(3600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fetch_mode_from_flags() {
        assert_eq!(
            FetchMode::from_flags(true, DEFAULT_POLL_INTERVAL),
            FetchMode::Streaming
        );
        assert_eq!(
            FetchMode::from_flags(false, Duration::from_millis(500)),
            FetchMode::Polling {
                interval: Duration::from_millis(500)
            }
        );
    }

    #[test]
    fn test_zero_poll_interval_is_rejected() {
        let config = valid().with_mode(FetchMode::Polling {
            interval: Duration::ZERO,
        });
        let err = config.validate().unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("poll interval"));
    }

    #[test]
    fn test_zero_retention_is_rejected() {
        assert!(valid()
            .with_record_retention(Duration::ZERO)
            .validate()
            .is_err());
    }

    #[test]
    fn test_out_of_range_durations_are_rejected() {
        let err = valid()
            .with_record_retention(Duration::from_secs(u64::MAX))
            .validate()
            .unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("record retention"));

        let err = valid()
            .with_mode(FetchMode::Polling {
                interval: Duration::from_millis(u64::MAX),
            })
            .validate()
            .unwrap_err();
        assert!(err.is_config_error());

        assert!(valid()
            .with_record_retention(MAX_RETENTION)
            .with_mode(FetchMode::Polling {
                interval: MAX_POLL_INTERVAL,
            })
            .validate()
            .is_ok());
    }

    #[test]
    fn test_invalid_policy_is_rejected() {
        let mut config = valid();
        config.policy.allowed_visibilities.clear();
        assert!(config.validate().unwrap_err().is_config_error());
    }

    #[test]
    fn test_missing_credentials_are_rejected() {
        let mut config = valid();
        config.twitter.credentials.consumer_key.clear();
        assert!(config.validate().unwrap_err().is_config_error());

        let mut config = valid();
        config.mastodon.access_token.clear();
        assert!(config.validate().unwrap_err().is_config_error());
    }
}
