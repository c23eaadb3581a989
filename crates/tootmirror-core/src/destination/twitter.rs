//! Twitter API v2 client for creating and deleting posts

use std::time::Duration;

use serde::Deserialize;
use ureq::Agent;

use super::oauth::{OAuthCredentials, OAuthSigner};
use super::DestinationClient;
use crate::bail_missing;
use crate::error::{MirrorError, Result};

const SERVICE: &str = "twitter";

/// Default API root
pub const DEFAULT_API_BASE: &str = "https://api.twitter.com";

/// Default timeout for API requests
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Connection settings for the Twitter API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwitterConfig {
    pub credentials: OAuthCredentials,
    pub api_base: String,
    pub timeout_seconds: u64,
}

impl TwitterConfig {
    pub fn new(credentials: OAuthCredentials) -> Self {
        Self {
            credentials,
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let credentials = &self.credentials;
        for (name, value) in [
            ("twitter consumer key", &credentials.consumer_key),
            ("twitter consumer secret", &credentials.consumer_secret),
            ("twitter access token", &credentials.access_token),
            ("twitter token secret", &credentials.token_secret),
        ] {
            if value.trim().is_empty() {
                bail_missing!(name);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<ApiProblem>,
}

#[derive(Debug, Deserialize)]
struct ApiProblem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    detail: String,
}

#[derive(Debug, Deserialize)]
struct CreatedTweet {
    id: String,
}

#[derive(Debug, Deserialize)]
struct DeletedTweet {
    deleted: bool,
}

impl<T> Envelope<T> {
    fn into_data(self) -> Result<T> {
        match self.data {
            Some(data) => Ok(data),
            None => {
                let reason = self
                    .errors
                    .iter()
                    .map(|p| format!("{}: {}", p.title, p.detail))
                    .collect::<Vec<_>>()
                    .join("; ");
                Err(MirrorError::api(
                    SERVICE,
                    if reason.is_empty() {
                        "response has no data".to_string()
                    } else {
                        reason
                    },
                ))
            }
        }
    }
}

/// Blocking Twitter API client
pub struct TwitterClient {
    config: TwitterConfig,
    signer: OAuthSigner,
    agent: Agent,
    user_agent: String,
}

impl TwitterClient {
    pub fn new(config: TwitterConfig) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_seconds)))
            .build()
            .into();
        let signer = OAuthSigner::new(config.credentials.clone());
        let user_agent = format!("tootmirror/{}", env!("CARGO_PKG_VERSION"));

        Self {
            config,
            signer,
            agent,
            user_agent,
        }
    }

    fn tweets_url(&self) -> String {
        format!("{}/2/tweets", self.config.api_base.trim_end_matches('/'))
    }
}

impl DestinationClient for TwitterClient {
    fn create_post(&self, text: &str) -> Result<String> {
        let url = self.tweets_url();
        let authorization = self.signer.sign("POST", &url, &[])?;
        let payload = serde_json::json!({ "text": text }).to_string();

        let mut response = self
            .agent
            .post(&url)
            .header("Authorization", authorization.as_str())
            .header("User-Agent", self.user_agent.as_str())
            .header("Content-Type", "application/json")
            .send(payload.as_str())
            .map_err(|e| MirrorError::from_http(SERVICE, e))?;

        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| MirrorError::from_http(SERVICE, e))?;

        parse_created(&body)
    }

    fn delete_post(&self, id: &str) -> Result<()> {
        let url = format!("{}/{}", self.tweets_url(), id);
        let authorization = self.signer.sign("DELETE", &url, &[])?;

        let mut response = self
            .agent
            .delete(&url)
            .header("Authorization", authorization.as_str())
            .header("User-Agent", self.user_agent.as_str())
            .call()
            .map_err(|e| MirrorError::from_http(SERVICE, e))?;

        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| MirrorError::from_http(SERVICE, e))?;

        parse_deleted(&body)
    }
}

fn parse_created(body: &str) -> Result<String> {
    let envelope: Envelope<CreatedTweet> = serde_json::from_str(body)?;
    Ok(envelope.into_data()?.id)
}

fn parse_deleted(body: &str) -> Result<()> {
    let envelope: Envelope<DeletedTweet> = serde_json::from_str(body)?;
    if envelope.into_data()?.deleted {
        Ok(())
    } else {
        Err(MirrorError::api(SERVICE, "post was not deleted"))
    }
}
