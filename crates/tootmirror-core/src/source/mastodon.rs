//! Mastodon REST and streaming client

use std::io::BufReader;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::Deserialize;
use tracing::debug;
use ureq::Agent;

use super::sse::{SseFrame, SseReader};
use super::{Account, EventStream, SourceClient, StreamEvent};
use crate::error::{MirrorError, Result};
use crate::post::{Post, Visibility};
use crate::text::html::html_to_text;
use crate::{bail_invalid, bail_missing};

const SERVICE: &str = "mastodon";

/// Statuses requested per poll
pub const FETCH_LIMIT: u32 = 40;

/// Default timeout for REST requests
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Connection settings for a Mastodon instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MastodonConfig {
    /// Instance base URL, e.g. `https://mastodon.social`
    pub url: String,
    pub access_token: String,
    /// Streaming base URL; the instance URL when absent
    pub streaming_url: Option<String>,
    pub timeout_seconds: u64,
}

impl MastodonConfig {
    pub fn new(url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            access_token: access_token.into(),
            streaming_url: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            bail_missing!("mastodon url");
        }
        if !is_http_url(&self.url) {
            bail_invalid!("mastodon url", &self.url);
        }
        if let Some(streaming) = &self.streaming_url {
            if !is_http_url(streaming) {
                bail_invalid!("mastodon streaming url", streaming);
            }
        }
        if self.access_token.trim().is_empty() {
            bail_missing!("mastodon access token");
        }
        Ok(())
    }

    fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    fn streaming_base_url(&self) -> &str {
        self.streaming_url
            .as_deref()
            .unwrap_or(&self.url)
            .trim_end_matches('/')
    }
}

fn is_http_url(url: &str) -> bool {
    let url = url.trim();
    ["https://", "http://"]
        .iter()
        .any(|scheme| url.len() > scheme.len() && url.starts_with(scheme))
}

/// Blocking Mastodon API client
pub struct MastodonClient {
    config: MastodonConfig,
    agent: Agent,
    stream_agent: Agent,
    authorization: String,
    user_agent: String,
}

impl MastodonClient {
    pub fn new(config: MastodonConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_seconds);

        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        // The stream stays open indefinitely; only bound the connect phase
        let stream_agent: Agent = Agent::config_builder()
            .timeout_connect(Some(timeout))
            .build()
            .into();

        let authorization = format!("Bearer {}", config.access_token);
        let user_agent = format!("tootmirror/{}", env!("CARGO_PKG_VERSION"));

        Self {
            config,
            agent,
            stream_agent,
            authorization,
            user_agent,
        }
    }

    fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<String> {
        let mut request = self
            .agent
            .get(url)
            .header("Authorization", self.authorization.as_str())
            .header("User-Agent", self.user_agent.as_str());
        for (key, value) in query {
            request = request.query(*key, *value);
        }

        let mut response = request
            .call()
            .map_err(|e| MirrorError::from_http(SERVICE, e))?;

        response
            .body_mut()
            .read_to_string()
            .map_err(|e| MirrorError::from_http(SERVICE, e))
    }
}

impl SourceClient for MastodonClient {
    fn verify_credentials(&self) -> Result<Account> {
        let url = format!(
            "{}/api/v1/accounts/verify_credentials",
            self.config.base_url()
        );
        let body = self.get_json(&url, &[])?;
        Ok(serde_json::from_str(&body)?)
    }

    fn fetch_statuses(&self, account_id: &str, since_id: Option<&str>) -> Result<Vec<Post>> {
        let url = format!(
            "{}/api/v1/accounts/{}/statuses",
            self.config.base_url(),
            account_id
        );
        let limit = FETCH_LIMIT.to_string();
        let mut query = vec![("limit", limit.as_str())];
        if let Some(since_id) = since_id {
            query.push(("since_id", since_id));
        }

        let body = self.get_json(&url, &query)?;
        parse_statuses(&body)
    }

    fn stream_user(&self) -> Result<EventStream> {
        let url = format!(
            "{}/api/v1/streaming/user",
            self.config.streaming_base_url()
        );
        debug!(url = %url, "opening user stream");

        let response = self
            .stream_agent
            .get(&url)
            .header("Authorization", self.authorization.as_str())
            .header("User-Agent", self.user_agent.as_str())
            .header("Accept", "text/event-stream")
            .call()
            .map_err(|e| MirrorError::ConnectionLost(e.to_string()))?;

        let reader = BufReader::new(response.into_body().into_reader());
        let events = SseReader::new(reader).filter_map(|frame| match frame {
            Ok(frame) => stream_event(frame),
            Err(e) => Some(Err(MirrorError::ConnectionLost(e.to_string()))),
        });

        Ok(Box::new(events))
    }
}

/// Map a stream frame to an event; frames the mirror does not use yield `None`
fn stream_event(frame: SseFrame) -> Option<Result<StreamEvent>> {
    match frame {
        SseFrame::Comment(_) => Some(Ok(StreamEvent::Heartbeat)),
        SseFrame::Message { event, data } => match event.as_deref() {
            Some("update") => Some(parse_status(&data).map(|post| StreamEvent::Update(Box::new(post)))),
            Some("delete") => Some(Ok(StreamEvent::Delete(data.trim().to_string()))),
            _ => None,
        },
    }
}

#[derive(Debug, Deserialize)]
struct ApiAccountRef {
    id: String,
}

/// The fields of a Mastodon status the mirror reads
#[derive(Debug, Deserialize)]
struct ApiStatus {
    id: String,
    account: ApiAccountRef,
    #[serde(default)]
    content: String,
    #[serde(default)]
    spoiler_text: String,
    visibility: String,
    #[serde(default)]
    reblog: Option<IgnoredAny>,
    #[serde(default)]
    mentions: Vec<IgnoredAny>,
    #[serde(default)]
    in_reply_to_id: Option<String>,
    #[serde(default)]
    sensitive: bool,
    #[serde(default)]
    media_attachments: Vec<IgnoredAny>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl TryFrom<ApiStatus> for Post {
    type Error = MirrorError;

    fn try_from(status: ApiStatus) -> Result<Self> {
        let visibility: Visibility = status.visibility.parse()?;
        let content_warning = Some(status.spoiler_text).filter(|cw| !cw.trim().is_empty());
        let canonical_url = status.url.or(status.uri).unwrap_or_default();

        Ok(Post {
            id: status.id,
            account_id: status.account.id,
            body: html_to_text(&status.content),
            content_warning,
            visibility,
            is_reshare: status.reblog.is_some(),
            mentions_count: status.mentions.len(),
            in_reply_to_id: status.in_reply_to_id,
            is_sensitive: status.sensitive,
            media_count: status.media_attachments.len(),
            canonical_url,
            created_at: status.created_at,
        })
    }
}

/// Parse a single Mastodon status JSON document into a [`Post`]
pub fn parse_status(json: &str) -> Result<Post> {
    let status: ApiStatus = serde_json::from_str(json)?;
    Post::try_from(status)
}

/// Parse a Mastodon status list, keeping the server's order
pub fn parse_statuses(json: &str) -> Result<Vec<Post>> {
    let statuses: Vec<ApiStatus> = serde_json::from_str(json)?;
    statuses.into_iter().map(Post::try_from).collect()
}
