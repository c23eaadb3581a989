//! Source platform collaborator

pub mod mastodon;
pub mod sse;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::post::Post;

pub use mastodon::{MastodonClient, MastodonConfig};

/// The authenticated source account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub acct: String,
}

/// An event delivered by the source stream
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A new post appeared on the stream
    Update(Box<Post>),
    /// The post with this id was deleted
    Delete(String),
    /// Keep-alive with no payload
    Heartbeat,
}

/// Blocking iterator over stream events; ends when the connection closes
pub type EventStream = Box<dyn Iterator<Item = Result<StreamEvent>>>;

/// Operations the mirror needs from the source platform
pub trait SourceClient {
    /// Verify credentials and return the authenticated account
    fn verify_credentials(&self) -> Result<Account>;

    /// Posts by `account_id` newer than `since_id`, newest first
    fn fetch_statuses(&self, account_id: &str, since_id: Option<&str>) -> Result<Vec<Post>>;

    /// Subscribe to the authenticated user's event stream
    fn stream_user(&self) -> Result<EventStream>;
}
