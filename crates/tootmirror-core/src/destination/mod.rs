//! Destination platform collaborator

pub mod oauth;
pub mod twitter;

use crate::error::Result;

pub use twitter::{TwitterClient, TwitterConfig};

/// Operations the mirror needs from the destination platform
pub trait DestinationClient {
    /// Publish `text`, returning the id of the created post
    fn create_post(&self, text: &str) -> Result<String>;

    /// Delete a previously created post
    fn delete_post(&self, id: &str) -> Result<()>;
}
