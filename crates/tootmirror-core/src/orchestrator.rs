//! Event loops that drive mirroring
//!
//! [`Mirror`] owns both platform clients, the policy and the record store.
//! It discovers new source posts either by polling or by following the user
//! stream, and handles one event at a time in arrival order. Per-event
//! failures are logged and never stop the loop; only a lost stream connection
//! is surfaced to the caller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::config::{FetchMode, MirrorConfig, DEFAULT_POLL_INTERVAL};
use crate::destination::DestinationClient;
use crate::error::{MirrorError, Result};
use crate::mirror::{check_eligibility, render, Ineligible};
use crate::policy::MirrorPolicy;
use crate::post::Post;
use crate::records::{MirrorRecords, DEFAULT_RETENTION};
use crate::source::{Account, SourceClient, StreamEvent};
use crate::trace_time;

/// Longest uninterrupted sleep while waiting for the next poll
const WAIT_SLICE: Duration = Duration::from_millis(100);

/// What happened to a source post
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Published on the destination
    Mirrored { destination_id: String },
    /// Rejected by the policy
    Skipped(Ineligible),
    /// Not ours to mirror: another account's post, or nothing to publish
    Ignored,
    /// The destination call failed
    Failed,
}

/// What happened to a source deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// No live record for the source post
    Untracked,
    /// The destination call failed; the record is kept
    Failed,
}

pub struct Mirror<S, D> {
    source: S,
    destination: D,
    policy: MirrorPolicy,
    mode: FetchMode,
    records: MirrorRecords,
    account: Option<Account>,
}

impl<S: SourceClient, D: DestinationClient> Mirror<S, D> {
    pub fn new(source: S, destination: D, policy: MirrorPolicy) -> Self {
        Self {
            source,
            destination,
            policy,
            mode: FetchMode::Streaming,
            records: MirrorRecords::new(DEFAULT_RETENTION),
            account: None,
        }
    }

    pub fn from_config(source: S, destination: D, config: &MirrorConfig) -> Self {
        Self::new(source, destination, config.policy.clone())
            .with_mode(config.mode)
            .with_retention(config.record_retention)
    }

    pub fn with_mode(mut self, mode: FetchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.records = MirrorRecords::new(retention);
        self
    }

    pub fn records(&self) -> &MirrorRecords {
        &self.records
    }

    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    /// Verify source credentials and remember whose posts to mirror
    pub fn verify(&mut self) -> Result<&Account> {
        let account = self.source.verify_credentials()?;
        info!(account_id = %account.id, username = %account.username, "verified_account");
        Ok(&*self.account.insert(account))
    }

    fn account_id(&mut self) -> Result<String> {
        if let Some(account) = &self.account {
            return Ok(account.id.clone());
        }
        Ok(self.verify()?.id.clone())
    }

    /// Run the configured fetch mode until `shutdown` is set
    pub fn run(&mut self, shutdown: &AtomicBool) -> Result<()> {
        match self.mode {
            FetchMode::Streaming => self.run_streaming(shutdown),
            FetchMode::Polling { .. } => self.run_polling(shutdown),
        }
    }

    /// Mirror one source post
    pub fn on_update(&mut self, post: &Post) -> UpdateOutcome {
        if let Some(account) = &self.account {
            if post.account_id != account.id {
                trace!(source_id = %post.id, "foreign_post");
                return UpdateOutcome::Ignored;
            }
        }

        if let Err(reason) = check_eligibility(post, &self.policy) {
            debug!(source_id = %post.id, %reason, "skip_post");
            return UpdateOutcome::Skipped(reason);
        }

        let text = render(post, &self.policy);
        if text.trim().is_empty() {
            debug!(source_id = %post.id, "empty_post");
            return UpdateOutcome::Ignored;
        }

        let start = Instant::now();
        let created = self.destination.create_post(&text);
        trace_time!(start, "create_post", source_id = post.id.as_str());

        match created {
            Ok(destination_id) => {
                info!(
                    source_id = %post.id,
                    %destination_id,
                    created_at = ?post.created_at,
                    "mirrored_post"
                );
                self.records
                    .insert(post.id.as_str(), destination_id.as_str(), Instant::now());
                UpdateOutcome::Mirrored { destination_id }
            }
            Err(e) => {
                warn!(source_id = %post.id, error = %e, "failed to mirror post");
                UpdateOutcome::Failed
            }
        }
    }

    /// Follow a source deletion to the destination
    pub fn on_delete(&mut self, source_id: &str) -> DeleteOutcome {
        let Some(destination_id) = self
            .records
            .get(source_id, Instant::now())
            .map(str::to_string)
        else {
            debug!(source_id, "untracked_delete");
            return DeleteOutcome::Untracked;
        };

        let start = Instant::now();
        let deleted = self.destination.delete_post(&destination_id);
        trace_time!(start, "delete_post", source_id = source_id);

        match deleted {
            Ok(()) => {
                self.records.remove(source_id);
                info!(source_id, %destination_id, "deleted_post");
                DeleteOutcome::Deleted
            }
            Err(e) => {
                warn!(source_id, %destination_id, error = %e, "failed to delete mirrored post");
                DeleteOutcome::Failed
            }
        }
    }

    /// Poll the source account until `shutdown` is set.
    ///
    /// The first successful fetch only primes the cursor, so posts that
    /// existed before startup are never mirrored.
    pub fn run_polling(&mut self, shutdown: &AtomicBool) -> Result<()> {
        let interval = match self.mode {
            FetchMode::Polling { interval } => interval,
            FetchMode::Streaming => DEFAULT_POLL_INTERVAL,
        };
        let account_id = self.account_id()?;

        let mut primed = false;
        let mut cursor: Option<String> = None;

        info!(account_id = %account_id, interval_ms = interval.as_millis() as u64, "start_polling");
        while !shutdown.load(Ordering::SeqCst) {
            match self.source.fetch_statuses(&account_id, cursor.as_deref()) {
                Ok(posts) if !primed => {
                    cursor = posts.first().map(|p| p.id.clone());
                    primed = true;
                    debug!(cursor = ?cursor, "primed_cursor");
                }
                Ok(posts) => {
                    if let Some(newest) = posts.first() {
                        cursor = Some(newest.id.clone());
                    }
                    debug!(count = posts.len(), "fetched_posts");
                    for post in posts.iter().rev() {
                        if shutdown.load(Ordering::SeqCst) {
                            break;
                        }
                        self.on_update(post);
                    }
                }
                Err(e) => warn!(error = %e, "failed to fetch posts, retrying next tick"),
            }

            let swept = self.records.sweep(Instant::now());
            if swept > 0 {
                trace!(swept, "swept_records");
            }

            wait(interval, shutdown);
        }

        info!("stop_polling");
        Ok(())
    }

    /// Follow the user stream until `shutdown` is set.
    ///
    /// The flag is checked as each stream item arrives, so a shutdown takes
    /// effect at the next event or heartbeat (Mastodon sends one about every
    /// 15 seconds). A stream that ends or fails is fatal and returned as
    /// [`MirrorError::ConnectionLost`].
    pub fn run_streaming(&mut self, shutdown: &AtomicBool) -> Result<()> {
        self.account_id()?;
        let stream = self.source.stream_user()?;

        info!("start_streaming");
        for item in stream {
            if shutdown.load(Ordering::SeqCst) {
                info!("stop_streaming");
                return Ok(());
            }

            match item {
                Ok(StreamEvent::Update(post)) => {
                    self.on_update(&post);
                }
                Ok(StreamEvent::Delete(source_id)) => {
                    self.on_delete(&source_id);
                }
                Ok(StreamEvent::Heartbeat) => trace!("heartbeat"),
                Err(MirrorError::ConnectionLost(reason)) => {
                    return Err(MirrorError::ConnectionLost(reason))
                }
                Err(e) => warn!(error = %e, "skipping unreadable stream event"),
            }

            self.records.sweep(Instant::now());
        }

        if shutdown.load(Ordering::SeqCst) {
            info!("stop_streaming");
            return Ok(());
        }
        Err(MirrorError::ConnectionLost("stream ended".to_string()))
    }
}

/// Sleep for `interval`, waking early once `shutdown` is set.
///
/// An interval too long to represent as a deadline waits for shutdown only.
fn wait(interval: Duration, shutdown: &AtomicBool) {
    let deadline = Instant::now().checked_add(interval);
    while !shutdown.load(Ordering::SeqCst) {
        let remaining = match deadline {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => WAIT_SLICE,
        };
        if remaining.is_zero() {
            return;
        }
        thread::sleep(remaining.min(WAIT_SLICE));
    }
}
