//! Source → destination id records with a fixed retention window
//!
//! Records expire a fixed time after insertion, so insertion order is expiry
//! order and a FIFO queue is enough to index them. Replacing or removing a
//! record leaves its old queue entry behind; [`MirrorRecords::sweep`] skips
//! entries that no longer match the live record.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use tracing::warn;

/// Default retention of a record
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(60 * 60);

/// Longest accepted retention (30 days)
pub const MAX_RETENTION: Duration = Duration::from_secs(30 * 24 * 60 * 60);

#[derive(Debug, Clone)]
struct Record {
    destination_id: String,
    expires_at: Instant,
}

/// In-memory mirror records, owned by a single orchestrator
#[derive(Debug)]
pub struct MirrorRecords {
    retention: Duration,
    live: HashMap<String, Record>,
    expiry: VecDeque<(Instant, String)>,
}

impl Default for MirrorRecords {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION)
    }
}

impl MirrorRecords {
    /// Create an empty store; `retention` is capped at [`MAX_RETENTION`]
    pub fn new(retention: Duration) -> Self {
        Self {
            retention: retention.min(MAX_RETENTION),
            live: HashMap::new(),
            expiry: VecDeque::new(),
        }
    }

    /// Record that `source_id` was mirrored as `destination_id`.
    ///
    /// Replaces any previous record for the same source id. Returns false
    /// when no expiry instant can be represented and nothing was stored.
    pub fn insert(
        &mut self,
        source_id: impl Into<String>,
        destination_id: impl Into<String>,
        now: Instant,
    ) -> bool {
        let source_id = source_id.into();
        let Some(expires_at) = now.checked_add(self.retention) else {
            warn!(source_id = %source_id, "record expiry out of range, not tracking");
            return false;
        };

        self.expiry.push_back((expires_at, source_id.clone()));
        self.live.insert(
            source_id,
            Record {
                destination_id: destination_id.into(),
                expires_at,
            },
        );
        true
    }

    /// Destination id for `source_id`, unless the record has expired
    pub fn get(&self, source_id: &str, now: Instant) -> Option<&str> {
        self.live
            .get(source_id)
            .filter(|record| record.expires_at > now)
            .map(|record| record.destination_id.as_str())
    }

    /// Remove the record for `source_id`, returning its destination id
    pub fn remove(&mut self, source_id: &str) -> Option<String> {
        self.live
            .remove(source_id)
            .map(|record| record.destination_id)
    }

    /// Evict every record that expired at or before `now`.
    ///
    /// Returns the number of live records evicted.
    pub fn sweep(&mut self, now: Instant) -> usize {
        let mut evicted = 0;

        while let Some((expires_at, _)) = self.expiry.front() {
            if *expires_at > now {
                break;
            }
            let Some((expires_at, source_id)) = self.expiry.pop_front() else {
                break;
            };

            let is_current = self
                .live
                .get(&source_id)
                .is_some_and(|record| record.expires_at == expires_at);
            if is_current {
                self.live.remove(&source_id);
                evicted += 1;
            }
        }

        evicted
    }

    /// Number of records, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
