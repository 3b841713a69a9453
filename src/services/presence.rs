//! Session-scoped presence tracking.
//!
//! "New" means new to this running session, not new to the system: the
//! tracker never forgets an id, so an agent that is hidden and later
//! reappears is not re-flagged. The first-seen timestamp it records drives
//! the entrance grace window in the reconciler.

use crate::models::AgentId;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Monotonically growing record of agent ids seen this session.
#[derive(Debug, Clone, Default)]
pub struct SeenTracker {
    first_seen: HashMap<AgentId, DateTime<Utc>>,
}

impl SeenTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Observes an agent id, returning true exactly once per id.
    ///
    /// The first observation records `now` as the id's first-seen time;
    /// every later observation returns false and leaves the timestamp
    /// untouched.
    pub fn observe(&mut self, id: &AgentId, now: DateTime<Utc>) -> bool {
        if self.first_seen.contains_key(id) {
            return false;
        }
        tracing::debug!(agent = %id, "first sighting");
        self.first_seen.insert(id.clone(), now);
        true
    }

    /// Returns when the id was first observed, if ever.
    #[must_use]
    pub fn first_seen(&self, id: &AgentId) -> Option<DateTime<Utc>> {
        self.first_seen.get(id).copied()
    }

    /// Returns true if the id has been observed before.
    #[must_use]
    pub fn contains(&self, id: &AgentId) -> bool {
        self.first_seen.contains_key(id)
    }

    /// Number of distinct ids observed this session.
    #[must_use]
    pub fn len(&self) -> usize {
        self.first_seen.len()
    }

    /// Returns true if nothing has been observed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first_seen.is_empty()
    }
}
