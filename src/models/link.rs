//! Link records: directed, time-scoped relationships between agents.
//!
//! A link with `ended_at == None` is currently active. Among active links
//! whose destination is not the source itself, at most one may exist per
//! source agent (an agent has at most one current parent); the resolver
//! enforces this when the backing store does not.

use super::AgentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a link record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(String);

impl LinkId {
    /// Creates a new link ID from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a new unique link ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("lnk_{}", uuid::Uuid::new_v4().simple()))
    }

    /// Returns the link ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for LinkId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One link record from a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Unique identifier for this record.
    pub id: LinkId,
    /// Source agent (the child end; the agent whose parent this link names).
    pub source: AgentId,
    /// Destination agent (the parent end).
    pub destination: AgentId,
    /// End timestamp. `None` means the link is currently active.
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    /// Optional label, e.g. a channel name.
    #[serde(default)]
    pub label: Option<String>,
}

impl LinkRecord {
    /// Creates a new active link between two agents.
    #[must_use]
    pub fn new(source: impl Into<AgentId>, destination: impl Into<AgentId>) -> Self {
        Self {
            id: LinkId::generate(),
            source: source.into(),
            destination: destination.into(),
            ended_at: None,
            label: None,
        }
    }

    /// Sets the link label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets a specific link id.
    #[must_use]
    pub fn with_id(mut self, id: LinkId) -> Self {
        self.id = id;
        self
    }

    /// Returns true if the link is currently active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Ends this link at the given timestamp.
    ///
    /// Ending an already-ended link keeps the original end time; repeat
    /// calls are a no-op, matching the gateway's retry-safe contract.
    pub fn close_at(&mut self, at: DateTime<Utc>) {
        if self.ended_at.is_none() {
            self.ended_at = Some(at);
        }
    }

    /// Returns true if the link points at its own source.
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.source == self.destination
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_id_generate_unique() {
        let a = LinkId::generate();
        let b = LinkId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("lnk_"));
    }

    #[test]
    fn test_close_at_is_idempotent() {
        let mut link = LinkRecord::new("child", "parent");
        assert!(link.is_active());

        let first = Utc::now();
        link.close_at(first);
        assert!(!link.is_active());

        let later = first + chrono::Duration::seconds(60);
        link.close_at(later);
        assert_eq!(link.ended_at, Some(first));
    }

    #[test]
    fn test_self_loop_detection() {
        assert!(LinkRecord::new("a", "a").is_self_loop());
        assert!(!LinkRecord::new("a", "b").is_self_loop());
    }
}
