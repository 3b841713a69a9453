//! Agent records as delivered by the snapshot source.
//!
//! An agent is a node in the topology graph: a remote host/process under the
//! platform's control. The snapshot source delivers the full agent list on
//! every poll with no ordering or delta guarantees; everything derived
//! (liveness, newly-seen, position) is computed by the engine, never carried
//! on the record itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Unique identifier for an agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Creates a new agent ID from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the agent ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for AgentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One agent record from a snapshot.
///
/// Host/user/process metadata is opaque to the engine and passed through to
/// the renderable node untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Stable internal identifier.
    pub id: AgentId,
    /// Human-facing display identifier; may differ from the internal id.
    #[serde(default)]
    pub display_id: Option<String>,
    /// Last heartbeat timestamp. `None` means the agent has never checked in.
    #[serde(default)]
    pub last_heartbeat: Option<DateTime<Utc>>,
    /// Soft-visibility flag. Hidden agents are excluded from the graph but
    /// not deleted.
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Lock flag. Informational only to this subsystem.
    #[serde(default)]
    pub locked: bool,
    /// Opaque display metadata (host, user, process, ...), passed through.
    #[serde(default, flatten)]
    pub metadata: HashMap<String, serde_json::Value>,
}

const fn default_visible() -> bool {
    true
}

impl AgentRecord {
    /// Creates a minimal agent record with the given id.
    #[must_use]
    pub fn new(id: impl Into<AgentId>) -> Self {
        Self {
            id: id.into(),
            display_id: None,
            last_heartbeat: None,
            visible: true,
            locked: false,
            metadata: HashMap::new(),
        }
    }

    /// Sets the display identifier.
    #[must_use]
    pub fn with_display_id(mut self, display_id: impl Into<String>) -> Self {
        self.display_id = Some(display_id.into());
        self
    }

    /// Sets the last heartbeat timestamp.
    #[must_use]
    pub const fn with_heartbeat(mut self, at: DateTime<Utc>) -> Self {
        self.last_heartbeat = Some(at);
        self
    }

    /// Sets the visibility flag.
    #[must_use]
    pub const fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Sets the lock flag.
    #[must_use]
    pub const fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    /// Adds an opaque metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Returns the identifier shown to operators: the display id when set,
    /// the internal id otherwise.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_id.as_deref().unwrap_or_else(|| self.id.as_str())
    }

    /// Returns true if the agent has ever reported a heartbeat.
    #[must_use]
    pub const fn has_checked_in(&self) -> bool {
        self.last_heartbeat.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_id_roundtrip() {
        let id = AgentId::new("agent-7");
        assert_eq!(id.as_str(), "agent-7");
        assert_eq!(id.to_string(), "agent-7");
        assert_eq!(AgentId::from("agent-7"), id);
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let plain = AgentRecord::new("abc123");
        assert_eq!(plain.display_name(), "abc123");

        let named = AgentRecord::new("abc123").with_display_id("WEB-01");
        assert_eq!(named.display_name(), "WEB-01");
    }

    #[test]
    fn test_record_defaults_visible() {
        let json = r#"{"id": "a1"}"#;
        let record: AgentRecord = serde_json::from_str(json).expect("record parses");
        assert!(record.visible);
        assert!(!record.locked);
        assert!(record.last_heartbeat.is_none());
        assert!(!record.has_checked_in());
    }

    #[test]
    fn test_metadata_passthrough() {
        let json = r#"{"id": "a1", "hostname": "db-prod-2", "pid": 4412}"#;
        let record: AgentRecord = serde_json::from_str(json).expect("record parses");
        assert_eq!(
            record.metadata.get("hostname"),
            Some(&serde_json::json!("db-prod-2"))
        );
        assert_eq!(record.metadata.get("pid"), Some(&serde_json::json!(4412)));
    }
}
