//! Topology mutations.
//!
//! Mutations are fire-and-forget with eventual reconciliation: submitting
//! one does not touch the renderable graph. The caller refreshes the
//! snapshot after a mutation completes and the next reconciliation pass
//! reflects the change, or the pre-mutation state if the mutation failed.
//! Every operation is idempotent-safe to retry.

use crate::models::{AgentId, AgentRecord, LinkId, LinkRecord, Snapshot, ROOT_ID};
use crate::source::SnapshotSource;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// User-initiated topology edits, submitted to the backing store.
pub trait MutationGateway: Send {
    /// Sets an agent's soft-visibility flag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MutationRejected`] when the agent is unknown.
    fn set_visibility(&mut self, agent: &AgentId, visible: bool) -> Result<()>;

    /// Sets an agent's lock flag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MutationRejected`] when the agent is unknown.
    fn set_locked(&mut self, agent: &AgentId, locked: bool) -> Result<()>;

    /// Creates a parent link, superseding any active link from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MutationRejected`] when either endpoint is unknown,
    /// the link would be a self-loop, or the destination is the root.
    fn create_link(
        &mut self,
        source: &AgentId,
        destination: &AgentId,
        label: Option<&str>,
    ) -> Result<LinkId>;

    /// Ends a link. Ending an already-ended link is a no-op success.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MutationRejected`] when the link id is unknown.
    fn end_link(&mut self, link: &LinkId) -> Result<()>;
}

/// In-memory backing store implementing both collaborator boundaries.
///
/// Serves as the test double for the mutate, repoll, reconcile loop.
/// Mutations are serialized trivially by `&mut self`; real deployments get
/// their serialization from the backing store itself.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    agents: BTreeMap<AgentId, AgentRecord>,
    links: Vec<LinkRecord>,
}

impl MemoryBackend {
    /// Creates an empty backing store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces an agent record.
    pub fn upsert_agent(&mut self, record: AgentRecord) {
        self.agents.insert(record.id.clone(), record);
    }

    /// Records a heartbeat for an agent, creating it if unknown.
    pub fn heartbeat(&mut self, id: &AgentId, at: DateTime<Utc>) {
        self.agents
            .entry(id.clone())
            .or_insert_with(|| AgentRecord::new(id.clone()))
            .last_heartbeat = Some(at);
    }

    /// Number of registered agents.
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Returns the active link from the given source, if any.
    #[must_use]
    pub fn active_link_from(&self, source: &AgentId) -> Option<&LinkRecord> {
        self.links
            .iter()
            .find(|l| l.is_active() && &l.source == source)
    }

    fn require_agent(&self, agent: &AgentId, operation: &str) -> Result<()> {
        if self.agents.contains_key(agent) {
            Ok(())
        } else {
            Err(Error::MutationRejected {
                operation: operation.to_string(),
                reason: format!("unknown agent '{agent}'"),
            })
        }
    }
}

impl MutationGateway for MemoryBackend {
    fn set_visibility(&mut self, agent: &AgentId, visible: bool) -> Result<()> {
        self.require_agent(agent, "set_visibility")?;
        if let Some(record) = self.agents.get_mut(agent) {
            record.visible = visible;
        }
        tracing::debug!(agent = %agent, visible, "visibility updated");
        Ok(())
    }

    fn set_locked(&mut self, agent: &AgentId, locked: bool) -> Result<()> {
        self.require_agent(agent, "set_locked")?;
        if let Some(record) = self.agents.get_mut(agent) {
            record.locked = locked;
        }
        tracing::debug!(agent = %agent, locked, "lock updated");
        Ok(())
    }

    fn create_link(
        &mut self,
        source: &AgentId,
        destination: &AgentId,
        label: Option<&str>,
    ) -> Result<LinkId> {
        self.require_agent(source, "create_link")?;
        self.require_agent(destination, "create_link")?;
        if source == destination {
            return Err(Error::MutationRejected {
                operation: "create_link".to_string(),
                reason: "source and destination are the same agent".to_string(),
            });
        }
        if destination.as_str() == ROOT_ID {
            return Err(Error::MutationRejected {
                operation: "create_link".to_string(),
                reason: "the root is never a link destination".to_string(),
            });
        }

        // A new parent supersedes the old one.
        self.links
            .retain(|l| !(l.is_active() && &l.source == source));

        let mut link = LinkRecord::new(source.clone(), destination.clone());
        if let Some(label) = label {
            link = link.with_label(label);
        }
        let id = link.id.clone();
        tracing::debug!(link = %id, source = %source, destination = %destination, "link created");
        self.links.push(link);
        Ok(id)
    }

    fn end_link(&mut self, link: &LinkId) -> Result<()> {
        let Some(record) = self.links.iter_mut().find(|l| &l.id == link) else {
            return Err(Error::MutationRejected {
                operation: "end_link".to_string(),
                reason: format!("unknown link '{link}'"),
            });
        };
        // Retry-safe: ending an ended link keeps the original end time.
        record.close_at(Utc::now());
        tracing::debug!(link = %link, "link ended");
        Ok(())
    }
}

impl SnapshotSource for MemoryBackend {
    fn fetch(&mut self) -> Result<Snapshot> {
        Ok(Snapshot::new(
            self.agents.values().cloned().collect(),
            self.links.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(names: &[&str]) -> MemoryBackend {
        let mut store = MemoryBackend::new();
        for name in names {
            store.upsert_agent(AgentRecord::new(*name));
        }
        store
    }

    #[test]
    fn test_unknown_agent_rejected() {
        let mut store = store_with(&["a"]);
        let err = store.set_visibility(&AgentId::new("ghost"), false).unwrap_err();
        assert!(matches!(err, Error::MutationRejected { .. }));
    }

    #[test]
    fn test_create_link_supersedes_previous_parent() {
        let mut store = store_with(&["a", "b", "c"]);
        store
            .create_link(&AgentId::new("c"), &AgentId::new("a"), None)
            .expect("first link");
        store
            .create_link(&AgentId::new("c"), &AgentId::new("b"), Some("beacon"))
            .expect("second link");

        let active = store.active_link_from(&AgentId::new("c")).expect("active");
        assert_eq!(active.destination.as_str(), "b");
        assert_eq!(active.label.as_deref(), Some("beacon"));

        let active_count = store
            .links
            .iter()
            .filter(|l| l.is_active() && l.source.as_str() == "c")
            .count();
        assert_eq!(active_count, 1);
    }

    #[test]
    fn test_self_loop_and_root_destination_rejected() {
        let mut store = store_with(&["a", "root"]);
        assert!(store
            .create_link(&AgentId::new("a"), &AgentId::new("a"), None)
            .is_err());
        assert!(store
            .create_link(&AgentId::new("a"), &AgentId::new("root"), None)
            .is_err());
    }

    #[test]
    fn test_end_link_is_retry_safe() {
        let mut store = store_with(&["a", "b"]);
        let id = store
            .create_link(&AgentId::new("b"), &AgentId::new("a"), None)
            .expect("link");

        store.end_link(&id).expect("first end");
        let first_end = store.links[0].ended_at;
        store.end_link(&id).expect("second end is a no-op success");
        assert_eq!(store.links[0].ended_at, first_end);

        let err = store.end_link(&LinkId::new("missing")).unwrap_err();
        assert!(matches!(err, Error::MutationRejected { .. }));
    }

    #[test]
    fn test_snapshot_reflects_mutations() {
        let mut store = store_with(&["a", "b"]);
        store.set_visibility(&AgentId::new("b"), false).expect("hide");
        store
            .create_link(&AgentId::new("b"), &AgentId::new("a"), None)
            .expect("link");

        let snapshot = store.fetch().expect("fetch");
        assert_eq!(snapshot.agents.len(), 2);
        assert_eq!(snapshot.links.len(), 1);
        let hidden = snapshot
            .agents
            .iter()
            .find(|a| a.id.as_str() == "b")
            .expect("b present");
        assert!(!hidden.visible);
    }
}
