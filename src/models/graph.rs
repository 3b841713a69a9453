//! Renderable graph shapes emitted by the reconciliation engine.
//!
//! These are the output of a reconciliation pass: nodes carrying snapshot
//! attributes plus engine-derived state (position, liveness, newly-seen),
//! and edges carrying the resolved parent/child structure. The presentation
//! layer consumes these shapes directly; nothing here depends on a renderer.

use super::AgentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Fixed identity of the synthetic root node.
///
/// The root is always present, never part of the snapshot source's output,
/// has no liveness, and anchors the layout. It is never the destination of
/// an edge.
pub const ROOT_ID: &str = "root";

/// Returns the synthetic root's [`AgentId`].
#[must_use]
pub fn root_id() -> AgentId {
    AgentId::new(ROOT_ID)
}

/// Derived liveness classification from heartbeat recency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Liveness {
    /// Heartbeat is recent (or the agent has never checked in).
    Alive,
    /// Heartbeat is older than the configured threshold.
    Dead,
}

impl Liveness {
    /// Returns the liveness as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Alive => "alive",
            Self::Dead => "dead",
        }
    }

    /// Returns true for [`Liveness::Alive`].
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        matches!(self, Self::Alive)
    }
}

impl fmt::Display for Liveness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A 2D coordinate owned by the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Position {
    /// Creates a position from coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A node in the renderable graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderNode {
    /// Stable internal identifier.
    pub id: AgentId,
    /// Identifier shown to operators.
    pub display_name: String,
    /// Last heartbeat, passed through for display.
    pub last_heartbeat: Option<DateTime<Utc>>,
    /// False when the agent has never reported a heartbeat ("never checked
    /// in"); such agents still classify as alive.
    pub has_checked_in: bool,
    /// Soft-visibility flag as delivered by the snapshot.
    pub visible: bool,
    /// Lock flag, informational only.
    pub locked: bool,
    /// Derived liveness, subject to the entrance grace window.
    pub liveness: Liveness,
    /// True exactly once per agent id, on the first pass that observes it.
    pub newly_seen: bool,
    /// Position assigned by the layout engine, stable across polls.
    pub position: Position,
    /// Opaque display metadata passed through from the snapshot record.
    pub metadata: HashMap<String, serde_json::Value>,
}

/// An edge in the renderable graph.
///
/// Explicit edges run child to parent: the source is the agent that owns
/// its single parent edge. Implicit edges run root to agent, so the root
/// is never a destination. The `implicit` flag tells renderers which
/// orientation they are looking at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderEdge {
    /// Source: the child agent for explicit edges, the root for implicit
    /// ones.
    pub source: AgentId,
    /// Destination: the parent agent for explicit edges, the unparented
    /// agent for implicit ones.
    pub destination: AgentId,
    /// Resolved label, if any.
    pub label: Option<String>,
    /// True when the edge was synthesized because no explicit link supplied
    /// a parent.
    pub implicit: bool,
}

impl RenderEdge {
    /// Returns the agent this edge assigns a parent to.
    #[must_use]
    pub const fn child(&self) -> &AgentId {
        if self.implicit {
            &self.destination
        } else {
            &self.source
        }
    }

    /// Returns the parent this edge assigns.
    #[must_use]
    pub const fn parent(&self) -> &AgentId {
        if self.implicit {
            &self.source
        } else {
            &self.destination
        }
    }
}

/// Counters accumulated over one reconciliation pass.
///
/// Anomalies are never fatal; they are counted here and logged at warn
/// level so a degraded snapshot still renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReconcileStats {
    /// Agents rendered this pass.
    pub visible_agents: usize,
    /// Agents excluded by the soft-visibility filter.
    pub hidden_agents: usize,
    /// Malformed or dangling link records dropped by the resolver.
    pub dropped_links: usize,
    /// Sources that held more than one active link (data inconsistency).
    pub duplicate_parents: usize,
    /// Implicit root edges synthesized this pass.
    pub implicit_edges: usize,
    /// Nodes whose dead classification was suppressed by the entrance
    /// grace window.
    pub grace_suppressed: usize,
}

/// The output of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RenderGraph {
    /// Renderable nodes, ordered by id for deterministic output. The root
    /// is not among them; it is always present and drawn at
    /// `root_position`.
    pub nodes: Vec<RenderNode>,
    /// Resolved edges, ordered by (source, destination).
    pub edges: Vec<RenderEdge>,
    /// Where the synthetic root is anchored.
    pub root_position: Position,
    /// Pass counters.
    pub stats: ReconcileStats,
}

impl RenderGraph {
    /// Returns the node with the given id, if rendered this pass.
    #[must_use]
    pub fn node(&self, id: &AgentId) -> Option<&RenderNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Returns the edge naming the given agent's parent, if any.
    #[must_use]
    pub fn parent_edge(&self, agent: &AgentId) -> Option<&RenderEdge> {
        self.edges.iter().find(|e| e.child() == agent)
    }

    /// Returns true if the graph contains no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for RenderNode {
    fn default() -> Self {
        Self {
            id: AgentId::new(""),
            display_name: String::new(),
            last_heartbeat: None,
            has_checked_in: false,
            visible: true,
            locked: false,
            liveness: Liveness::Alive,
            newly_seen: false,
            position: Position::default(),
            metadata: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_liveness_display() {
        assert_eq!(Liveness::Alive.to_string(), "alive");
        assert_eq!(Liveness::Dead.to_string(), "dead");
        assert!(Liveness::Alive.is_alive());
        assert!(!Liveness::Dead.is_alive());
    }

    #[test]
    fn test_liveness_serde_lowercase() {
        let json = serde_json::to_string(&Liveness::Dead).expect("serializes");
        assert_eq!(json, "\"dead\"");
    }

    #[test]
    fn test_parent_edge_lookup() {
        let graph = RenderGraph {
            nodes: Vec::new(),
            edges: vec![
                RenderEdge {
                    source: root_id(),
                    destination: AgentId::new("a"),
                    label: None,
                    implicit: true,
                },
                RenderEdge {
                    source: AgentId::new("b"),
                    destination: AgentId::new("a"),
                    label: None,
                    implicit: false,
                },
            ],
            root_position: Position::default(),
            stats: ReconcileStats::default(),
        };

        let a_parent = graph.parent_edge(&AgentId::new("a")).expect("edge exists");
        assert_eq!(a_parent.parent(), &root_id());

        let b_parent = graph.parent_edge(&AgentId::new("b")).expect("edge exists");
        assert_eq!(b_parent.parent(), &AgentId::new("a"));

        assert!(graph.parent_edge(&AgentId::new("c")).is_none());
    }
}
