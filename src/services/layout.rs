//! Position ownership and banded tree layout.
//!
//! The position map is the one piece of state that must survive between
//! polls even though snapshots have no concept of position. The layout
//! engine only ever assigns coordinates to nodes that do not already have
//! one; a node that was placed (by layout or by manual drag) keeps its
//! coordinate unconditionally, so the displayed graph never jitters.

use crate::config::LayoutConfig;
use crate::models::{AgentId, Position, RenderEdge, ROOT_ID};
use std::collections::{BTreeSet, HashMap};

/// Map of node id to position, owned across reconciliation passes.
///
/// Writes are last-writer-wins: a manual drag is just a [`set`] call and is
/// never authoritative beyond this store.
///
/// [`set`]: PositionStore::set
#[derive(Debug, Clone, Default)]
pub struct PositionStore {
    positions: HashMap<AgentId, Position>,
}

impl PositionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with existing positions (e.g. restored by an
    /// embedder running a persistent position policy).
    #[must_use]
    pub fn with_positions(positions: HashMap<AgentId, Position>) -> Self {
        Self { positions }
    }

    /// Returns the position for a node, if one is assigned.
    #[must_use]
    pub fn get(&self, id: &AgentId) -> Option<Position> {
        self.positions.get(id).copied()
    }

    /// Returns true if the node already has a position.
    #[must_use]
    pub fn contains(&self, id: &AgentId) -> bool {
        self.positions.contains_key(id)
    }

    /// Assigns a position, replacing any previous one.
    pub fn set(&mut self, id: AgentId, position: Position) {
        self.positions.insert(id, position);
    }

    /// Drops positions for nodes absent from the new snapshot.
    ///
    /// The root's position is always retained.
    pub fn prune(&mut self, retain: &BTreeSet<AgentId>) {
        self.positions
            .retain(|id, _| id.as_str() == ROOT_ID || retain.contains(id));
    }

    /// Number of positioned nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if no node is positioned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Copies the current positions, for embedders that persist them.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<AgentId, Position> {
        self.positions.clone()
    }
}

/// Assigns coordinates to nodes that lack one.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    /// Creates a layout engine with the given geometry.
    #[must_use]
    pub const fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Lays out one pass.
    ///
    /// `order` is the visible agent ids in snapshot observation order;
    /// `edges` is the resolved edge set, which determines each node's
    /// depth. The root is pinned at the anchor. Depth-1 nodes (parent is
    /// the root) are placed on a band below the root, evenly spaced and
    /// centered, ordered lexicographically by id. Deeper nodes go on a
    /// secondary band in observation order. Nodes already present in the
    /// store are left exactly where they are.
    pub fn layout(&self, order: &[AgentId], edges: &[RenderEdge], store: &mut PositionStore) {
        let anchor = self.config.anchor;
        store.set(AgentId::new(ROOT_ID), anchor);

        let root_children: BTreeSet<&AgentId> = edges
            .iter()
            .filter(|e| e.parent().as_str() == ROOT_ID)
            .map(RenderEdge::child)
            .collect();

        // Depth 1: stable sort key is the lexicographic id, so the band is
        // deterministic for a given membership set.
        let first_band: Vec<&AgentId> = root_children.iter().copied().collect();
        self.place_band(&first_band, anchor.y + self.config.level_gap, store);

        // Depth >= 2: stacking fallback in observation order, one band down.
        let second_band: Vec<&AgentId> = order
            .iter()
            .filter(|id| !root_children.contains(id) && id.as_str() != ROOT_ID)
            .collect();
        self.place_band(&second_band, anchor.y + 2.0 * self.config.level_gap, store);
    }

    /// Places unpositioned members of one band, evenly spaced and centered
    /// under the anchor. Slots are computed for the whole band so siblings
    /// do not overlap, but only nodes without a position are moved.
    #[allow(clippy::cast_precision_loss)]
    fn place_band(&self, members: &[&AgentId], y: f32, store: &mut PositionStore) {
        let count = members.len();
        if count == 0 {
            return;
        }
        let span = (count as f32 - 1.0) * self.config.node_gap;
        let left = self.config.anchor.x - span / 2.0;

        for (i, id) in members.iter().enumerate() {
            if store.contains(id) {
                continue;
            }
            let x = left + i as f32 * self.config.node_gap;
            store.set((*id).clone(), Position::new(x, y));
        }
    }
}
