//! The reconciliation engine.
//!
//! One pass turns a snapshot into the renderable graph: visibility filter,
//! edge resolution, presence + liveness derivation, then layout for any
//! node that does not already have a position. Nothing in a pass is allowed
//! to abort it; per-record failures degrade to drops with warn logs and
//! counters so the rest of the graph still renders.

use super::{classify, resolve, LayoutEngine, PositionStore, SeenTracker};
use crate::config::EngineConfig;
use crate::models::{
    AgentId, Liveness, Position, ReconcileStats, RenderGraph, RenderNode, Snapshot,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use tracing::instrument;

/// Presentation-side filters applied before reconciliation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewOptions {
    /// Include soft-hidden agents in the graph.
    pub show_hidden: bool,
}

/// Orchestrates one reconciliation pass per snapshot.
///
/// The tracker and position store are owned state injected at construction
/// (or created fresh), never ambient module state, so multiple independent
/// graph views can coexist and tests stay deterministic.
#[derive(Debug, Clone)]
pub struct Reconciler {
    config: EngineConfig,
    tracker: SeenTracker,
    positions: PositionStore,
    layout: LayoutEngine,
}

impl Reconciler {
    /// Creates a reconciler with fresh session state.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_state(config, SeenTracker::new(), PositionStore::new())
    }

    /// Creates a reconciler with injected tracker and position state.
    #[must_use]
    pub fn with_state(config: EngineConfig, tracker: SeenTracker, positions: PositionStore) -> Self {
        let layout = LayoutEngine::new(config.layout);
        Self {
            config,
            tracker,
            positions,
            layout,
        }
    }

    /// Returns the engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the presence tracker.
    #[must_use]
    pub const fn tracker(&self) -> &SeenTracker {
        &self.tracker
    }

    /// Returns the position store.
    #[must_use]
    pub const fn positions(&self) -> &PositionStore {
        &self.positions
    }

    /// Records a manual drag.
    ///
    /// A pure local write with last-writer-wins semantics; it never touches
    /// the backing store, and whether it survives a restart is the
    /// embedder's concern under [`crate::PositionPolicy`].
    pub fn set_position(&mut self, id: AgentId, position: Position) {
        self.positions.set(id, position);
    }

    /// Runs one reconciliation pass.
    ///
    /// Idempotent: an unchanged snapshot, clock, and tracker state yields
    /// identical output. Liveness may legitimately flip between calls when
    /// the clock advances; that is derived state working as intended.
    #[instrument(skip_all, fields(agents = snapshot.agents.len(), links = snapshot.links.len()))]
    pub fn reconcile(
        &mut self,
        snapshot: &Snapshot,
        now: DateTime<Utc>,
        view: &ViewOptions,
    ) -> RenderGraph {
        let mut stats = ReconcileStats::default();

        // Visibility filter; duplicate ids in a snapshot keep the first
        // record so one pass never renders the same node twice.
        let mut order: Vec<AgentId> = Vec::new();
        let mut visible_ids: BTreeSet<AgentId> = BTreeSet::new();
        let mut records = Vec::new();
        for record in &snapshot.agents {
            if !record.visible && !view.show_hidden {
                stats.hidden_agents += 1;
                continue;
            }
            if !visible_ids.insert(record.id.clone()) {
                tracing::warn!(agent = %record.id, "duplicate agent record in snapshot");
                continue;
            }
            order.push(record.id.clone());
            records.push(record);
        }
        stats.visible_agents = records.len();

        let (edges, resolver_stats) = resolve(&visible_ids, &snapshot.links);
        stats.dropped_links = resolver_stats.dropped_links;
        stats.duplicate_parents = resolver_stats.duplicate_parents;
        stats.implicit_edges = resolver_stats.implicit_edges;

        // Positions: prune departed nodes, keep everything else where it
        // is, lay out only the nodes that have never been placed.
        self.positions.prune(&visible_ids);
        self.layout.layout(&order, &edges, &mut self.positions);

        let mut nodes: Vec<RenderNode> = Vec::with_capacity(records.len());
        for record in records {
            let newly_seen = self.tracker.observe(&record.id, now);
            let liveness =
                self.classified_liveness(record.last_heartbeat, &record.id, now, &mut stats);
            nodes.push(RenderNode {
                id: record.id.clone(),
                display_name: record.display_name().to_string(),
                last_heartbeat: record.last_heartbeat,
                has_checked_in: record.has_checked_in(),
                visible: record.visible,
                locked: record.locked,
                liveness,
                newly_seen,
                position: self.positions.get(&record.id).unwrap_or_default(),
                metadata: record.metadata.clone(),
            });
        }
        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        tracing::debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            implicit = stats.implicit_edges,
            "reconciled snapshot"
        );

        RenderGraph {
            nodes,
            edges,
            root_position: self.config.layout.anchor,
            stats,
        }
    }

    /// Classifies liveness, holding back a dead verdict while the node is
    /// still inside its entrance grace window.
    fn classified_liveness(
        &self,
        last_heartbeat: Option<DateTime<Utc>>,
        id: &AgentId,
        now: DateTime<Utc>,
        stats: &mut ReconcileStats,
    ) -> Liveness {
        let raw = classify(last_heartbeat, now, self.config.dead_after);
        if raw == Liveness::Alive {
            return raw;
        }
        let in_grace = self.tracker.first_seen(id).is_some_and(|first| {
            (now - first).to_std().unwrap_or_default() < self.config.entrance_grace
        });
        if in_grace {
            stats.grace_suppressed += 1;
            return Liveness::Alive;
        }
        raw
    }
}
