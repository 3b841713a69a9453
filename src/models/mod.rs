//! Data models for topoview.
//!
//! This module contains all the core data structures used throughout the
//! engine: snapshot records as delivered by the snapshot source, and the
//! renderable graph shapes the reconciliation engine emits.

mod agent;
mod graph;
mod link;
mod snapshot;

pub use agent::{AgentId, AgentRecord};
pub use graph::{
    root_id, Liveness, Position, ReconcileStats, RenderEdge, RenderGraph, RenderNode, ROOT_ID,
};
pub use link::{LinkId, LinkRecord};
pub use snapshot::{Snapshot, SnapshotStats};
