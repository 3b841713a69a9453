//! # Topoview
//!
//! Live topology reconciliation engine for operator consoles.
//!
//! Topoview turns a periodically repolled, unordered snapshot of agents and
//! links into a stable, incrementally updated renderable graph. Snapshots
//! carry no ordering or delta information, so the engine diffs state itself:
//! it derives each agent's liveness from heartbeat recency, flags agents that
//! are new to the session exactly once, resolves explicit parent links plus
//! one implicit root edge per unparented agent, and keeps every node's
//! position stable across polls so the displayed graph never jitters.
//!
//! ## Features
//!
//! - Pure, scheduler-agnostic `reconcile(snapshot, now) -> RenderGraph`
//! - Single-parent invariant with deterministic tie-breaking
//! - Liveness hysteresis so fresh nodes are not instantly marked dead
//! - Session-scoped newly-seen tracking for one-shot entrance presentation
//! - Position map owned by the engine, preserved across polls
//!
//! ## Example
//!
//! ```rust,ignore
//! use topoview::{EngineConfig, Reconciler, ViewOptions};
//!
//! let mut engine = Reconciler::new(EngineConfig::default());
//! let graph = engine.reconcile(&snapshot, chrono::Utc::now(), &ViewOptions::default());
//! for node in &graph.nodes {
//!     println!("{} at ({}, {})", node.id, node.position.x, node.position.y);
//! }
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use thiserror::Error as ThisError;

// Module declarations
pub mod cli;
pub mod config;
pub mod gateway;
pub mod models;
pub mod observability;
pub mod services;
pub mod source;

// Re-exports for convenience
pub use config::{EngineConfig, LayoutConfig, PositionPolicy};
pub use gateway::{MemoryBackend, MutationGateway};
pub use models::{
    AgentId, AgentRecord, LinkId, LinkRecord, Liveness, Position, RenderEdge, RenderGraph,
    RenderNode, Snapshot, ROOT_ID,
};
pub use services::{
    LayoutEngine, PositionStore, Reconciler, ResolverStats, SeenTracker, ViewOptions,
};
pub use source::{JsonFileSource, SnapshotSource, StaticSource};

/// Error type for topoview operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Empty agent ids, malformed config values, bad CLI arguments |
/// | `OperationFailed` | Snapshot file cannot be read or decoded, config file I/O fails |
/// | `MutationRejected` | The backing store refuses a topology edit (unknown agent, conflicting link) |
///
/// Nothing inside a reconciliation pass returns an error: malformed records
/// are dropped and counted, resolver inconsistencies are resolved
/// deterministically, and clock anomalies are clamped.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - A snapshot file cannot be read or decoded
    /// - Configuration file I/O or parsing fails
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A topology mutation was rejected by the backing store.
    ///
    /// The engine takes no corrective action on rejection; the next snapshot
    /// simply shows the pre-mutation state.
    #[error("mutation '{operation}' rejected: {reason}")]
    MutationRejected {
        /// The mutation operation that was rejected.
        operation: String,
        /// Why the backing store refused it.
        reason: String,
    },
}

/// Result type alias for topoview operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("empty agent id".to_string());
        assert_eq!(err.to_string(), "invalid input: empty agent id");

        let err = Error::OperationFailed {
            operation: "read_snapshot".to_string(),
            cause: "no such file".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "operation 'read_snapshot' failed: no such file"
        );

        let err = Error::MutationRejected {
            operation: "create_link".to_string(),
            reason: "unknown source agent".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "mutation 'create_link' rejected: unknown source agent"
        );
    }
}
