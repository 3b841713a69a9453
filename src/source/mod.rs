//! Snapshot sources.
//!
//! The engine is transport-agnostic: anything that can produce a full
//! [`Snapshot`] per poll can drive it. The implementations here cover the
//! CLI (a JSON file re-read on every poll) and tests (a fixed snapshot);
//! a real deployment would implement [`SnapshotSource`] over its own
//! transport.

use crate::models::{Snapshot, SnapshotStats};
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// A source of full topology snapshots.
///
/// Each call must deliver the complete current agent and link lists; no
/// ordering or delta guarantees are expected of implementations.
pub trait SnapshotSource: Send {
    /// Fetches the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error when the poll cannot be completed; the caller is
    /// expected to keep rendering the last successfully reconciled graph.
    fn fetch(&mut self) -> Result<Snapshot>;
}

/// Snapshot source backed by a JSON file, re-read on every poll.
///
/// The file holds `{"agents": [...], "links": [...]}`. Decoding is lenient:
/// malformed records are dropped and counted, and the counts from the most
/// recent poll are available via [`last_stats`].
///
/// [`last_stats`]: JsonFileSource::last_stats
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    last_stats: SnapshotStats,
}

impl JsonFileSource {
    /// Creates a source reading from the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_stats: SnapshotStats::default(),
        }
    }

    /// Returns the path polled by this source.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drop counters from the most recent poll.
    #[must_use]
    pub const fn last_stats(&self) -> SnapshotStats {
        self.last_stats
    }
}

impl SnapshotSource for JsonFileSource {
    fn fetch(&mut self) -> Result<Snapshot> {
        let payload = std::fs::read_to_string(&self.path).map_err(|e| Error::OperationFailed {
            operation: "read_snapshot".to_string(),
            cause: format!("{}: {e}", self.path.display()),
        })?;
        let (snapshot, stats) = Snapshot::decode_lenient(&payload)?;
        if stats.dropped_agents > 0 || stats.dropped_links > 0 {
            tracing::warn!(
                dropped_agents = stats.dropped_agents,
                dropped_links = stats.dropped_links,
                path = %self.path.display(),
                "snapshot contained malformed records"
            );
        }
        self.last_stats = stats;
        Ok(snapshot)
    }
}

/// Snapshot source that returns a fixed snapshot on every poll.
///
/// Useful for tests and for driving the engine from an in-memory state.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    snapshot: Snapshot,
}

impl StaticSource {
    /// Creates a source that always yields the given snapshot.
    #[must_use]
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    /// Replaces the snapshot returned by future polls.
    pub fn set(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;
    }
}

impl SnapshotSource for StaticSource {
    fn fetch(&mut self) -> Result<Snapshot> {
        Ok(self.snapshot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AgentRecord;
    use std::io::Write;

    #[test]
    fn test_json_file_source_reads_and_counts() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{"agents": [{{"id": "a1"}}, {{"id": ""}}], "links": []}}"#
        )
        .expect("write");

        let mut source = JsonFileSource::new(file.path());
        let snapshot = source.fetch().expect("fetch succeeds");
        assert_eq!(snapshot.agents.len(), 1);
        assert_eq!(source.last_stats().dropped_agents, 1);
    }

    #[test]
    fn test_json_file_source_missing_file_is_error() {
        let mut source = JsonFileSource::new("/no/such/snapshot.json");
        let err = source.fetch().unwrap_err();
        assert!(err.to_string().contains("read_snapshot"));
    }

    #[test]
    fn test_static_source_yields_fixed_snapshot() {
        let snapshot = Snapshot::new(vec![AgentRecord::new("a")], vec![]);
        let mut source = StaticSource::new(snapshot.clone());
        assert_eq!(source.fetch().expect("fetch"), snapshot);
        assert_eq!(source.fetch().expect("fetch"), snapshot);
    }
}
