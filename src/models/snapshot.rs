//! Snapshots: one poll's full agent list and link list.
//!
//! Snapshot decoding is lenient: topology views are best-effort, so a
//! malformed record (missing id, unparsable timestamp) is dropped and
//! counted rather than failing the poll. Only an unreadable top-level
//! payload is an error.

use super::{AgentRecord, LinkRecord};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One poll's worth of topology state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Full agent list, no ordering guarantees.
    #[serde(default)]
    pub agents: Vec<AgentRecord>,
    /// Full link list, no ordering guarantees.
    #[serde(default)]
    pub links: Vec<LinkRecord>,
}

/// Counters for records dropped during lenient decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SnapshotStats {
    /// Agent records that failed validation and were dropped.
    pub dropped_agents: usize,
    /// Link records that failed validation and were dropped.
    pub dropped_links: usize,
}

impl Snapshot {
    /// Creates a snapshot from agent and link lists.
    #[must_use]
    pub fn new(agents: Vec<AgentRecord>, links: Vec<LinkRecord>) -> Self {
        Self { agents, links }
    }

    /// Decodes a snapshot from a JSON string, dropping malformed records.
    ///
    /// Each record is decoded independently; a record that fails to decode
    /// (missing id, unparsable timestamp) or carries an empty id is dropped
    /// with a warn log and counted in the returned [`SnapshotStats`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] only when the payload itself is
    /// not valid JSON or is not an object.
    pub fn decode_lenient(payload: &str) -> Result<(Self, SnapshotStats)> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| Error::OperationFailed {
                operation: "decode_snapshot".to_string(),
                cause: e.to_string(),
            })?;
        Self::from_value_lenient(&value)
    }

    /// Decodes a snapshot from a parsed JSON value, dropping malformed
    /// records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] when the value is not an object.
    pub fn from_value_lenient(value: &Value) -> Result<(Self, SnapshotStats)> {
        let obj = value.as_object().ok_or_else(|| Error::OperationFailed {
            operation: "decode_snapshot".to_string(),
            cause: "payload is not a JSON object".to_string(),
        })?;

        let mut stats = SnapshotStats::default();
        let mut agents = Vec::new();
        let mut links = Vec::new();

        for (idx, raw) in iter_array(obj.get("agents")).enumerate() {
            match serde_json::from_value::<AgentRecord>(raw.clone()) {
                Ok(record) if !record.id.as_str().is_empty() => agents.push(record),
                Ok(_) => {
                    tracing::warn!(index = idx, "dropping agent record with empty id");
                    stats.dropped_agents += 1;
                }
                Err(e) => {
                    tracing::warn!(index = idx, error = %e, "dropping malformed agent record");
                    stats.dropped_agents += 1;
                }
            }
        }

        for (idx, raw) in iter_array(obj.get("links")).enumerate() {
            match serde_json::from_value::<LinkRecord>(raw.clone()) {
                Ok(record)
                    if !record.source.as_str().is_empty()
                        && !record.destination.as_str().is_empty() =>
                {
                    links.push(record);
                }
                Ok(_) => {
                    tracing::warn!(index = idx, "dropping link record with empty endpoint");
                    stats.dropped_links += 1;
                }
                Err(e) => {
                    tracing::warn!(index = idx, error = %e, "dropping malformed link record");
                    stats.dropped_links += 1;
                }
            }
        }

        Ok((Self { agents, links }, stats))
    }
}

fn iter_array(value: Option<&Value>) -> impl Iterator<Item = &Value> {
    value
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_well_formed() {
        let payload = r#"{
            "agents": [
                {"id": "a1", "last_heartbeat": "2026-08-06T10:00:00Z"},
                {"id": "a2", "visible": false}
            ],
            "links": [
                {"id": "l1", "source": "a2", "destination": "a1"}
            ]
        }"#;
        let (snapshot, stats) = Snapshot::decode_lenient(payload).expect("decodes");
        assert_eq!(snapshot.agents.len(), 2);
        assert_eq!(snapshot.links.len(), 1);
        assert_eq!(stats, SnapshotStats::default());
    }

    #[test]
    fn test_malformed_records_dropped_not_fatal() {
        let payload = r#"{
            "agents": [
                {"id": "a1"},
                {"id": ""},
                {"id": "a3", "last_heartbeat": "not-a-timestamp"},
                {"no_id": true}
            ],
            "links": [
                {"id": "l1", "source": "a1", "destination": "a3"},
                {"id": "l2", "source": "", "destination": "a1"},
                {"id": "l3"}
            ]
        }"#;
        let (snapshot, stats) = Snapshot::decode_lenient(payload).expect("decodes");
        assert_eq!(snapshot.agents.len(), 1);
        assert_eq!(snapshot.agents[0].id.as_str(), "a1");
        assert_eq!(snapshot.links.len(), 1);
        assert_eq!(stats.dropped_agents, 3);
        assert_eq!(stats.dropped_links, 2);
    }

    #[test]
    fn test_missing_sections_default_empty() {
        let (snapshot, stats) = Snapshot::decode_lenient("{}").expect("decodes");
        assert!(snapshot.agents.is_empty());
        assert!(snapshot.links.is_empty());
        assert_eq!(stats, SnapshotStats::default());
    }

    #[test]
    fn test_non_object_payload_is_error() {
        let err = Snapshot::decode_lenient("[1, 2]").unwrap_err();
        assert!(err.to_string().contains("decode_snapshot"));
    }
}
