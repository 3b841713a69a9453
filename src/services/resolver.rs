//! Edge resolution: from raw link records to the drawn edge set.
//!
//! Explicit links supply parents; every visible agent without one is
//! attached to the synthetic root by an implicit edge. The resolver
//! enforces the single-parent invariant, drops self-loops and edges into
//! the root, and resolves duplicate-parent inconsistencies
//! deterministically. Output order is canonical (source, then destination)
//! so equal inputs yield byte-equal output.

use crate::models::{root_id, AgentId, LinkRecord, RenderEdge, ROOT_ID};
use std::collections::{BTreeMap, BTreeSet};

/// Counters for anomalies encountered while resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolverStats {
    /// Links dropped: dangling endpoint, self-loop, or root destination.
    pub dropped_links: usize,
    /// Sources that held more than one active link.
    pub duplicate_parents: usize,
    /// Implicit root edges synthesized.
    pub implicit_edges: usize,
}

/// Resolves the authoritative edge set for one pass.
///
/// `visible_ids` is the set of agents that survived the visibility filter;
/// links touching anything outside it are dropped. Inactive links
/// (`ended_at` set) are skipped silently, as history is not an anomaly.
#[must_use]
pub fn resolve(
    visible_ids: &BTreeSet<AgentId>,
    links: &[LinkRecord],
) -> (Vec<RenderEdge>, ResolverStats) {
    let mut stats = ResolverStats::default();
    let root = root_id();

    // Group active, well-formed links by source.
    let mut by_source: BTreeMap<&AgentId, Vec<&LinkRecord>> = BTreeMap::new();
    for link in links {
        if !link.is_active() {
            continue;
        }
        if link.is_self_loop() {
            tracing::warn!(link = %link.id, agent = %link.source, "dropping self-loop link");
            stats.dropped_links += 1;
            continue;
        }
        if link.destination.as_str() == ROOT_ID {
            tracing::warn!(link = %link.id, "dropping link with root destination");
            stats.dropped_links += 1;
            continue;
        }
        if !visible_ids.contains(&link.source) || !visible_ids.contains(&link.destination) {
            stats.dropped_links += 1;
            continue;
        }
        by_source.entry(&link.source).or_default().push(link);
    }

    let mut edges = Vec::new();
    for (source, mut candidates) in by_source {
        if candidates.len() > 1 {
            // An agent with several active parents is a backing-store
            // inconsistency; keep the lowest destination id.
            stats.duplicate_parents += 1;
            tracing::warn!(
                agent = %source,
                candidates = candidates.len(),
                "agent has multiple active links; keeping lowest destination"
            );
            candidates.sort_by(|a, b| a.destination.cmp(&b.destination));
        }
        let kept = candidates[0];
        edges.push(RenderEdge {
            source: source.clone(),
            destination: kept.destination.clone(),
            label: kept.label.clone(),
            implicit: false,
        });
    }

    // Every unparented agent attaches to the root. Explicit links run
    // child-to-parent (the source is the agent owning the parent edge);
    // implicit edges run root-to-agent, so the root is never a destination.
    let has_parent: BTreeSet<AgentId> = edges.iter().map(|e| e.source.clone()).collect();
    for id in visible_ids {
        if id.as_str() == ROOT_ID || has_parent.contains(id) {
            continue;
        }
        stats.implicit_edges += 1;
        edges.push(RenderEdge {
            source: root.clone(),
            destination: id.clone(),
            label: None,
            implicit: true,
        });
    }

    edges.sort_by(|a, b| (&a.source, &a.destination).cmp(&(&b.source, &b.destination)));
    (edges, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinkId;

    fn ids(names: &[&str]) -> BTreeSet<AgentId> {
        names.iter().map(|n| AgentId::new(*n)).collect()
    }

    fn link(id: &str, source: &str, destination: &str) -> LinkRecord {
        LinkRecord::new(source, destination).with_id(LinkId::new(id))
    }

    #[test]
    fn test_unlinked_agents_get_implicit_root_edges() {
        let (edges, stats) = resolve(&ids(&["a", "b"]), &[]);
        assert_eq!(edges.len(), 2);
        assert!(edges.iter().all(|e| e.implicit && e.source == root_id()));
        assert_eq!(stats.implicit_edges, 2);
    }

    #[test]
    fn test_explicit_link_replaces_implicit_edge() {
        // b's parent is a; a itself stays attached to the root.
        let (edges, _) = resolve(&ids(&["a", "b"]), &[link("l1", "b", "a")]);
        assert_eq!(edges.len(), 2);

        let b_edge = edges.iter().find(|e| e.source.as_str() == "b").unwrap();
        assert_eq!(b_edge.destination.as_str(), "a");
        assert!(!b_edge.implicit);

        let a_edge = edges
            .iter()
            .find(|e| e.implicit && e.destination.as_str() == "a")
            .unwrap();
        assert_eq!(a_edge.source, root_id());
        assert!(!edges.iter().any(|e| e.implicit && e.destination.as_str() == "b"));
    }

    #[test]
    fn test_ended_links_are_skipped() {
        let mut ended = link("l1", "b", "a");
        ended.close_at(chrono::Utc::now());
        let (edges, stats) = resolve(&ids(&["a", "b"]), &[ended]);
        assert!(edges.iter().all(|e| e.implicit));
        assert_eq!(stats.dropped_links, 0);
    }

    #[test]
    fn test_dangling_links_dropped_and_counted() {
        let (edges, stats) = resolve(&ids(&["a"]), &[link("l1", "a", "gone")]);
        assert_eq!(stats.dropped_links, 1);
        assert_eq!(edges.len(), 1);
        assert!(edges[0].implicit);
        assert_eq!(edges[0].source, root_id());
        assert_eq!(edges[0].destination.as_str(), "a");
    }

    #[test]
    fn test_duplicate_parent_keeps_lowest_destination() {
        let links = vec![link("l1", "c", "b"), link("l2", "c", "a")];
        let (edges, stats) = resolve(&ids(&["a", "b", "c"]), &links);
        assert_eq!(stats.duplicate_parents, 1);

        let c_edge = edges.iter().find(|e| e.source.as_str() == "c").unwrap();
        assert_eq!(c_edge.destination.as_str(), "a");
        let outgoing = edges.iter().filter(|e| e.source.as_str() == "c").count();
        assert_eq!(outgoing, 1);
    }

    #[test]
    fn test_self_loops_and_root_destinations_rejected() {
        let links = vec![link("l1", "a", "a"), link("l2", "b", ROOT_ID)];
        let (edges, stats) = resolve(&ids(&["a", "b"]), &links);
        assert_eq!(stats.dropped_links, 2);
        // Both agents fall back to implicit root edges.
        assert_eq!(edges.len(), 2);
        assert!(edges.iter().all(|e| e.implicit));
    }

    #[test]
    fn test_output_order_is_canonical() {
        let links = vec![link("l1", "b", "a")];
        let (first, _) = resolve(&ids(&["a", "b", "c"]), &links);
        let reversed = vec![link("l1", "b", "a")];
        let (second, _) = resolve(&ids(&["c", "b", "a"]), &reversed);
        assert_eq!(first, second);
    }
}
