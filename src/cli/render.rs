//! One-shot render command.

use crate::config::EngineConfig;
use crate::models::{RenderGraph, ROOT_ID};
use crate::services::{Reconciler, ViewOptions};
use crate::source::{JsonFileSource, SnapshotSource};
use crate::{Error, Result};
use std::path::PathBuf;

/// Output format for rendered graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Aligned text table.
    #[default]
    Table,
    /// JSON document.
    Json,
}

impl OutputFormat {
    /// Parses a format string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Table,
        }
    }
}

/// Arguments for the render command.
#[derive(Debug, Clone)]
pub struct RenderArgs {
    /// Path to the snapshot JSON file.
    pub snapshot: PathBuf,
    /// Include soft-hidden agents.
    pub show_hidden: bool,
    /// Output format.
    pub format: OutputFormat,
}

/// Reconciles a single snapshot file and prints the resulting graph.
///
/// # Errors
///
/// Returns an error when the snapshot cannot be read or serialization of
/// the output fails.
pub fn cmd_render(config: EngineConfig, args: &RenderArgs) -> Result<()> {
    let mut source = JsonFileSource::new(&args.snapshot);
    let snapshot = source.fetch()?;

    let mut engine = Reconciler::new(config);
    let view = ViewOptions {
        show_hidden: args.show_hidden,
    };
    let graph = engine.reconcile(&snapshot, chrono::Utc::now(), &view);

    print_graph(&graph, args.format)
}

/// Prints a graph in the requested format.
pub(crate) fn print_graph(graph: &RenderGraph, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(graph).map_err(|e| Error::OperationFailed {
                    operation: "encode_graph".to_string(),
                    cause: e.to_string(),
                })?;
            println!("{json}");
        }
        OutputFormat::Table => print_table(graph),
    }
    Ok(())
}

fn print_table(graph: &RenderGraph) {
    println!(
        "{:<20} {:<20} {:<6} {:<4} {:<10} {:>8} {:>8}",
        "ID", "PARENT", "LIVE", "NEW", "FLAGS", "X", "Y"
    );
    for node in &graph.nodes {
        let parent = graph
            .parent_edge(&node.id)
            .map_or_else(|| ROOT_ID.to_string(), |e| e.parent().to_string());
        let mut flags = String::new();
        if node.locked {
            flags.push('L');
        }
        if !node.visible {
            flags.push('H');
        }
        if !node.has_checked_in {
            flags.push('?');
        }
        println!(
            "{:<20} {:<20} {:<6} {:<4} {:<10} {:>8.1} {:>8.1}",
            node.display_name,
            parent,
            node.liveness.as_str(),
            if node.newly_seen { "yes" } else { "" },
            flags,
            node.position.x,
            node.position.y
        );
    }
    let s = &graph.stats;
    println!(
        "{} nodes, {} edges ({} implicit); {} hidden, {} links dropped, {} duplicate parents",
        graph.nodes.len(),
        graph.edges.len(),
        s.implicit_edges,
        s.hidden_agents,
        s.dropped_links,
        s.duplicate_parents
    );
}
