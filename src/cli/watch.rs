//! Poll-loop watch command.

use super::render::{print_graph, OutputFormat};
use crate::config::EngineConfig;
use crate::services::{Reconciler, ViewOptions};
use crate::source::{JsonFileSource, SnapshotSource};
use crate::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Arguments for the watch command.
#[derive(Debug, Clone)]
pub struct WatchArgs {
    /// Path to the snapshot JSON file, re-read every interval.
    pub snapshot: PathBuf,
    /// Poll interval in seconds.
    pub interval_secs: u64,
    /// Include soft-hidden agents.
    pub show_hidden: bool,
    /// Output format.
    pub format: OutputFormat,
}

/// Polls the snapshot file on a fixed interval, reconciling each pass and
/// printing the graph, until interrupted with ctrl-c.
///
/// A failed poll keeps the last successfully reconciled graph: the engine
/// state is untouched and the failure is reported, matching the
/// could-not-refresh behavior of the dashboard this drives.
///
/// # Errors
///
/// Returns an error only when the async runtime cannot be built; poll
/// failures are reported and retried on the next tick.
pub fn cmd_watch(config: EngineConfig, args: &WatchArgs) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().map_err(|e| Error::OperationFailed {
        operation: "build_runtime".to_string(),
        cause: e.to_string(),
    })?;

    let mut source = JsonFileSource::new(&args.snapshot);
    let mut engine = Reconciler::new(config);
    let view = ViewOptions {
        show_hidden: args.show_hidden,
    };
    let interval = Duration::from_secs(args.interval_secs.max(1));

    runtime.block_on(async {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    poll_once(&mut source, &mut engine, &view, args.format);
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("interrupted; stopping watch");
                    break;
                }
            }
        }
    });

    Ok(())
}

fn poll_once(
    source: &mut JsonFileSource,
    engine: &mut Reconciler,
    view: &ViewOptions,
    format: OutputFormat,
) {
    match source.fetch() {
        Ok(snapshot) => {
            let graph = engine.reconcile(&snapshot, chrono::Utc::now(), view);
            if let Err(e) = print_graph(&graph, format) {
                tracing::warn!(error = %e, "failed to print graph");
            }
        }
        Err(e) => {
            // Retain the last reconciled state; the next tick retries.
            tracing::warn!(error = %e, "poll failed; keeping previous graph");
            eprintln!("could not refresh: {e}");
        }
    }
}
