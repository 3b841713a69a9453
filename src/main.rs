//! Binary entry point for topoview.
//!
//! Renders reconciled topology graphs from polled snapshot files.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use topoview::cli::{cmd_render, cmd_watch, OutputFormat, RenderArgs, WatchArgs};
use topoview::config::load_config;
use topoview::observability::{self, InitOptions, LogFormat};

/// Topoview - live topology reconciliation for operator consoles.
#[derive(Parser)]
#[command(name = "topoview")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log output format: pretty or json.
    #[arg(long, global = true, default_value = "pretty")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Reconcile one snapshot file and print the graph.
    Render {
        /// Path to the snapshot JSON file.
        snapshot: PathBuf,

        /// Include soft-hidden agents.
        #[arg(long)]
        show_hidden: bool,

        /// Output format: table or json.
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Poll a snapshot file on an interval, reconciling each pass.
    Watch {
        /// Path to the snapshot JSON file.
        snapshot: PathBuf,

        /// Poll interval in seconds.
        #[arg(short, long, default_value_t = 5)]
        interval: u64,

        /// Include soft-hidden agents.
        #[arg(long)]
        show_hidden: bool,

        /// Output format: table or json.
        #[arg(short, long, default_value = "table")]
        format: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    observability::init(InitOptions {
        verbose: cli.verbose,
        format: LogFormat::parse(&cli.log_format),
    });

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Render {
            snapshot,
            show_hidden,
            format,
        } => {
            let args = RenderArgs {
                snapshot,
                show_hidden,
                format: OutputFormat::parse(&format),
            };
            cmd_render(config, &args)?;
        }
        Commands::Watch {
            snapshot,
            interval,
            show_hidden,
            format,
        } => {
            let args = WatchArgs {
                snapshot,
                interval_secs: interval,
                show_hidden,
                format: OutputFormat::parse(&format),
            };
            cmd_watch(config, &args)?;
        }
    }

    Ok(())
}
