//! Observability: structured logging initialization.
//!
//! The engine itself only emits `tracing` events; wiring them to an output
//! happens once here, driven by `RUST_LOG` with a CLI verbosity override.

use std::sync::OnceLock;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable output for terminals.
    #[default]
    Pretty,
    /// Newline-delimited JSON for log shippers.
    Json,
}

impl LogFormat {
    /// Parses a format string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Options for logging initialization.
#[derive(Debug, Clone, Copy, Default)]
pub struct InitOptions {
    /// Whether verbose output was requested via CLI.
    pub verbose: bool,
    /// Output format.
    pub format: LogFormat,
}

static LOGGING_INIT: OnceLock<()> = OnceLock::new();

/// Initializes the global tracing subscriber once.
///
/// `RUST_LOG` takes precedence; without it, `--verbose` selects debug-level
/// output for this crate and warn for everything else. Repeat calls are
/// no-ops, so tests and library embedders can call this freely.
pub fn init(options: InitOptions) {
    LOGGING_INIT.get_or_init(|| {
        let default_directive = if options.verbose {
            "warn,topoview=debug"
        } else {
            "warn,topoview=info"
        };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive));

        match options.format {
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(tracing_subscriber::fmt::layer().with_target(false))
                    .init();
            }
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(tracing_subscriber::fmt::layer().json())
                    .init();
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("anything"), LogFormat::Pretty);
    }

    #[test]
    fn test_init_is_idempotent() {
        init(InitOptions::default());
        init(InitOptions {
            verbose: true,
            format: LogFormat::Json,
        });
    }
}
