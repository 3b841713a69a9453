//! Configuration management.
//!
//! Runtime configuration is an [`EngineConfig`] with sensible defaults; an
//! optional TOML file overlays individual values. The file lives at
//! `~/.config/topoview/config.toml` unless a path is given explicitly.

use crate::models::Position;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration for the reconciliation engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Heartbeat age beyond which an agent classifies as dead.
    pub dead_after: Duration,
    /// Window after first sight during which a dead classification is not
    /// reported, so entrance presentation can run.
    pub entrance_grace: Duration,
    /// Layout geometry.
    pub layout: LayoutConfig,
    /// What should happen to manually dragged positions across sessions.
    pub position_policy: PositionPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dead_after: Duration::from_secs(300),
            entrance_grace: Duration::from_secs(3),
            layout: LayoutConfig::default(),
            position_policy: PositionPolicy::default(),
        }
    }
}

/// Layout geometry for the banded tree layout.
#[derive(Debug, Clone, Copy)]
pub struct LayoutConfig {
    /// Fixed anchor coordinate of the synthetic root.
    pub anchor: Position,
    /// Vertical gap between depth bands.
    pub level_gap: f32,
    /// Horizontal gap between adjacent nodes in a band.
    pub node_gap: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            anchor: Position::new(0.0, 0.0),
            level_gap: 140.0,
            node_gap: 120.0,
        }
    }
}

/// Policy for manually dragged positions across sessions.
///
/// The engine itself never persists positions; `Persistent` signals the
/// embedder that the injected [`crate::PositionStore`] should be saved and
/// restored around restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionPolicy {
    /// Positions live only for the engine instance; a reload forgets them.
    #[default]
    SessionOnly,
    /// The embedder snapshots and restores the position store.
    Persistent,
}

impl PositionPolicy {
    /// Parses a policy string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "persistent" | "persist" => Self::Persistent,
            _ => Self::SessionOnly,
        }
    }
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Engine section.
    pub engine: Option<ConfigFileEngine>,
    /// Layout section.
    pub layout: Option<ConfigFileLayout>,
}

/// Engine section in the config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileEngine {
    /// Seconds of heartbeat silence before an agent is dead.
    pub dead_after_secs: Option<u64>,
    /// Seconds of entrance grace for newly seen nodes.
    pub entrance_grace_secs: Option<u64>,
    /// Position policy: "session-only" or "persistent".
    pub position_policy: Option<String>,
}

/// Layout section in the config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLayout {
    /// Root anchor x.
    pub anchor_x: Option<f32>,
    /// Root anchor y.
    pub anchor_y: Option<f32>,
    /// Vertical gap between depth bands.
    pub level_gap: Option<f32>,
    /// Horizontal gap between adjacent nodes.
    pub node_gap: Option<f32>,
}

impl ConfigFile {
    /// Applies this file's values over a base configuration.
    #[must_use]
    pub fn apply(self, mut config: EngineConfig) -> EngineConfig {
        if let Some(engine) = self.engine {
            if let Some(secs) = engine.dead_after_secs {
                config.dead_after = Duration::from_secs(secs);
            }
            if let Some(secs) = engine.entrance_grace_secs {
                config.entrance_grace = Duration::from_secs(secs);
            }
            if let Some(policy) = engine.position_policy {
                config.position_policy = PositionPolicy::parse(&policy);
            }
        }
        if let Some(layout) = self.layout {
            if let Some(x) = layout.anchor_x {
                config.layout.anchor.x = x;
            }
            if let Some(y) = layout.anchor_y {
                config.layout.anchor.y = y;
            }
            if let Some(gap) = layout.level_gap {
                config.layout.level_gap = gap;
            }
            if let Some(gap) = layout.node_gap {
                config.layout.node_gap = gap;
            }
        }
        config
    }
}

/// Returns the default config file path, if a home directory is known.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "topoview")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Loads configuration, overlaying an optional TOML file on the defaults.
///
/// With an explicit `path`, the file must exist and parse. Without one, the
/// default location is consulted and silently skipped when absent.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] when the file cannot be read or
/// parsed.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let defaults = EngineConfig::default();

    let resolved = match path {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => return Ok(defaults),
        },
    };

    let raw = std::fs::read_to_string(&resolved).map_err(|e| Error::OperationFailed {
        operation: "read_config".to_string(),
        cause: format!("{}: {e}", resolved.display()),
    })?;
    let file: ConfigFile = toml::from_str(&raw).map_err(|e| Error::OperationFailed {
        operation: "parse_config".to_string(),
        cause: e.to_string(),
    })?;

    Ok(file.apply(defaults))
}
