//! Versioned TOML configuration for the command-line adapter.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use antlife_core::Direction;
use serde::Deserialize;

/// Only configuration layout understood by this binary.
pub(crate) const SUPPORTED_CONFIG_VERSION: u32 = 1;

/// Contents of a configuration file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ConfigFile {
    /// Layout version of the file.
    pub(crate) version: u32,
    /// Grid, agent and trail settings.
    #[serde(default)]
    pub(crate) automaton: AutomatonTable,
    /// Initial pattern settings.
    #[serde(default)]
    pub(crate) seed: SeedConfig,
}

/// Optional `[automaton]` table; unset keys fall back after flags are merged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct AutomatonTable {
    /// Number of grid columns.
    pub(crate) width: Option<i64>,
    /// Number of grid rows.
    pub(crate) height: Option<i64>,
    /// Starting row of the agent.
    pub(crate) agent_row: Option<i64>,
    /// Starting column of the agent.
    pub(crate) agent_column: Option<i64>,
    /// Starting heading of the agent.
    pub(crate) agent_direction: Option<Direction>,
    /// Whether the agent flips the cells it departs from.
    pub(crate) trail_deposit: Option<bool>,
}

/// Optional `[seed]` table.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SeedConfig {
    /// Name of the seed pattern.
    pub(crate) pattern: Option<String>,
    /// Row the pattern is anchored at.
    pub(crate) row: Option<u32>,
    /// Column the pattern is anchored at.
    pub(crate) column: Option<u32>,
    /// Fill ratio of the random pattern.
    pub(crate) density: Option<f64>,
    /// Generator seed of the random pattern.
    pub(crate) seed: Option<u64>,
}

/// Reads and validates the configuration stored at `path`.
pub(crate) fn load(path: &Path) -> Result<ConfigFile> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid config at {}", path.display()))
}

/// Parses configuration contents, rejecting unknown layout versions.
pub(crate) fn parse(contents: &str) -> Result<ConfigFile> {
    let config: ConfigFile =
        toml::from_str(contents).context("failed to parse config toml contents")?;
    if config.version != SUPPORTED_CONFIG_VERSION {
        bail!(
            "unsupported config version {}; expected {}",
            config.version,
            SUPPORTED_CONFIG_VERSION
        );
    }
    Ok(config)
}
