//! Agent configuration

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Knobs for one agent instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Seed of the tie-breaking RNG
    pub seed: u64,
    /// Shuffle neighbour enumeration (path reconstruction, door checks)
    pub shuffle_neighbors: bool,
    /// Cross-check every screen's glyphs against its characters
    pub validate_screen: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            shuffle_neighbors: true,
            validate_screen: false,
        }
    }
}

impl AgentConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `NH_BOT_SEED` - RNG seed (default: 0)
    /// - `NH_BOT_SHUFFLE` - Shuffle neighbour order (default: true)
    /// - `NH_BOT_VALIDATE` - Validate screens (default: false)
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(seed) = read_env::<u64>("NH_BOT_SEED") {
            config.seed = seed;
        }
        if let Some(shuffle) = read_env::<bool>("NH_BOT_SHUFFLE") {
            config.shuffle_neighbors = shuffle;
        }
        if let Some(validate) = read_env::<bool>("NH_BOT_VALIDATE") {
            config.validate_screen = validate;
        }
        config
    }
}

fn read_env<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.trim().parse().ok())
}
