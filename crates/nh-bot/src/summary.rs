//! End-of-episode report

use serde::{Deserialize, Serialize};

use crate::error::PositionMismatch;
use crate::level::LevelKey;

/// What one episode achieved
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub seed: u64,
    /// Accumulated backend reward
    pub score: f64,
    /// Actions submitted
    pub steps: u64,
    /// Last game turn observed
    pub turns: i64,
    /// Levels the agent has map memory for
    pub levels_visited: Vec<LevelKey>,
    /// Deepest dungeon depth reached
    pub max_depth: i64,
    /// Recovered prediction failures
    pub panics: Vec<PositionMismatch>,
    /// Why the backend ended the episode
    pub end_reason: Option<String>,
}

impl EpisodeSummary {
    pub fn summary(&self) -> String {
        format!(
            "Episode (seed={}): score={:.0}, steps={}, turns={}, levels={}, depth={}, panics={}",
            self.seed,
            self.score,
            self.steps,
            self.turns,
            self.levels_visited.len(),
            self.max_depth,
            self.panics.len()
        )
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
