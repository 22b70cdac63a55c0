//! nh-sim: a small deterministic dungeon for exercising the agent
//!
//! Levels are drawn in ASCII (see [`map`]); the rules cover what the agent
//! has to cope with: lit rooms and dark corridors, doors that stick or are
//! locked, kicking, bear traps, hidden doors and passages, monsters that
//! chase and bite, and stairs. The same seed always plays the same game.

pub mod levels;
pub mod map;
pub mod world;

pub use map::{LevelMap, MapError, Terrain};
pub use world::World;

use nh_bot::{Action, EnvError, Environment, Observation, StepInfo, Transition};

/// `Environment` over a list of level templates
#[derive(Debug, Clone)]
pub struct Simulator {
    templates: Vec<LevelMap>,
    seed: u64,
    episodes: u64,
    world: Option<World>,
}

impl Simulator {
    pub fn new(templates: Vec<LevelMap>, seed: u64) -> Result<Self, MapError> {
        if templates.is_empty() {
            return Err(MapError::NoLevels);
        }
        Ok(Self {
            templates,
            seed,
            episodes: 0,
            world: None,
        })
    }

    /// The built-in three-level dungeon
    pub fn builtin(seed: u64) -> Result<Self, MapError> {
        Self::new(levels::builtin()?, seed)
    }

    /// Levels from a map file, separated by `===` lines
    pub fn from_text(text: &str, seed: u64) -> Result<Self, MapError> {
        Self::new(LevelMap::parse_levels(text)?, seed)
    }

    /// State of the running episode
    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }
}

impl Environment for Simulator {
    fn reset(&mut self) -> Result<Observation, EnvError> {
        let seed = self.seed.wrapping_add(self.episodes);
        self.episodes += 1;
        tracing::debug!(seed, levels = self.templates.len(), "new episode");

        let world = World::new(self.templates.clone(), seed);
        let obs = world.observe();
        self.world = Some(world);
        Ok(obs)
    }

    fn step(&mut self, action: Action) -> Result<Transition, EnvError> {
        let world = self
            .world
            .as_mut()
            .ok_or_else(|| EnvError::Backend("step before reset".to_string()))?;
        if world.is_over() {
            return Err(EnvError::EpisodeOver);
        }

        tracing::trace!(%action, "sim step");
        let before = world.score;
        world.act(action);
        let done = world.is_over();
        if done {
            tracing::debug!(reason = ?world.end_reason(), turn = world.time, "episode over");
        }

        Ok(Transition {
            observation: world.observe(),
            reward: (world.score - before) as f64,
            done,
            info: StepInfo {
                end_reason: world.end_reason().map(str::to_string),
                truncated: false,
            },
        })
    }
}
