//! Boundary to the game backend
//!
//! The agent drives any `Environment`: a learning-environment binding, the
//! `nh-sim` reference dungeon, or a scripted test double.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::action::Action;
use crate::level::LevelKey;
use crate::observation::Observation;

/// Failures reported by a backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvError {
    #[error("backend failure: {0}")]
    Backend(String),

    #[error("bottom line has {got} fields, expected {expected}")]
    BadBottomLine { got: usize, expected: usize },

    #[error("observation grid is {rows}x{cols}")]
    BadShape { rows: usize, cols: usize },

    #[error("step after the episode ended")]
    EpisodeOver,
}

/// Auxiliary information returned with each step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInfo {
    /// Why the episode ended, when it did
    pub end_reason: Option<String>,
    /// Set when a wrapper cut the episode short
    pub truncated: bool,
}

/// What the backend returns for one action
#[derive(Debug, Clone)]
pub struct Transition {
    pub observation: Observation,
    pub reward: f64,
    pub done: bool,
    pub info: StepInfo,
}

/// A single-player game the agent can act in
pub trait Environment {
    /// Start a new episode
    fn reset(&mut self) -> Result<Observation, EnvError>;

    /// Submit exactly one action
    fn step(&mut self, action: Action) -> Result<Transition, EnvError>;
}

impl<E: Environment + ?Sized> Environment for &mut E {
    fn reset(&mut self) -> Result<Observation, EnvError> {
        (**self).reset()
    }

    fn step(&mut self, action: Action) -> Result<Transition, EnvError> {
        (**self).step(action)
    }
}

impl<E: Environment + ?Sized> Environment for Box<E> {
    fn reset(&mut self) -> Result<Observation, EnvError> {
        (**self).reset()
    }

    fn step(&mut self, action: Action) -> Result<Transition, EnvError> {
        (**self).step(action)
    }
}

/// Ends episodes after a fixed number of steps and records what was reached
#[derive(Debug)]
pub struct StepLimit<E> {
    inner: E,
    limit: u64,
    steps: u64,
    last_turn: i64,
    levels: BTreeSet<LevelKey>,
}

impl<E: Environment> StepLimit<E> {
    pub fn new(inner: E, limit: u64) -> Self {
        Self {
            inner,
            limit,
            steps: 0,
            last_turn: 0,
            levels: BTreeSet::new(),
        }
    }

    /// Steps taken in the current episode
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Highest game turn seen in the current episode
    pub fn last_turn(&self) -> i64 {
        self.last_turn
    }

    /// Levels entered during the current episode
    pub fn levels(&self) -> &BTreeSet<LevelKey> {
        &self.levels
    }

    fn record(&mut self, obs: &Observation) {
        self.levels.insert(obs.level_key());
        self.last_turn = self.last_turn.max(obs.stats.time);
    }
}

impl<E: Environment> Environment for StepLimit<E> {
    fn reset(&mut self) -> Result<Observation, EnvError> {
        self.steps = 0;
        self.last_turn = 0;
        self.levels.clear();
        let obs = self.inner.reset()?;
        self.record(&obs);
        Ok(obs)
    }

    fn step(&mut self, action: Action) -> Result<Transition, EnvError> {
        if self.steps >= self.limit {
            return Err(EnvError::EpisodeOver);
        }
        let mut transition = self.inner.step(action)?;
        self.steps += 1;
        self.record(&transition.observation);
        if self.steps == self.limit && !transition.done {
            transition.done = true;
            transition.info.truncated = true;
        }
        Ok(transition)
    }
}
