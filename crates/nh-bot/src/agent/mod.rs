//! The playing agent
//!
//! An `Agent` owns one backend, its map memory and its RNG. Each call to
//! [`Agent::tick`] re-evaluates the strategies from scratch and plays until
//! one of them has acted or the turn was interrupted:
//!
//! - a move that did not land where predicted is logged and recovered,
//! - a hostile creature on screen interrupts whatever was in progress,
//! - the backend ending the episode finishes the run.

mod primitives;
mod strategy;

pub use primitives::Heading;
pub use strategy::{best_cell, frontier, search_priorities, Strategy};

use crate::action::Action;
use crate::config::AgentConfig;
use crate::consts::AGENT_CHAR;
use crate::env::{Environment, Transition};
use crate::error::{BotError, Flow, Interrupt, PositionMismatch};
use crate::glyph::{classify, GlyphClass, GlyphTable};
use crate::level::{Level, MapRegistry};
use crate::observation::Observation;
use crate::pathfind::{find_path, neighbors_with, DistanceField};
use crate::position::Position;
use crate::rng::BotRng;
use crate::summary::EpisodeSummary;

/// Why a turn ended early
#[derive(Debug, Clone, PartialEq)]
pub enum Recovery {
    /// A move landed somewhere unexpected
    PositionMismatch(PositionMismatch),
    /// A hostile creature came into view
    NewThreat,
}

/// Outcome of one control-loop iteration
#[derive(Debug, Clone, PartialEq)]
pub enum TurnStatus {
    /// The strategy ran to completion
    Continue(Strategy),
    /// The turn was interrupted and the agent will re-plan
    Recovered(Recovery),
    /// The episode is over
    Done,
}

/// Heuristic player bound to one backend
#[derive(Debug)]
pub struct Agent<E> {
    env: E,
    config: AgentConfig,
    rng: BotRng,
    levels: MapRegistry,
    obs: Observation,
    score: f64,
    steps: u64,
    max_depth: i64,
    panics: Vec<PositionMismatch>,
    end_reason: Option<String>,
    finished: bool,
}

impl<E: Environment> Agent<E> {
    /// Reset the backend and take in the first observation
    pub fn new(mut env: E, config: AgentConfig) -> Result<Self, BotError> {
        let obs = env.reset()?;
        let mut agent = Self {
            env,
            rng: BotRng::new(config.seed),
            config,
            levels: MapRegistry::new(),
            obs,
            score: 0.0,
            steps: 0,
            max_depth: 0,
            panics: Vec::new(),
            end_reason: None,
            finished: false,
        };

        match agent.absorb(true) {
            Err(Interrupt::Fatal(err)) => Err(err),
            _ => Ok(agent),
        }
    }

    /// Play one control-loop iteration
    pub fn tick(&mut self) -> Result<TurnStatus, BotError> {
        if self.finished {
            return Ok(TurnStatus::Done);
        }

        match self.select_strategy() {
            Ok(strategy) => Ok(TurnStatus::Continue(strategy)),
            Err(Interrupt::Panic(mismatch)) => {
                tracing::warn!(turn = mismatch.turn, "PANIC: {mismatch}");
                self.panics.push(mismatch.clone());
                Ok(TurnStatus::Recovered(Recovery::PositionMismatch(mismatch)))
            }
            Err(Interrupt::NewThreat) => Ok(TurnStatus::Recovered(Recovery::NewThreat)),
            Err(Interrupt::Finished) => Ok(TurnStatus::Done),
            Err(Interrupt::Fatal(err)) => {
                tracing::error!(pos = %self.agent(), "agent halted: {err}");
                Err(err)
            }
        }
    }

    /// Play until the backend ends the episode
    pub fn run(&mut self) -> Result<EpisodeSummary, BotError> {
        while self.tick()? != TurnStatus::Done {}
        let summary = self.summary();
        tracing::info!("{}", summary.summary());
        Ok(summary)
    }

    pub fn summary(&self) -> EpisodeSummary {
        EpisodeSummary {
            seed: self.config.seed,
            score: self.score,
            steps: self.steps,
            turns: self.obs.stats.time,
            levels_visited: self.levels.keys(),
            max_depth: self.max_depth,
            panics: self.panics.clone(),
            end_reason: self.end_reason.clone(),
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Agent position on the latest observation
    pub fn agent(&self) -> Position {
        self.obs.agent()
    }

    /// Map memory of the current level
    pub fn level(&self) -> Option<&Level> {
        self.levels.get(self.obs.level_key())
    }

    pub fn levels(&self) -> &MapRegistry {
        &self.levels
    }

    /// Recovered prediction failures so far
    pub fn panics(&self) -> &[PositionMismatch] {
        &self.panics
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    /// Check whether a hostile creature is shown anywhere but on the agent
    pub fn hostile_visible(&self) -> bool {
        self.hostiles().next().is_some()
    }

    fn hostiles(&self) -> impl Iterator<Item = Position> + '_ {
        let agent = self.agent();
        Position::all().filter(move |&pos| {
            pos != agent && classify(self.obs.glyph(pos)).contains(GlyphClass::MONSTER)
        })
    }

    /// Check what the latest observation shows at `pos`
    fn shows(&self, pos: Position, class: GlyphClass) -> bool {
        classify(self.obs.glyph(pos)).intersects(class)
    }

    fn level_mut(&mut self) -> &mut Level {
        self.levels.get_or_create(self.obs.level_key())
    }

    /// Submit one action and take in the reply
    fn step(&mut self, action: Action) -> Flow<()> {
        tracing::trace!(%action, "submit");
        let Transition {
            observation,
            reward,
            done,
            info,
        } = self.env.step(action)?;

        self.steps += 1;
        self.score += reward;
        self.obs = observation;

        if done {
            self.finished = true;
            self.end_reason = info
                .end_reason
                .or_else(|| info.truncated.then(|| "step limit".to_string()));
            return Err(Interrupt::Finished);
        }

        self.absorb(false)
    }

    /// Update map memory from the latest observation.
    ///
    /// Prompts are answered instead; the answer's reply is absorbed in turn.
    fn absorb(&mut self, first: bool) -> Flow<()> {
        self.obs.validate_shape()?;
        if self.config.validate_screen {
            GlyphTable::get().check_screen(&self.obs)?;
            let pos = self.agent();
            if first && pos.in_bounds() && self.obs.char_at(pos) != AGENT_CHAR {
                return Err(BotError::AgentNotShown {
                    pos,
                    ch: self.obs.char_at(pos) as char,
                }
                .into());
            }
        }
        self.max_depth = self.max_depth.max(self.obs.stats.depth);

        if let Some(prompt) = self.obs.prompt() {
            tracing::debug!(?prompt, "answering prompt");
            return self.step(prompt.answer());
        }

        let key = self.obs.level_key();
        self.levels.get_or_create(key).update(&self.obs);

        if !first && self.hostile_visible() {
            return Err(Interrupt::NewThreat);
        }
        Ok(())
    }

    /// Neighbours in the agent's enumeration order
    fn neighbors(&mut self, pos: Position, diagonal: bool) -> Vec<Position> {
        let rng = self.config.shuffle_neighbors.then_some(&mut self.rng);
        neighbors_with(pos, diagonal, rng)
    }

    /// Distances from the agent over the current level
    fn distances(&mut self) -> DistanceField {
        let agent = self.agent();
        DistanceField::compute(self.level_mut(), agent)
    }

    /// Path from the agent to `to` using a field computed from the agent
    fn path_to(&mut self, to: Position, field: &DistanceField) -> Result<Vec<Position>, BotError> {
        let agent = self.agent();
        let level = self.levels.get_or_create(self.obs.level_key());
        let rng = self.config.shuffle_neighbors.then_some(&mut self.rng);
        find_path(level, agent, to, Some(field), rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Direction;
    use crate::fixtures::{screen, ScriptedEnv};

    fn with_tty(mut obs: Observation, tty: &str) -> Observation {
        obs.tty = tty.to_string();
        obs
    }

    fn fixed_order() -> AgentConfig {
        AgentConfig {
            shuffle_neighbors: false,
            ..AgentConfig::default()
        }
    }

    #[test]
    fn test_more_prompt_dismissed_on_start() {
        let start = with_tty(screen(&["@##"]), "Welcome! --More--");
        let env = ScriptedEnv::new(start, vec![screen(&["@##"])]);
        let agent = Agent::new(env, fixed_order()).unwrap();
        assert_eq!(agent.env().actions, vec![Action::Escape]);
        assert_eq!(agent.steps(), 1);
        assert!(agent.level().unwrap().is_walkable(Position::new(0, 2)));
    }

    #[test]
    fn test_yes_no_prompt_confirmed() {
        let start = with_tty(screen(&["@##"]), "Really attack? [yn] (n)");
        let env = ScriptedEnv::new(start, vec![screen(&["@##"])]);
        let agent = Agent::new(env, fixed_order()).unwrap();
        assert_eq!(agent.env().actions, vec![Action::Confirm]);
    }

    #[test]
    fn test_hostile_interrupts_walk() {
        let env = ScriptedEnv::new(screen(&["@##"]), vec![screen(&["#@#a"])]);
        let mut agent = Agent::new(env, fixed_order()).unwrap();
        assert_eq!(agent.tick().unwrap(), TurnStatus::Recovered(Recovery::NewThreat));
        assert_eq!(agent.env().actions, vec![Action::Move(Direction::East)]);
        assert!(agent.hostile_visible());
        assert!(agent.panics().is_empty());
    }

    #[test]
    fn test_hostile_on_first_screen_does_not_interrupt() {
        let env = ScriptedEnv::new(screen(&["@##a"]), vec![]);
        let agent = Agent::new(env, fixed_order()).unwrap();
        assert!(agent.hostile_visible());
        assert!(agent.env().actions.is_empty());
    }

    #[test]
    fn test_position_mismatch_recovered() {
        let env = ScriptedEnv::new(screen(&["@##"]), vec![screen(&["@##"])]);
        let mut agent = Agent::new(env, fixed_order()).unwrap();
        let status = agent.tick().unwrap();
        let TurnStatus::Recovered(Recovery::PositionMismatch(mismatch)) = status else {
            panic!("expected a position mismatch, got {status:?}");
        };
        assert_eq!(mismatch.expected, Position::new(0, 1));
        assert_eq!(mismatch.actual, Position::new(0, 0));
        assert_eq!(agent.panics().len(), 1);
        assert!(!agent.is_finished());
    }

    #[test]
    fn test_episode_end_finishes() {
        let env = ScriptedEnv::new(screen(&["@##"]), vec![]);
        let mut agent = Agent::new(env, fixed_order()).unwrap();
        assert_eq!(agent.tick().unwrap(), TurnStatus::Done);
        assert!(agent.is_finished());
        assert_eq!(agent.tick().unwrap(), TurnStatus::Done);

        let summary = agent.summary();
        assert_eq!(summary.steps, 1);
        assert_eq!(summary.end_reason.as_deref(), Some("script exhausted"));
    }

    #[test]
    fn test_search_in_closed_room() {
        let room = [
            "-----", //
            "|@..|", //
            "-----",
        ];
        let env = ScriptedEnv::new(screen(&room), vec![screen(&room)]);
        let mut agent = Agent::new(env, fixed_order()).unwrap();
        assert_eq!(agent.tick().unwrap(), TurnStatus::Continue(Strategy::Search));
        assert_eq!(agent.env().actions, vec![Action::Search]);
        assert_eq!(agent.level().unwrap().search_count(Position::new(1, 1)), 1);
        assert_eq!(agent.score(), 1.0);
    }

    #[test]
    fn test_explore_stops_kicking_once_door_opens() {
        let walls = "-----";
        let env = ScriptedEnv::new(
            screen(&[walls, "|.@+##", walls]),
            vec![
                screen(&[walls, "|.@/##", walls]),
                screen(&[walls, "|..@##", walls]),
                screen(&[walls, "|./@#", walls]),
            ],
        );
        let mut agent = Agent::new(env, fixed_order()).unwrap();
        assert_eq!(agent.tick().unwrap(), TurnStatus::Continue(Strategy::Explore));
        let east = Action::Move(Direction::East);
        assert_eq!(agent.env().actions, vec![east, east, east]);
        assert_eq!(agent.agent(), Position::new(1, 4));
    }

    #[test]
    fn test_fight_picks_first_nearest_reachable_hostile() {
        let walls = "---------";
        let start = screen(&[walls, "|a..@..b|", walls, "    d    "]);
        let env = ScriptedEnv::new(
            start,
            vec![screen(&[walls, "|a.@...b|", walls, "    d    "])],
        );
        let mut agent = Agent::new(env, fixed_order()).unwrap();
        // The walled-off hostile is closer but unreachable; the two in the
        // corridor tie and the first in row-major order wins
        assert_eq!(agent.tick().unwrap(), TurnStatus::Recovered(Recovery::NewThreat));
        assert_eq!(agent.env().actions, vec![Action::Move(Direction::West)]);
    }

    #[test]
    fn test_fight_attacks_adjacent_hostile() {
        let walls = "------";
        let env = ScriptedEnv::new(
            screen(&[walls, "|.@d.|", walls]),
            vec![screen(&[walls, "|.@..|", walls])],
        );
        let mut agent = Agent::new(env, fixed_order()).unwrap();
        assert_eq!(agent.tick().unwrap(), TurnStatus::Continue(Strategy::Fight));
        assert_eq!(agent.env().actions, vec![Action::Move(Direction::East)]);
        assert_eq!(agent.agent(), Position::new(1, 2));
    }

    #[test]
    fn test_explore_ties_go_to_first_frontier() {
        let walls = "-------";
        let env = ScriptedEnv::new(
            screen(&[walls, " #.@.# ", walls]),
            vec![
                screen(&[walls, " #@..# ", walls]),
                screen(&[walls, " @...# ", walls]),
            ],
        );
        let mut agent = Agent::new(env, fixed_order()).unwrap();
        assert_eq!(agent.tick().unwrap(), TurnStatus::Continue(Strategy::Explore));
        let west = Action::Move(Direction::West);
        assert_eq!(agent.env().actions, vec![west, west]);
    }

    #[test]
    fn test_descend_from_stairs() {
        let room = [
            "-----", //
            "|@>.|", //
            "-----",
        ];
        let mut below = screen(&["@.."]);
        below.stats.level_number = 2;
        let env = ScriptedEnv::new(screen(&room), vec![screen(&["-----", "|.@.|", "-----"]), below]);
        let mut agent = Agent::new(env, fixed_order()).unwrap();
        assert_eq!(agent.tick().unwrap(), TurnStatus::Continue(Strategy::Descend));
        assert_eq!(
            agent.env().actions,
            vec![Action::Move(Direction::East), Action::Down]
        );
        assert_eq!(agent.levels().len(), 2);
    }
}
