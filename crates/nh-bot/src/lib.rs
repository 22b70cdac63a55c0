//! nh-bot: Heuristic player for NetHack
//!
//! The agent keeps a map of every level it visits, computes shortest-hop
//! distances over what it believes is walkable, and each turn runs the first
//! applicable strategy: fight, explore, descend or search.
//!
//! The game itself sits behind the [`Environment`] trait, so the same agent
//! drives a learning-environment binding, the `nh-sim` dungeon, or a test
//! double.

pub mod action;
pub mod agent;
pub mod config;
pub mod consts;
pub mod env;
pub mod error;
pub mod glyph;
pub mod level;
pub mod observation;
pub mod pathfind;
pub mod position;
pub mod rng;
pub mod summary;

#[cfg(test)]
mod fixtures;

pub use action::{Action, Direction};
pub use agent::{Agent, Heading, Recovery, Strategy, TurnStatus};
pub use config::AgentConfig;
pub use consts::{COLNO, ROWNO};
pub use env::{EnvError, Environment, StepInfo, StepLimit, Transition};
pub use error::{BotError, PositionMismatch};
pub use glyph::{classify, Glyph, GlyphCategory, GlyphClass, GlyphTable};
pub use level::{Level, LevelKey, MapRegistry};
pub use observation::{BottomLine, Observation, Prompt};
pub use pathfind::{can_step, find_path, DistanceField};
pub use position::Position;
pub use rng::BotRng;
pub use summary::EpisodeSummary;
