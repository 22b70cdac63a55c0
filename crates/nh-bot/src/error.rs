//! Error and interrupt types
//!
//! `BotError` covers invariant violations that halt the run. `Interrupt` is
//! the internal signal that unwinds a turn through `?` back to the control
//! loop, which folds it into a `TurnStatus`.

use thiserror::Error;

use crate::env::EnvError;
use crate::glyph::{Glyph, GlyphCategory};
use crate::position::Position;

/// Fatal conditions: corrupted state or a logic defect
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BotError {
    #[error("glyph {glyph} at {pos} is {category} but displayed as {ch:?}")]
    GlyphMismatch {
        pos: Position,
        glyph: Glyph,
        category: GlyphCategory,
        ch: char,
    },

    #[error("agent cell {pos} displayed as {ch:?} instead of '@'")]
    AgentNotShown { pos: Position, ch: char },

    #[error("destination {to} is unreachable from {from}")]
    Unreachable { from: Position, to: Position },

    #[error("distance field was computed from {field_source}, not {from}")]
    ForeignDistanceField {
        field_source: Position,
        from: Position,
    },

    #[error("target {to} is not adjacent to agent at {from}")]
    NotAdjacent { from: Position, to: Position },

    #[error("{expected} expected at {pos}, found glyph {glyph}")]
    UnexpectedGlyph {
        pos: Position,
        expected: GlyphCategory,
        glyph: Glyph,
    },

    #[error("no strategy applicable at {pos}")]
    NoStrategy { pos: Position },

    #[error(transparent)]
    Env(#[from] EnvError),
}

/// A movement whose outcome differed from the prediction
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PositionMismatch {
    /// Game turn when it was noticed
    pub turn: i64,
    pub expected: Position,
    pub actual: Position,
    /// Message shown after the move
    pub message: String,
}

impl std::fmt::Display for PositionMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "agent position does not match after move: expected {}, got {}",
            self.expected, self.actual
        )
    }
}

/// Non-local exit from the middle of a turn
#[derive(Debug)]
pub(crate) enum Interrupt {
    /// Movement prediction failed; recoverable
    Panic(PositionMismatch),
    /// A hostile creature is on screen; re-plan
    NewThreat,
    /// The backend ended the episode
    Finished,
    /// Invariant violation
    Fatal(BotError),
}

impl From<BotError> for Interrupt {
    fn from(err: BotError) -> Self {
        Interrupt::Fatal(err)
    }
}

impl From<EnvError> for Interrupt {
    fn from(err: EnvError) -> Self {
        Interrupt::Fatal(BotError::Env(err))
    }
}

/// Result of anything that submits actions
pub(crate) type Flow<T> = Result<T, Interrupt>;
