//! Primitive actions: one step toward a neighbouring cell, with checks

use super::Agent;
use crate::action::{Action, Direction};
use crate::env::Environment;
use crate::error::{BotError, Flow, Interrupt, PositionMismatch};
use crate::glyph::{classify, GlyphCategory, GlyphClass};
use crate::position::Position;

/// Where a directional primitive points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    /// An adjacent cell
    Toward(Position),
    Compass(Direction),
    /// Descend stairs
    Down,
    /// Climb stairs
    Up,
}

impl From<Position> for Heading {
    fn from(pos: Position) -> Self {
        Heading::Toward(pos)
    }
}

impl From<Direction> for Heading {
    fn from(dir: Direction) -> Self {
        Heading::Compass(dir)
    }
}

impl Heading {
    /// The keystroke for this heading as seen from `from`
    pub fn action(self, from: Position) -> Result<Action, BotError> {
        match self {
            Heading::Toward(to) => {
                let drow = to.row - from.row;
                let dcol = to.col - from.col;
                i8::try_from(drow)
                    .ok()
                    .zip(i8::try_from(dcol).ok())
                    .and_then(|(dr, dc)| Direction::from_delta(dr, dc))
                    .map(Action::Move)
                    .ok_or(BotError::NotAdjacent { from, to })
            }
            Heading::Compass(dir) => Ok(Action::Move(dir)),
            Heading::Down => Ok(Action::Down),
            Heading::Up => Ok(Action::Up),
        }
    }

    /// Where the agent should stand afterwards if the move succeeds
    pub fn predicted(self, from: Position) -> Position {
        match self {
            Heading::Toward(to) => to,
            Heading::Compass(dir) => {
                let (dr, dc) = dir.delta();
                from.offset(dr, dc)
            }
            Heading::Down | Heading::Up => from,
        }
    }
}

impl<E: Environment> Agent<E> {
    /// Submit the keystroke for `heading`
    pub(crate) fn direction(&mut self, heading: impl Into<Heading>) -> Flow<()> {
        let action = heading.into().action(self.agent())?;
        self.step(action)
    }

    /// Step toward `heading` and check the agent landed there
    pub(crate) fn move_to(&mut self, heading: impl Into<Heading>) -> Flow<()> {
        let heading = heading.into();
        let expected = heading.predicted(self.agent());
        self.direction(heading)?;

        let actual = self.agent();
        if actual != expected {
            return Err(Interrupt::Panic(PositionMismatch {
                turn: self.obs.stats.time,
                expected,
                actual,
                message: self.obs.message.clone(),
            }));
        }
        Ok(())
    }

    /// Try to open the closed door at `door`; true if it no longer shows closed
    pub(crate) fn open_door(&mut self, door: Position) -> Flow<bool> {
        self.expect(door, GlyphCategory::DoorClosed)?;
        self.direction(door)?;
        Ok(!self.shows(door, GlyphClass::DOOR_CLOSED))
    }

    /// Kick toward `target`; true if the agent then stands on it
    pub(crate) fn kick(&mut self, target: Position) -> Flow<bool> {
        self.step(Action::Kick)?;
        self.direction(target)?;
        Ok(self.agent() == target)
    }

    /// Attack the monster at `target`
    pub(crate) fn fight(&mut self, target: Position) -> Flow<bool> {
        self.expect(target, GlyphCategory::Monster)?;
        self.direction(target)?;
        Ok(true)
    }

    /// Search once from where the agent stands
    pub(crate) fn search(&mut self) -> Flow<bool> {
        let pos = self.agent();
        let key = self.obs.level_key();
        let outcome = self.step(Action::Search);
        // The search happened even if the reply interrupts the turn
        self.levels.get_or_create(key).record_search(pos);
        outcome.map(|()| true)
    }

    fn expect(&self, pos: Position, expected: GlyphCategory) -> Result<(), BotError> {
        let glyph = self.obs.glyph(pos);
        if classify(glyph).intersects(expected.class()) {
            Ok(())
        } else {
            Err(BotError::UnexpectedGlyph {
                pos,
                expected,
                glyph,
            })
        }
    }
}
