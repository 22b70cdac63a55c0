//! Observations handed in by the game backend each step

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::consts::{cmap_to_glyph, S_STONE};
use crate::env::EnvError;
use crate::glyph::Glyph;
use crate::level::LevelKey;
use crate::position::Position;
use crate::{COLNO, ROWNO};

/// Bottom-line statistics, in the order of the backend's `blstats` vector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BottomLine {
    /// Agent column
    pub x: i64,
    /// Agent row
    pub y: i64,
    pub strength_percentage: i64,
    pub strength: i64,
    pub dexterity: i64,
    pub constitution: i64,
    pub intelligence: i64,
    pub wisdom: i64,
    pub charisma: i64,
    pub score: i64,
    pub hitpoints: i64,
    pub max_hitpoints: i64,
    pub depth: i64,
    pub gold: i64,
    pub energy: i64,
    pub max_energy: i64,
    pub armor_class: i64,
    pub monster_level: i64,
    pub experience_level: i64,
    pub experience_points: i64,
    /// Game turn counter
    pub time: i64,
    pub hunger_state: i64,
    pub carrying_capacity: i64,
    /// Dungeon branch
    pub dungeon_number: i64,
    /// Level within the branch
    pub level_number: i64,
}

impl BottomLine {
    /// Number of fields in the raw vector
    pub const FIELDS: usize = 25;

    /// Decode the raw `blstats` vector
    pub fn from_raw(raw: &[i64]) -> Result<Self, EnvError> {
        let &[
            x,
            y,
            strength_percentage,
            strength,
            dexterity,
            constitution,
            intelligence,
            wisdom,
            charisma,
            score,
            hitpoints,
            max_hitpoints,
            depth,
            gold,
            energy,
            max_energy,
            armor_class,
            monster_level,
            experience_level,
            experience_points,
            time,
            hunger_state,
            carrying_capacity,
            dungeon_number,
            level_number,
        ] = raw
        else {
            return Err(EnvError::BadBottomLine {
                got: raw.len(),
                expected: Self::FIELDS,
            });
        };
        Ok(Self {
            x,
            y,
            strength_percentage,
            strength,
            dexterity,
            constitution,
            intelligence,
            wisdom,
            charisma,
            score,
            hitpoints,
            max_hitpoints,
            depth,
            gold,
            energy,
            max_energy,
            armor_class,
            monster_level,
            experience_level,
            experience_points,
            time,
            hunger_state,
            carrying_capacity,
            dungeon_number,
            level_number,
        })
    }

    /// Agent position
    pub fn position(&self) -> Position {
        Position::new(self.y as i16, self.x as i16)
    }

    /// Key of the level the agent is on
    pub fn level_key(&self) -> LevelKey {
        LevelKey::new(self.dungeon_number as i32, self.level_number as i32)
    }
}

/// Text prompt the backend is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// `--More--`
    More,
    /// `[yn]` question
    YesNo,
}

impl Prompt {
    /// Fixed answer the agent gives
    pub const fn answer(self) -> Action {
        match self {
            Prompt::More => Action::Escape,
            Prompt::YesNo => Action::Confirm,
        }
    }
}

/// One snapshot of the game screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Glyph id per cell
    pub glyphs: Array2<Glyph>,
    /// Displayed character per cell; only used for validation
    pub chars: Array2<u8>,
    /// Top-line message
    pub message: String,
    /// Raw terminal text, scanned for prompts
    pub tty: String,
    pub stats: BottomLine,
}

impl Observation {
    /// An all-stone screen with default statistics
    pub fn blank() -> Self {
        Self {
            glyphs: Array2::from_elem((ROWNO, COLNO), cmap_to_glyph(S_STONE)),
            chars: Array2::from_elem((ROWNO, COLNO), b' '),
            message: String::new(),
            tty: String::new(),
            stats: BottomLine::default(),
        }
    }

    /// Check the grids have the map's shape
    pub fn validate_shape(&self) -> Result<(), EnvError> {
        for shape in [self.glyphs.dim(), self.chars.dim()] {
            if shape != (ROWNO, COLNO) {
                return Err(EnvError::BadShape {
                    rows: shape.0,
                    cols: shape.1,
                });
            }
        }
        Ok(())
    }

    pub fn glyph(&self, pos: Position) -> Glyph {
        self.glyphs[pos.index()]
    }

    pub fn char_at(&self, pos: Position) -> u8 {
        self.chars[pos.index()]
    }

    /// Agent position
    pub fn agent(&self) -> Position {
        self.stats.position()
    }

    pub fn level_key(&self) -> LevelKey {
        self.stats.level_key()
    }

    /// Prompt waiting for an answer, if any
    pub fn prompt(&self) -> Option<Prompt> {
        if self.tty.contains("--More--") {
            Some(Prompt::More)
        } else if self.tty.contains("[yn]") {
            Some(Prompt::YesNo)
        } else {
            None
        }
    }
}
