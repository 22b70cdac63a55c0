//! Glyph classification
//!
//! Maps the integer glyph ids shown on the map to the handful of semantic
//! categories the agent reasons about, and back. Movement legality and every
//! heuristic key off exact membership, so the sets mirror display.h.

use std::sync::OnceLock;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::consts::*;
use crate::error::BotError;
use crate::observation::Observation;
use crate::position::Position;

/// Integer identifier of a displayed map tile
pub type Glyph = i16;

bitflags! {
    /// Set of categories a glyph belongs to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct GlyphClass: u16 {
        const FLOOR = 1 << 0;
        const STONE = 1 << 1;
        const WALL = 1 << 2;
        const CORRIDOR = 1 << 3;
        const STAIR_UP = 1 << 4;
        const STAIR_DOWN = 1 << 5;
        const DOOR_CLOSED = 1 << 6;
        const DOOR_OPENED = 1 << 7;
        const MONSTER = 1 << 8;
        const PET = 1 << 9;

        const DOORS = Self::DOOR_CLOSED.bits() | Self::DOOR_OPENED.bits();
        /// Terrain the agent may stand on
        const PASSABLE = Self::FLOOR.bits()
            | Self::CORRIDOR.bits()
            | Self::STAIR_UP.bits()
            | Self::STAIR_DOWN.bits()
            | Self::DOOR_OPENED.bits();
        /// Terrain that is seen but blocks movement
        const BLOCKING = Self::WALL.bits() | Self::DOOR_CLOSED.bits();
        const CREATURE = Self::MONSTER.bits() | Self::PET.bits();
    }
}

/// Named glyph category
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum GlyphCategory {
    Floor,
    Stone,
    Wall,
    Corridor,
    StairUp,
    StairDown,
    DoorClosed,
    DoorOpened,
    Doors,
    Monster,
    Pet,
}

impl GlyphCategory {
    /// Class bits for this category
    pub const fn class(self) -> GlyphClass {
        match self {
            GlyphCategory::Floor => GlyphClass::FLOOR,
            GlyphCategory::Stone => GlyphClass::STONE,
            GlyphCategory::Wall => GlyphClass::WALL,
            GlyphCategory::Corridor => GlyphClass::CORRIDOR,
            GlyphCategory::StairUp => GlyphClass::STAIR_UP,
            GlyphCategory::StairDown => GlyphClass::STAIR_DOWN,
            GlyphCategory::DoorClosed => GlyphClass::DOOR_CLOSED,
            GlyphCategory::DoorOpened => GlyphClass::DOOR_OPENED,
            GlyphCategory::Doors => GlyphClass::DOORS,
            GlyphCategory::Monster => GlyphClass::MONSTER,
            GlyphCategory::Pet => GlyphClass::PET,
        }
    }

    /// Whether glyphs are members of this category directly, rather than
    /// through the categories it groups
    pub const fn is_leaf(self) -> bool {
        !matches!(self, GlyphCategory::Doors)
    }

    /// Glyph ids in this category
    pub fn glyphs(self) -> Vec<Glyph> {
        let cmap = |syms: &[Glyph]| -> Vec<Glyph> { syms.iter().map(|&s| cmap_to_glyph(s)).collect() };
        match self {
            GlyphCategory::Floor => cmap(&[S_ROOM, S_NDOOR, S_DARKROOM]),
            GlyphCategory::Stone => cmap(&[S_STONE]),
            GlyphCategory::Wall => cmap(&[
                S_VWALL, S_HWALL, S_TLCORN, S_TRCORN, S_BLCORN, S_BRCORN, S_CRWALL, S_TUWALL,
                S_TDWALL, S_TLWALL, S_TRWALL,
            ]),
            GlyphCategory::Corridor => cmap(&[S_CORR]),
            GlyphCategory::StairUp => cmap(&[S_UPSTAIR]),
            GlyphCategory::StairDown => cmap(&[S_DNSTAIR]),
            GlyphCategory::DoorClosed => cmap(&[S_VCDOOR, S_HCDOOR]),
            GlyphCategory::DoorOpened => cmap(&[S_VODOOR, S_HODOOR]),
            GlyphCategory::Doors => {
                let mut doors = GlyphCategory::DoorClosed.glyphs();
                doors.extend(GlyphCategory::DoorOpened.glyphs());
                doors
            }
            GlyphCategory::Monster => (GLYPH_MON_OFF..GLYPH_MON_OFF + NUMMONS).collect(),
            GlyphCategory::Pet => (GLYPH_PET_OFF..GLYPH_PET_OFF + NUMMONS).collect(),
        }
    }

    /// Characters a glyph of this category may be displayed as.
    ///
    /// Empty for categories that are not checked against the screen.
    pub const fn display_chars(self) -> &'static [u8] {
        match self {
            GlyphCategory::Floor => b".",
            GlyphCategory::Stone => b" ",
            GlyphCategory::Wall => b"|-",
            GlyphCategory::Corridor => b"#",
            GlyphCategory::StairUp => b"<",
            GlyphCategory::StairDown => b">",
            GlyphCategory::DoorClosed => b"+",
            GlyphCategory::DoorOpened => b"-|",
            GlyphCategory::Doors | GlyphCategory::Monster | GlyphCategory::Pet => b"",
        }
    }
}

/// Glyph id → class lookup, built once
#[derive(Debug, Clone)]
pub struct GlyphTable {
    classes: Vec<GlyphClass>,
}

static TABLE: OnceLock<GlyphTable> = OnceLock::new();

impl GlyphTable {
    fn build() -> Self {
        let mut classes = vec![GlyphClass::empty(); MAX_GLYPH as usize];
        for category in GlyphCategory::iter().filter(|c| c.is_leaf()) {
            for glyph in category.glyphs() {
                classes[glyph as usize] |= category.class();
            }
        }
        Self { classes }
    }

    /// The shared table
    pub fn get() -> &'static GlyphTable {
        TABLE.get_or_init(Self::build)
    }

    /// Classes of a glyph; empty for glyphs outside every category
    pub fn class_of(&self, glyph: Glyph) -> GlyphClass {
        usize::try_from(glyph)
            .ok()
            .and_then(|i| self.classes.get(i).copied())
            .unwrap_or_default()
    }

    /// Category names a glyph belongs to; grouping categories are included
    /// through their members
    pub fn categories(&self, glyph: Glyph) -> Vec<GlyphCategory> {
        let class = self.class_of(glyph);
        GlyphCategory::iter()
            .filter(|c| class.intersects(c.class()))
            .collect()
    }

    /// Cross-check glyphs against the characters the backend displays.
    ///
    /// Every glyph of a checked category must be shown with one of the
    /// category's characters.
    pub fn check_screen(&self, obs: &Observation) -> Result<(), BotError> {
        for pos in Position::all() {
            let glyph = obs.glyph(pos);
            let ch = obs.char_at(pos);
            for category in self.categories(glyph) {
                let allowed = category.display_chars();
                if !allowed.is_empty() && !allowed.contains(&ch) {
                    return Err(BotError::GlyphMismatch {
                        pos,
                        glyph,
                        category,
                        ch: ch as char,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Classify a glyph with the shared table
pub fn classify(glyph: Glyph) -> GlyphClass {
    GlyphTable::get().class_of(glyph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_door_membership() {
        let closed = classify(cmap_to_glyph(S_VCDOOR));
        assert_eq!(closed, GlyphClass::DOOR_CLOSED);
        assert!(closed.intersects(GlyphClass::DOORS));
        assert!(!closed.intersects(GlyphClass::PASSABLE));

        let open = classify(cmap_to_glyph(S_HODOOR));
        assert_eq!(open, GlyphClass::DOOR_OPENED);
        assert!(open.intersects(GlyphClass::PASSABLE));

        // A doorless doorway is floor, not a door
        let doorway = classify(cmap_to_glyph(S_NDOOR));
        assert_eq!(doorway, GlyphClass::FLOOR);
    }

    #[test]
    fn test_creatures() {
        assert_eq!(classify(mon_to_glyph(0)), GlyphClass::MONSTER);
        assert_eq!(classify(mon_to_glyph(NUMMONS - 1)), GlyphClass::MONSTER);
        assert_eq!(classify(pet_to_glyph(0)), GlyphClass::PET);
        assert_eq!(classify(GLYPH_INVIS_OFF), GlyphClass::empty());
    }

    #[test]
    fn test_unknown_glyphs() {
        assert!(classify(-1).is_empty());
        assert!(classify(MAX_GLYPH).is_empty());
        assert!(classify(GLYPH_OBJ_OFF + 10).is_empty());
        assert!(classify(cmap_to_glyph(S_LITCORR)).is_empty());
    }

    #[test]
    fn test_inverse_lookup() {
        let table = GlyphTable::get();
        assert_eq!(
            table.categories(cmap_to_glyph(S_HCDOOR)),
            vec![GlyphCategory::DoorClosed, GlyphCategory::Doors]
        );
        assert_eq!(
            table.categories(cmap_to_glyph(S_CORR)),
            vec![GlyphCategory::Corridor]
        );
        assert!(table.categories(GLYPH_OBJ_OFF).is_empty());
    }

    #[test]
    fn test_categories_round_trip() {
        let table = GlyphTable::get();
        for category in GlyphCategory::iter() {
            for glyph in category.glyphs() {
                assert!(table.categories(glyph).contains(&category), "{category} {glyph}");
            }
        }
    }

    #[test]
    fn test_check_screen_rejects_bad_char() {
        let table = GlyphTable::get();
        let mut obs = Observation::blank();
        assert!(table.check_screen(&obs).is_ok());

        let pos = Position::new(3, 4);
        obs.glyphs[pos.index()] = cmap_to_glyph(S_CORR);
        obs.chars[pos.index()] = b'.';
        let err = table.check_screen(&obs).unwrap_err();
        assert!(matches!(
            err,
            BotError::GlyphMismatch { category: GlyphCategory::Corridor, .. }
        ));

        obs.chars[pos.index()] = b'#';
        assert!(table.check_screen(&obs).is_ok());
    }

    #[test]
    fn test_check_screen_accepts_doors() {
        let table = GlyphTable::get();
        let mut obs = Observation::blank();
        let closed = Position::new(2, 2);
        obs.glyphs[closed.index()] = cmap_to_glyph(S_VCDOOR);
        obs.chars[closed.index()] = b'+';
        let open = Position::new(2, 3);
        obs.glyphs[open.index()] = cmap_to_glyph(S_VODOOR);
        obs.chars[open.index()] = b'-';
        assert_eq!(table.check_screen(&obs), Ok(()));

        obs.chars[open.index()] = b'+';
        assert!(matches!(
            table.check_screen(&obs),
            Err(BotError::GlyphMismatch { category: GlyphCategory::DoorOpened, .. })
        ));
    }
}
