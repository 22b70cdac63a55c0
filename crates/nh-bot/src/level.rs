//! Per-level map memory
//!
//! A `Level` accumulates what the agent has learned about one dungeon floor
//! across visits: which cells it has seen, which it believes it can walk on,
//! the last terrain glyph observed there, and how often it searched there.

use std::fmt;

use hashbrown::HashMap;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::glyph::{classify, Glyph, GlyphClass};
use crate::observation::Observation;
use crate::pathfind::neighbors;
use crate::position::Position;
use crate::{COLNO, ROWNO};

/// Dungeon level identifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct LevelKey {
    /// Dungeon number (which branch)
    pub dungeon_num: i32,
    /// Level number within the dungeon
    pub level_num: i32,
}

impl LevelKey {
    pub const fn new(dungeon_num: i32, level_num: i32) -> Self {
        Self {
            dungeon_num,
            level_num,
        }
    }
}

impl fmt::Display for LevelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.dungeon_num, self.level_num)
    }
}

/// Remembered state of one dungeon level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    key: LevelKey,
    seen: Array2<bool>,
    walkable: Array2<bool>,
    objects: Array2<Option<Glyph>>,
    search_count: Array2<u32>,
}

impl Level {
    pub fn new(key: LevelKey) -> Self {
        Self {
            key,
            seen: Array2::from_elem((ROWNO, COLNO), false),
            walkable: Array2::from_elem((ROWNO, COLNO), false),
            objects: Array2::from_elem((ROWNO, COLNO), None),
            search_count: Array2::zeros((ROWNO, COLNO)),
        }
    }

    pub fn key(&self) -> LevelKey {
        self.key
    }

    pub fn is_seen(&self, pos: Position) -> bool {
        self.seen[pos.index()]
    }

    pub fn is_walkable(&self, pos: Position) -> bool {
        self.walkable[pos.index()]
    }

    /// Last terrain glyph observed at the cell
    pub fn object(&self, pos: Position) -> Option<Glyph> {
        self.objects[pos.index()]
    }

    /// Classes of the remembered terrain; empty while unknown
    pub fn object_class(&self, pos: Position) -> GlyphClass {
        self.object(pos).map(classify).unwrap_or_default()
    }

    pub fn search_count(&self, pos: Position) -> u32 {
        self.search_count[pos.index()]
    }

    /// Fold a new observation into the map.
    ///
    /// Creatures mark their cell walkable but never overwrite the terrain
    /// remembered under them. Stone right next to the agent is marked seen,
    /// since the edge of the lit area otherwise never leaves its default.
    pub fn update(&mut self, obs: &Observation) {
        for (idx, &glyph) in obs.glyphs.indexed_iter() {
            let class = classify(glyph);
            if class.intersects(GlyphClass::PASSABLE) {
                self.seen[idx] = true;
                self.walkable[idx] = true;
                self.objects[idx] = Some(glyph);
            } else if class.intersects(GlyphClass::BLOCKING) {
                self.seen[idx] = true;
                self.objects[idx] = Some(glyph);
            } else if class.intersects(GlyphClass::CREATURE) {
                self.seen[idx] = true;
                self.walkable[idx] = true;
            }
        }

        let agent = obs.agent();
        if agent.in_bounds() {
            for pos in neighbors(agent, true) {
                let glyph = obs.glyph(pos);
                if classify(glyph).contains(GlyphClass::STONE) {
                    self.seen[pos.index()] = true;
                    self.objects[pos.index()] = Some(glyph);
                }
            }
        }
    }

    /// Count one search performed while standing on `pos`
    pub fn record_search(&mut self, pos: Position) {
        self.search_count[pos.index()] += 1;
    }

    /// First cell in row-major order whose remembered terrain is of `class`
    pub fn find_object(&self, class: GlyphClass) -> Option<Position> {
        Position::all().find(|&pos| self.object_class(pos).intersects(class))
    }
}

/// All levels the agent has visited, created on first entry and kept for
/// the whole run
#[derive(Debug, Clone, Default)]
pub struct MapRegistry {
    levels: HashMap<LevelKey, Level>,
}

impl MapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Level for `key`, creating an empty one on first visit
    pub fn get_or_create(&mut self, key: LevelKey) -> &mut Level {
        self.levels.entry(key).or_insert_with(|| {
            tracing::info!(level = %key, "entering new level");
            Level::new(key)
        })
    }

    pub fn get(&self, key: LevelKey) -> Option<&Level> {
        self.levels.get(&key)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Visited level keys, sorted
    pub fn keys(&self) -> Vec<LevelKey> {
        let mut keys: Vec<_> = self.levels.keys().copied().collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::fixtures::screen;

    #[test]
    fn test_new_level_is_unknown() {
        let level = Level::new(LevelKey::new(0, 1));
        let pos = Position::new(4, 4);
        assert!(!level.is_seen(pos));
        assert!(!level.is_walkable(pos));
        assert_eq!(level.object(pos), None);
        assert_eq!(level.search_count(pos), 0);
    }

    #[test]
    fn test_update_classifies_cells() {
        let obs = screen(&[
            "-----", //
            "|.@.+", //
            "|.d.|", //
            "-----",
        ]);
        let mut level = Level::new(obs.level_key());
        level.update(&obs);

        let floor = Position::new(1, 1);
        assert!(level.is_seen(floor));
        assert!(level.is_walkable(floor));
        assert_eq!(level.object(floor), Some(cmap_to_glyph(S_ROOM)));

        let wall = Position::new(0, 0);
        assert!(level.is_seen(wall));
        assert!(!level.is_walkable(wall));

        let door = Position::new(1, 4);
        assert!(level.is_seen(door));
        assert!(!level.is_walkable(door));
        assert!(level.object_class(door).contains(GlyphClass::DOOR_CLOSED));

        // Creatures are walkable but leave terrain unknown
        let monster = Position::new(2, 2);
        assert!(level.is_walkable(monster));
        assert_eq!(level.object(monster), None);
        assert!(level.is_walkable(obs.agent()));
    }

    #[test]
    fn test_closed_door_blocks_until_opened() {
        use crate::pathfind::{find_path, DistanceField};

        let mut level = Level::new(LevelKey::new(0, 1));
        level.update(&screen(&["|@.+##"]));
        let door = Position::new(0, 3);
        let beyond = Position::new(0, 5);
        assert!(level.is_seen(door));
        assert!(!level.is_walkable(door));
        assert_eq!(level.object_class(door), GlyphClass::DOOR_CLOSED);

        let agent = Position::new(0, 1);
        let field = DistanceField::compute(&level, agent);
        assert!(!field.is_reachable(beyond));
        assert!(find_path(&level, agent, beyond, Some(&field), None).is_err());

        level.update(&screen(&["|@./##"]));
        assert!(level.is_walkable(door));
        let path = find_path(&level, agent, beyond, None, None).unwrap();
        assert_eq!(path.len(), 5);
    }

    #[test]
    fn test_creature_keeps_remembered_terrain() {
        let mut level = Level::new(LevelKey::new(0, 1));
        level.update(&screen(&["@..", "..."]));
        let cell = Position::new(1, 1);
        assert_eq!(level.object(cell), Some(cmap_to_glyph(S_ROOM)));

        level.update(&screen(&["@..", ".d."]));
        assert_eq!(level.object(cell), Some(cmap_to_glyph(S_ROOM)));
        assert!(level.is_walkable(cell));
    }

    #[test]
    fn test_stone_next_to_agent_is_seen() {
        let obs = screen(&[
            "     ", //
            " #@# ", //
            "     ",
        ]);
        let mut level = Level::new(LevelKey::new(0, 1));
        level.update(&obs);

        let above = Position::new(0, 2);
        assert!(level.is_seen(above));
        assert!(!level.is_walkable(above));
        assert_eq!(level.object(above), Some(cmap_to_glyph(S_STONE)));

        let far = Position::new(1, 0);
        assert!(!level.is_seen(far));
        assert_eq!(level.object(far), None);
    }

    #[test]
    fn test_walkable_survives_creature_leaving_view() {
        let mut level = Level::new(LevelKey::new(0, 1));
        level.update(&screen(&["@.#"]));
        level.update(&screen(&["@  "]));
        assert!(level.is_walkable(Position::new(0, 2)));
        assert_eq!(level.object(Position::new(0, 2)), Some(cmap_to_glyph(S_CORR)));
    }

    #[test]
    fn test_record_search() {
        let mut level = Level::new(LevelKey::new(0, 1));
        let pos = Position::new(2, 3);
        level.record_search(pos);
        level.record_search(pos);
        assert_eq!(level.search_count(pos), 2);
        assert_eq!(level.search_count(Position::new(2, 4)), 0);
    }

    #[test]
    fn test_find_object_row_major() {
        let mut level = Level::new(LevelKey::new(0, 1));
        level.update(&screen(&["@..>", ">..."]));
        assert_eq!(
            level.find_object(GlyphClass::STAIR_DOWN),
            Some(Position::new(0, 3))
        );
        assert_eq!(level.find_object(GlyphClass::STAIR_UP), None);
    }

    #[test]
    fn test_registry_creates_lazily() {
        let mut registry = MapRegistry::new();
        assert!(registry.is_empty());
        let key = LevelKey::new(0, 1);
        registry.get_or_create(key).record_search(Position::new(1, 1));
        registry.get_or_create(LevelKey::new(0, 2));
        assert_eq!(registry.len(), 2);

        // Existing levels are kept, not replaced
        let level = registry.get_or_create(key);
        assert_eq!(level.search_count(Position::new(1, 1)), 1);
        assert_eq!(registry.keys(), vec![key, LevelKey::new(0, 2)]);
    }
}
