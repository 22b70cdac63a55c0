//! Strategies, tried in priority order every turn
//!
//! A strategy either reports that it does not apply, without submitting
//! anything, or plays one or more actions and reports that it applied.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use super::{Agent, Heading};
use crate::env::Environment;
use crate::error::{BotError, Flow};
use crate::glyph::{classify, GlyphClass};
use crate::level::Level;
use crate::observation::Observation;
use crate::pathfind::{neighbors, DistanceField};
use crate::position::Position;
use crate::{COLNO, ROWNO};

/// Strategies in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum Strategy {
    /// Approach and attack the nearest reachable hostile
    Fight,
    /// Walk to the nearest unexplored edge
    Explore,
    /// Walk to the down stairs and descend
    Descend,
    /// Walk to the most promising spot and search
    Search,
}

/// Base search priority of a reachable cell
const SEARCH_BASE: f64 = -20.0;
/// Penalty per squared search count
const SEARCH_REPEAT_PENALTY: f64 = 10.0;
const CORRIDOR_BONUS: f64 = 15.0;
const DOOR_BONUS: f64 = 80.0;
/// Per neighbour remembered as stone
const STONE_NEIGHBOR_BONUS: f64 = 40.0;
/// Per neighbour remembered as wall
const WALL_NEIGHBOR_BONUS: f64 = 20.0;

/// Reachable walkable cells at the edge of the explored map: an unseen stone
/// cell among the 8 neighbours, or a closed door among the 4 orthogonal ones
pub fn frontier(level: &Level, obs: &Observation, field: &DistanceField) -> Array2<bool> {
    let mut out = Array2::from_elem((ROWNO, COLNO), false);
    for (pos, _) in field.reachable() {
        if !level.is_walkable(pos) {
            continue;
        }
        let open_edge = neighbors(pos, true)
            .into_iter()
            .any(|n| !level.is_seen(n) && classify(obs.glyph(n)).contains(GlyphClass::STONE));
        let closed_door = neighbors(pos, false)
            .into_iter()
            .any(|n| classify(obs.glyph(n)).contains(GlyphClass::DOOR_CLOSED));
        out[pos.index()] = open_edge || closed_door;
    }
    out
}

/// How promising each cell is to search from; `-inf` where unreachable
pub fn search_priorities(level: &Level, field: &DistanceField) -> Array2<f64> {
    let mut prio = Array2::from_elem((ROWNO, COLNO), f64::NEG_INFINITY);
    for (pos, dist) in field.reachable() {
        if !level.is_walkable(pos) {
            continue;
        }
        let count = f64::from(level.search_count(pos));
        let mut p = SEARCH_BASE - f64::from(dist) - SEARCH_REPEAT_PENALTY * count * count;

        let own = level.object_class(pos);
        if own.intersects(GlyphClass::CORRIDOR) {
            p += CORRIDOR_BONUS;
        }
        if own.intersects(GlyphClass::DOORS) {
            p += DOOR_BONUS;
        }
        for n in neighbors(pos, true) {
            let class = level.object_class(n);
            if class.contains(GlyphClass::STONE) {
                p += STONE_NEIGHBOR_BONUS;
            }
            if class.intersects(GlyphClass::WALL) {
                p += WALL_NEIGHBOR_BONUS;
            }
        }
        prio[pos.index()] = p;
    }
    prio
}

/// Cell with the highest finite priority; ties go to the first in row-major
/// order
pub fn best_cell(prio: &Array2<f64>) -> Option<Position> {
    let mut best: Option<(Position, f64)> = None;
    for (idx, &p) in prio.indexed_iter() {
        if p == f64::NEG_INFINITY {
            continue;
        }
        if best.is_none_or(|(_, b)| p > b) {
            best = Some((Position::from_index(idx), p));
        }
    }
    best.map(|(pos, _)| pos)
}

impl<E: Environment> Agent<E> {
    /// Run the first applicable strategy
    pub(crate) fn select_strategy(&mut self) -> Flow<Strategy> {
        for strategy in Strategy::iter() {
            let applied = match strategy {
                Strategy::Fight => self.hostile_visible() && self.fight_nearest()?,
                Strategy::Explore => self.explore()?,
                Strategy::Descend => self.descend()?,
                Strategy::Search => self.search_best()?,
            };
            if applied {
                tracing::debug!(%strategy, pos = %self.agent(), "strategy applied");
                return Ok(strategy);
            }
        }
        Err(BotError::NoStrategy { pos: self.agent() }.into())
    }

    fn fight_nearest(&mut self) -> Flow<bool> {
        let field = self.distances();
        let mut closest: Option<(Position, u32)> = None;
        for pos in self.hostiles() {
            if let Some(d) = field.distance(pos) {
                if closest.is_none_or(|(_, best)| d < best) {
                    closest = Some((pos, d));
                }
            }
        }
        let Some((target, _)) = closest else {
            return Ok(false);
        };

        let path = self.path_to(target, &field)?;
        match path.as_slice() {
            [_, next] => {
                self.fight(*next)?;
            }
            [_, next, ..] => self.move_to(*next)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn explore(&mut self) -> Flow<bool> {
        let agent = self.agent();
        for door in self.neighbors(agent, false) {
            if !self.shows(door, GlyphClass::DOOR_CLOSED) {
                continue;
            }
            if !self.open_door(door)? {
                while self.shows(door, GlyphClass::DOOR_CLOSED) {
                    self.kick(door)?;
                }
            }
            break;
        }

        let field = self.distances();
        let level = self.levels.get_or_create(self.obs.level_key());
        let edge = frontier(level, &self.obs, &field);
        let target = field
            .reachable()
            .filter(|(pos, _)| edge[pos.index()])
            .min_by_key(|&(_, d)| d);
        let Some((target, _)) = target else {
            return Ok(false);
        };

        let path = self.path_to(target, &field)?;
        self.walk(&path)?;
        Ok(true)
    }

    fn descend(&mut self) -> Flow<bool> {
        let Some(stairs) = self.level_mut().find_object(GlyphClass::STAIR_DOWN) else {
            return Ok(false);
        };
        let field = self.distances();
        if !field.is_reachable(stairs) {
            return Ok(false);
        }

        let path = self.path_to(stairs, &field)?;
        if self.walk(&path)? {
            self.direction(Heading::Down)?;
        }
        Ok(true)
    }

    fn search_best(&mut self) -> Flow<bool> {
        let field = self.distances();
        let prio = search_priorities(self.level_mut(), &field);
        let Some(target) = best_cell(&prio) else {
            return Ok(false);
        };

        let path = self.path_to(target, &field)?;
        if self.walk(&path)? {
            self.search()?;
        }
        Ok(true)
    }

    /// Follow `path` one checked move at a time; false if it stopped early
    /// because memory says the next cell is no longer walkable
    fn walk(&mut self, path: &[Position]) -> Flow<bool> {
        for &next in path.iter().skip(1) {
            if !self.level_mut().is_walkable(next) {
                tracing::debug!(%next, "path blocked, replanning");
                return Ok(false);
            }
            self.move_to(next)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::screen;
    use crate::level::LevelKey;

    fn learn(obs: &Observation) -> (Level, DistanceField) {
        let mut level = Level::new(LevelKey::new(0, 1));
        level.update(obs);
        let field = DistanceField::compute(&level, obs.agent());
        (level, field)
    }

    #[test]
    fn test_strategy_order() {
        let order: Vec<_> = Strategy::iter().collect();
        assert_eq!(
            order,
            vec![Strategy::Fight, Strategy::Explore, Strategy::Descend, Strategy::Search]
        );
    }

    #[test]
    fn test_frontier_marks_corridor_end() {
        let obs = screen(&[
            "------    ", //
            "|@...|    ", //
            "|..../##  ", //
            "------    ",
        ]);
        let (level, field) = learn(&obs);
        let edge = frontier(&level, &obs, &field);
        // Corridor tip borders unseen stone
        assert!(edge[(2, 7)]);
        // Room interior does not
        assert!(!edge[(1, 2)]);
        // Only the doorway and the corridor touch unseen stone
        let cells: Vec<_> = Position::all().filter(|p| edge[p.index()]).collect();
        assert_eq!(
            cells,
            vec![Position::new(2, 5), Position::new(2, 6), Position::new(2, 7)]
        );
    }

    #[test]
    fn test_frontier_marks_closed_door_neighbor() {
        let obs = screen(&[
            "-----", //
            "|@..+", //
            "|...|", //
            "-----",
        ]);
        let (level, field) = learn(&obs);
        let edge = frontier(&level, &obs, &field);
        assert!(edge[(1, 3)]);
        assert!(!edge[(2, 3)]);
    }

    #[test]
    fn test_search_priorities_unreachable_is_neg_infinity() {
        let obs = screen(&[
            "-----", //
            "|@..|", //
            "-----",
        ]);
        let (level, field) = learn(&obs);
        let prio = search_priorities(&level, &field);
        assert_eq!(prio[(0, 0)], f64::NEG_INFINITY);
        assert_eq!(prio[(1, 0)], f64::NEG_INFINITY);
        assert!(prio[(1, 1)].is_finite());
    }

    #[test]
    fn test_search_priorities_prefer_corners() {
        let obs = screen(&[
            "-----", //
            "|@..|", //
            "|...|", //
            "-----",
        ]);
        let (level, field) = learn(&obs);
        let prio = search_priorities(&level, &field);
        // Five walls around the corner, three around the middle of the row
        assert_eq!(prio[(1, 3)], -20.0 - 2.0 + 5.0 * 20.0);
        assert_eq!(prio[(1, 2)], -20.0 - 1.0 + 3.0 * 20.0);
        assert!(prio[(1, 3)] > prio[(1, 2)]);
    }

    #[test]
    fn test_search_priorities_penalize_repeats() {
        let obs = screen(&[
            "-----", //
            "|@..|", //
            "-----",
        ]);
        let (mut level, field) = learn(&obs);
        let before = search_priorities(&level, &field)[(1, 1)];
        level.record_search(Position::new(1, 1));
        level.record_search(Position::new(1, 1));
        let after = search_priorities(&level, &field)[(1, 1)];
        assert_eq!(before - after, 40.0);
    }

    #[test]
    fn test_best_cell_ties_go_first() {
        let mut prio = Array2::from_elem((ROWNO, COLNO), f64::NEG_INFINITY);
        assert_eq!(best_cell(&prio), None);
        prio[(3, 7)] = 1.0;
        prio[(2, 9)] = 1.0;
        prio[(5, 0)] = 0.5;
        assert_eq!(best_cell(&prio), Some(Position::new(2, 9)));
    }
}
