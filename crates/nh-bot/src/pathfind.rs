//! Shortest-hop distances and path reconstruction
//!
//! Distances are breadth-first over the movement-legality relation: the agent
//! may step between two walkable cells orthogonally, and diagonally only when
//! neither cell is remembered as a door.

use std::collections::VecDeque;

use ndarray::Array2;

use crate::error::BotError;
use crate::glyph::GlyphClass;
use crate::level::Level;
use crate::position::Position;
use crate::rng::BotRng;
use crate::{COLNO, ROWNO};

/// In-bounds neighbours of `pos`, in fixed order (rows outer, columns inner)
pub fn neighbors(pos: Position, diagonal: bool) -> Vec<Position> {
    let mut out = Vec::with_capacity(8);
    for dr in -1..=1i8 {
        for dc in -1..=1i8 {
            if dr == 0 && dc == 0 {
                continue;
            }
            if !diagonal && dr != 0 && dc != 0 {
                continue;
            }
            let next = pos.offset(dr, dc);
            if next.in_bounds() {
                out.push(next);
            }
        }
    }
    out
}

/// Neighbours of `pos`, shuffled when an RNG is given
pub fn neighbors_with(pos: Position, diagonal: bool, rng: Option<&mut BotRng>) -> Vec<Position> {
    let mut out = neighbors(pos, diagonal);
    if let Some(rng) = rng {
        rng.shuffle(&mut out);
    }
    out
}

/// Check whether the agent may step from `from` to `to` in one move
pub fn can_step(level: &Level, from: Position, to: Position) -> bool {
    if !from.is_adjacent(&to) || !level.is_walkable(from) || !level.is_walkable(to) {
        return false;
    }
    if from.is_orthogonal_to(&to) {
        return true;
    }
    !level.object_class(from).intersects(GlyphClass::DOORS)
        && !level.object_class(to).intersects(GlyphClass::DOORS)
}

/// Hop counts from one source cell; `-1` marks unreachable cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceField {
    source: Position,
    dist: Array2<i32>,
}

impl DistanceField {
    /// Breadth-first expansion from `source`
    pub fn compute(level: &Level, source: Position) -> Self {
        let mut dist = Array2::from_elem((ROWNO, COLNO), -1);
        let mut frontier = VecDeque::with_capacity(ROWNO * COLNO);
        dist[source.index()] = 0;
        frontier.push_back(source);

        while let Some(cur) = frontier.pop_front() {
            let d = dist[cur.index()];
            for next in neighbors(cur, true) {
                if dist[next.index()] == -1 && can_step(level, cur, next) {
                    dist[next.index()] = d + 1;
                    frontier.push_back(next);
                }
            }
        }

        Self { source, dist }
    }

    pub fn source(&self) -> Position {
        self.source
    }

    /// Raw distance, `-1` if unreachable
    pub fn get(&self, pos: Position) -> i32 {
        self.dist[pos.index()]
    }

    /// Distance if reachable
    pub fn distance(&self, pos: Position) -> Option<u32> {
        u32::try_from(self.get(pos)).ok()
    }

    pub fn is_reachable(&self, pos: Position) -> bool {
        self.get(pos) >= 0
    }

    /// Reachable cells and their distances, in row-major order
    pub fn reachable(&self) -> impl Iterator<Item = (Position, u32)> + '_ {
        Position::all().filter_map(|pos| self.distance(pos).map(|d| (pos, d)))
    }
}

/// Cells from `from` to `to`, both inclusive.
///
/// Walks back from the destination, each time to the first neighbour (in
/// enumeration order) that is closer to the source and legally connected.
/// An unreachable destination is an invariant violation.
pub fn find_path(
    level: &Level,
    from: Position,
    to: Position,
    field: Option<&DistanceField>,
    mut rng: Option<&mut BotRng>,
) -> Result<Vec<Position>, BotError> {
    if from == to {
        return Ok(vec![to]);
    }

    let computed;
    let field = match field {
        Some(field) if field.source() != from => {
            return Err(BotError::ForeignDistanceField {
                field_source: field.source(),
                from,
            });
        }
        Some(field) => field,
        None => {
            computed = DistanceField::compute(level, from);
            &computed
        }
    };

    if !field.is_reachable(to) {
        return Err(BotError::Unreachable { from, to });
    }

    let mut cur = to;
    let mut rev = vec![cur];
    while cur != from {
        let d = field.get(cur);
        let prev = neighbors_with(cur, true, rng.as_deref_mut())
            .into_iter()
            .find(|&p| {
                let pd = field.get(p);
                pd >= 0 && pd < d && can_step(level, p, cur)
            })
            .ok_or(BotError::Unreachable { from, to })?;
        rev.push(prev);
        cur = prev;
    }

    rev.reverse();
    Ok(rev)
}
