//! Level templates drawn in ASCII
//!
//! | Char | Terrain |
//! |------|---------|
//! | ` ` | solid rock |
//! | `\|` `-` | wall |
//! | `.` | floor |
//! | `#` | corridor |
//! | `+` | closed door |
//! | `L` | locked door |
//! | `'` | open door |
//! | `<` `>` | stairs |
//! | `@` | player start (floor) |
//! | `S` | hidden corridor |
//! | `H` | hidden door |
//! | `^` | bear trap (floor) |
//! | `a`-`z` | hostile monster (floor) |

use bitflags::bitflags;
use ndarray::Array2;
use thiserror::Error;

use nh_bot::consts::*;
use nh_bot::{Glyph, Position};

/// Separator line between levels in a multi-level map file
pub const LEVEL_SEPARATOR: &str = "===";

/// Glyph id of a discovered bear trap
pub const S_BEAR_TRAP: Glyph = 46;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("level {level}: unknown map character {ch:?} at {pos}")]
    BadChar { level: usize, pos: Position, ch: char },

    #[error("level {level}: map is {rows}x{cols}, larger than {}x{}", ROWNO, COLNO)]
    TooLarge { level: usize, rows: usize, cols: usize },

    #[error("level {level}: more than one '@'")]
    DuplicateStart { level: usize },

    #[error("level {level}: no '@' and no up stairs to arrive on")]
    NoArrival { level: usize },

    #[error("level {level}: empty map")]
    Empty { level: usize },

    #[error("map file has no levels")]
    NoLevels,
}

bitflags! {
    /// Door state flags
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct DoorState: u8 {
        const NO_DOOR = 0x00;
        const BROKEN = 0x01;
        const OPEN = 0x02;
        const CLOSED = 0x04;
        const LOCKED = 0x08;
    }
}

/// Terrain of one map cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Terrain {
    #[default]
    Stone,
    Wall {
        vertical: bool,
    },
    Floor,
    Corridor,
    /// `vertical` when the door sits in a vertical wall
    Door {
        state: DoorState,
        vertical: bool,
    },
    StairsUp,
    StairsDown,
    SecretDoor {
        vertical: bool,
    },
    SecretCorridor,
}

impl Terrain {
    /// Glyph shown for this terrain once seen
    pub fn glyph(self) -> Glyph {
        let sym = match self {
            Terrain::Stone | Terrain::SecretCorridor => S_STONE,
            Terrain::Wall { vertical } | Terrain::SecretDoor { vertical } => {
                if vertical {
                    S_VWALL
                } else {
                    S_HWALL
                }
            }
            Terrain::Floor => S_ROOM,
            Terrain::Corridor => S_CORR,
            Terrain::Door { state, vertical } => {
                if state.contains(DoorState::OPEN) {
                    if vertical { S_VODOOR } else { S_HODOOR }
                } else if state.intersects(DoorState::CLOSED | DoorState::LOCKED) {
                    if vertical { S_VCDOOR } else { S_HCDOOR }
                } else {
                    S_NDOOR
                }
            }
            Terrain::StairsUp => S_UPSTAIR,
            Terrain::StairsDown => S_DNSTAIR,
        };
        cmap_to_glyph(sym)
    }

    /// Can a creature stand here
    pub fn is_passable(self) -> bool {
        match self {
            Terrain::Floor | Terrain::Corridor | Terrain::StairsUp | Terrain::StairsDown => true,
            Terrain::Door { state, .. } => !state.intersects(DoorState::CLOSED | DoorState::LOCKED),
            _ => false,
        }
    }

    /// A door that still hangs in its frame; no diagonal moves through it
    pub fn is_intact_door(self) -> bool {
        matches!(self, Terrain::Door { state, .. }
            if state.intersects(DoorState::OPEN | DoorState::CLOSED | DoorState::LOCKED))
    }

    pub fn is_closed_door(self) -> bool {
        matches!(self, Terrain::Door { state, .. }
            if state.intersects(DoorState::CLOSED | DoorState::LOCKED))
    }

    /// Part of a lit room interior
    pub fn is_room(self) -> bool {
        matches!(self, Terrain::Floor | Terrain::StairsUp | Terrain::StairsDown)
    }
}

/// Displayed character for a map glyph
pub fn display_char(glyph: Glyph) -> u8 {
    match glyph - GLYPH_CMAP_OFF {
        S_VWALL | S_HODOOR => b'|',
        S_HWALL | S_VODOOR => b'-',
        S_ROOM | S_NDOOR | S_DARKROOM => b'.',
        S_CORR | S_LITCORR => b'#',
        S_VCDOOR | S_HCDOOR => b'+',
        S_UPSTAIR => b'<',
        S_DNSTAIR => b'>',
        S_BEAR_TRAP => b'^',
        _ => b' ',
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    pub terrain: Terrain,
    pub trap: bool,
    /// Trap has been triggered or found
    pub trap_seen: bool,
}

impl Cell {
    /// Glyph shown for this cell when seen, monsters aside
    pub fn glyph(&self) -> Glyph {
        if self.trap && self.trap_seen {
            cmap_to_glyph(S_BEAR_TRAP)
        } else {
            self.terrain.glyph()
        }
    }
}

/// One parsed level template
#[derive(Debug, Clone, PartialEq)]
pub struct LevelMap {
    pub cells: Array2<Cell>,
    /// Where the player appears when the game starts here
    pub start: Option<Position>,
    /// Monster letters and where they start
    pub monsters: Vec<(Position, u8)>,
}

impl LevelMap {
    /// Parse one level; `level` is only used in error messages
    pub fn parse(text: &str, level: usize) -> Result<Self, MapError> {
        let rows: Vec<&str> = text.lines().collect();
        Self::from_rows(&rows, level)
    }

    pub fn from_rows(rows: &[&str], level: usize) -> Result<Self, MapError> {
        if rows.iter().all(|row| row.trim().is_empty()) {
            return Err(MapError::Empty { level });
        }
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);
        if rows.len() > ROWNO || width > COLNO {
            return Err(MapError::TooLarge {
                level,
                rows: rows.len(),
                cols: width,
            });
        }

        let grid: Vec<Vec<char>> = rows.iter().map(|row| row.chars().collect()).collect();
        let at = |row: usize, col: isize| -> char {
            if col < 0 {
                return ' ';
            }
            grid.get(row).and_then(|r| r.get(col as usize)).copied().unwrap_or(' ')
        };

        let mut map = LevelMap {
            cells: Array2::from_elem((ROWNO, COLNO), Cell::default()),
            start: None,
            monsters: Vec::new(),
        };

        for (row, line) in grid.iter().enumerate() {
            for (col, &ch) in line.iter().enumerate() {
                let pos = Position::from_index((row, col));
                // Doors in a horizontal wall have wall on both sides
                let horizontal_wall = is_wall_char(at(row, col as isize - 1))
                    && is_wall_char(at(row, col as isize + 1));
                let vertical = !horizontal_wall;
                let cell = &mut map.cells[pos.index()];
                cell.terrain = match ch {
                    ' ' => Terrain::Stone,
                    '|' => Terrain::Wall { vertical: true },
                    '-' => Terrain::Wall { vertical: false },
                    '.' => Terrain::Floor,
                    '#' => Terrain::Corridor,
                    '+' => Terrain::Door {
                        state: DoorState::CLOSED,
                        vertical,
                    },
                    'L' => Terrain::Door {
                        state: DoorState::CLOSED | DoorState::LOCKED,
                        vertical,
                    },
                    '\'' => Terrain::Door {
                        state: DoorState::OPEN,
                        vertical,
                    },
                    '<' => Terrain::StairsUp,
                    '>' => Terrain::StairsDown,
                    'S' => Terrain::SecretCorridor,
                    'H' => Terrain::SecretDoor { vertical },
                    '^' => {
                        cell.trap = true;
                        Terrain::Floor
                    }
                    '@' => {
                        if map.start.replace(pos).is_some() {
                            return Err(MapError::DuplicateStart { level });
                        }
                        Terrain::Floor
                    }
                    'a'..='z' => {
                        map.monsters.push((pos, ch as u8));
                        Terrain::Floor
                    }
                    _ => return Err(MapError::BadChar { level, pos, ch }),
                };
            }
        }

        if map.arrival().is_none() {
            return Err(MapError::NoArrival { level });
        }
        Ok(map)
    }

    /// Parse levels separated by `===` lines
    pub fn parse_levels(text: &str) -> Result<Vec<LevelMap>, MapError> {
        let mut chunks: Vec<Vec<&str>> = vec![Vec::new()];
        for line in text.lines() {
            if line.trim() == LEVEL_SEPARATOR {
                chunks.push(Vec::new());
            } else if let Some(chunk) = chunks.last_mut() {
                chunk.push(line);
            }
        }
        // A trailing separator leaves an empty chunk behind
        if chunks.len() > 1 && chunks.last().is_some_and(|c| c.iter().all(|l| l.trim().is_empty())) {
            chunks.pop();
        }

        let levels = chunks
            .iter()
            .enumerate()
            .map(|(i, rows)| Self::from_rows(rows, i))
            .collect::<Result<Vec<_>, _>>()?;
        if levels.is_empty() {
            return Err(MapError::NoLevels);
        }
        Ok(levels)
    }

    /// Where the player arrives: the start marker, else the up stairs
    pub fn arrival(&self) -> Option<Position> {
        self.start.or_else(|| self.find(Terrain::StairsUp))
    }

    pub fn find(&self, terrain: Terrain) -> Option<Position> {
        Position::all().find(|&pos| self.cells[pos.index()].terrain == terrain)
    }
}

fn is_wall_char(ch: char) -> bool {
    matches!(ch, '-' | '|')
}
