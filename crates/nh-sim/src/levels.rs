//! Built-in three-level dungeon
//!
//! 1. Two rooms joined by a corridor behind a closed door, a jackal waiting
//!    in the second room.
//! 2. A locked door that has to be kicked in, and a bear trap on the way.
//! 3. A closet whose only exit is a hidden door.

use crate::map::{LevelMap, MapError};

const LEVEL_1: &[&str] = &[
    "",
    "  ------------",
    "  |..........|                  ----------",
    "  |..@.......+##########        |........|",
    "  |..........|         #########'........|",
    "  |....<.....|                  |.....>..|",
    "  ------------                  |....d...|",
    "                                ----------",
];

const LEVEL_2: &[&str] = &[
    "",
    "   --------                 -------",
    "   |......|                 |.....|",
    "   |.<..^.L#################'..>..|",
    "   |......|                 |.....|",
    "   --------                 -------",
];

const LEVEL_3: &[&str] = &[
    "",
    "   -----",
    "   |<..H########",
    "   -----       #",
    "          -----'-----",
    "          |.........|",
    "          |...>.....|",
    "          -----------",
];

pub fn builtin() -> Result<Vec<LevelMap>, MapError> {
    [LEVEL_1, LEVEL_2, LEVEL_3]
        .iter()
        .enumerate()
        .map(|(i, rows)| LevelMap::from_rows(rows, i))
        .collect()
}
