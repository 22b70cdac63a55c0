//! Property tests for map parsing and the simulated rules

use nh_bot::{Action, Direction, Environment, Position};
use nh_sim::map::display_char;
use nh_sim::{levels, LevelMap, Simulator, World};
use proptest::prelude::*;

/// Characters whose terrain renders back as the same character
const PLAIN: &[char] = &[' ', '|', '-', '.', '#', '+', '<', '>'];

fn rows() -> impl Strategy<Value = (Vec<String>, usize, usize)> {
    (1..6usize, 1..12usize).prop_flat_map(|(height, width)| {
        (
            prop::collection::vec(
                prop::collection::vec(prop::sample::select(PLAIN), width),
                height,
            ),
            0..height,
            0..width,
        )
            .prop_map(|(grid, row, col)| {
                let rows = grid
                    .into_iter()
                    .enumerate()
                    .map(|(r, line)| {
                        line.into_iter()
                            .enumerate()
                            .map(|(c, ch)| if (r, c) == (row, col) { '@' } else { ch })
                            .collect()
                    })
                    .collect();
                (rows, row, col)
            })
    })
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        6 => prop::sample::select(vec![
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
            Direction::NorthEast,
            Direction::NorthWest,
            Direction::SouthEast,
            Direction::SouthWest,
        ])
        .prop_map(Action::Move),
        1 => Just(Action::Search),
        1 => Just(Action::Kick),
        1 => Just(Action::Escape),
        1 => Just(Action::Down),
    ]
}

proptest! {
    #[test]
    fn prop_parsed_map_renders_back((rows, row, col) in rows()) {
        let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
        let map = LevelMap::from_rows(&refs, 0).unwrap();
        prop_assert_eq!(map.start, Some(Position::new(row as i16, col as i16)));
        prop_assert!(map.monsters.is_empty());

        for (r, line) in rows.iter().enumerate() {
            for (c, ch) in line.chars().enumerate() {
                let shown = display_char(map.cells[(r, c)].glyph()) as char;
                let expected = if ch == '@' { '.' } else { ch };
                prop_assert_eq!(shown, expected, "cell ({}, {})", r, c);
            }
        }
    }

    #[test]
    fn prop_player_stays_on_passable_ground(
        seed in any::<u64>(),
        actions in prop::collection::vec(action(), 1..200),
    ) {
        let mut world = World::new(levels::builtin().unwrap(), seed);
        for action in actions {
            world.act(action);
            if world.is_over() {
                break;
            }
            let floor = world.floor().unwrap();
            prop_assert!(floor.terrain(world.pos).is_passable(), "{:?} at {}", action, world.pos);
            prop_assert!(world.hp > 0);
        }
    }

    #[test]
    fn prop_same_seed_same_game(
        seed in any::<u64>(),
        actions in prop::collection::vec(action(), 1..100),
    ) {
        let mut a = Simulator::builtin(seed).unwrap();
        let mut b = Simulator::builtin(seed).unwrap();
        prop_assert_eq!(a.reset().unwrap(), b.reset().unwrap());
        for action in actions {
            let (Ok(left), Ok(right)) = (a.step(action), b.step(action)) else {
                break;
            };
            prop_assert_eq!(left.observation, right.observation);
            prop_assert_eq!(left.reward, right.reward);
            if left.done {
                break;
            }
        }
    }
}
