//! Game rules of the simulated dungeon
//!
//! One `World` is one episode. Time only advances on actions that take a
//! turn; monsters move after each such action.

use std::collections::VecDeque;

use ndarray::Array2;

use nh_bot::consts::*;
use nh_bot::pathfind::neighbors;
use nh_bot::{Action, BotRng, Direction, Glyph, Observation, Position};

use crate::map::{display_char, DoorState, LevelMap, Terrain};

/// Monster index used for the player's own glyph
pub const PLAYER_MON: Glyph = 328;
pub const PLAYER_HP: i64 = 16;
/// Hit points regained every this many turns
const REGEN_INTERVAL: i64 = 6;
/// Score for reaching a new deepest level, per level of depth
const DEPTH_POINTS: i64 = 50;
/// Score per kill, per level of depth
const KILL_POINTS: i64 = 4;

pub fn monster_name(letter: u8) -> &'static str {
    match letter {
        b'a' => "giant ant",
        b'd' => "jackal",
        b'f' => "kitten",
        b'k' => "kobold",
        b'n' => "water nymph",
        b'o' => "hill orc",
        b'r' => "sewer rat",
        b'x' => "grid bug",
        _ => "monster",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monster {
    pub pos: Position,
    pub letter: u8,
    pub hp: i64,
}

impl Monster {
    pub fn glyph(&self) -> Glyph {
        mon_to_glyph((self.letter - b'a') as Glyph)
    }

    pub fn name(&self) -> &'static str {
        monster_name(self.letter)
    }
}

/// Live state of one level, kept when the player leaves it
#[derive(Debug, Clone)]
pub struct Floor {
    pub map: LevelMap,
    /// Glyph the player remembers per cell
    pub memory: Array2<Glyph>,
    pub monsters: Vec<Monster>,
}

impl Floor {
    fn new(map: LevelMap, rng: &mut BotRng) -> Self {
        let monsters = map
            .monsters
            .iter()
            .map(|&(pos, letter)| Monster {
                pos,
                letter,
                hp: 2 + i64::from(rng.rnd(4)),
            })
            .collect();
        Self {
            map,
            memory: Array2::from_elem((ROWNO, COLNO), cmap_to_glyph(S_STONE)),
            monsters,
        }
    }

    pub fn terrain(&self, pos: Position) -> Terrain {
        self.map.cells[pos.index()].terrain
    }

    fn monster_at(&self, pos: Position) -> Option<usize> {
        self.monsters.iter().position(|m| m.pos == pos)
    }

    /// Movement legality shared by the player and monsters
    fn can_move(&self, from: Position, to: Position) -> bool {
        if !to.in_bounds() || !self.terrain(to).is_passable() {
            return false;
        }
        from.is_orthogonal_to(&to)
            || (!self.terrain(from).is_intact_door() && !self.terrain(to).is_intact_door())
    }
}

/// Input the game is waiting for besides a normal command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    None,
    KickDirection,
    ClimbOut,
}

/// One episode of the simulated game
#[derive(Debug, Clone)]
pub struct World {
    templates: Vec<LevelMap>,
    floors: Vec<Option<Floor>>,
    depth: usize,
    deepest: usize,
    pub pos: Position,
    pub hp: i64,
    pub max_hp: i64,
    /// Turns left stuck in a bear trap
    pub trapped: u32,
    pub time: i64,
    pub score: i64,
    rng: BotRng,
    pending: Pending,
    /// Messages of the last action not yet dismissed
    messages: VecDeque<String>,
    end_reason: Option<String>,
}

impl World {
    pub fn new(templates: Vec<LevelMap>, seed: u64) -> Self {
        let mut rng = BotRng::new(seed);
        let mut floors: Vec<Option<Floor>> = vec![None; templates.len()];
        let mut pos = Position::default();
        if let Some(first) = templates.first() {
            pos = first.arrival().unwrap_or_default();
            floors[0] = Some(Floor::new(first.clone(), &mut rng));
        }
        let mut world = Self {
            templates,
            floors,
            depth: 0,
            deepest: 0,
            pos,
            hp: PLAYER_HP,
            max_hp: PLAYER_HP,
            trapped: 0,
            time: 1,
            score: 0,
            rng,
            pending: Pending::None,
            messages: VecDeque::new(),
            end_reason: None,
        };
        world.remember();
        world
    }

    /// Current level, counted from 0
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_over(&self) -> bool {
        self.end_reason.is_some()
    }

    pub fn end_reason(&self) -> Option<&str> {
        self.end_reason.as_deref()
    }

    pub fn floor(&self) -> Option<&Floor> {
        self.floors.get(self.depth).and_then(Option::as_ref)
    }

    fn floor_mut(&mut self) -> Option<&mut Floor> {
        self.floors.get_mut(self.depth).and_then(Option::as_mut)
    }

    fn terrain(&self, pos: Position) -> Terrain {
        self.floor().map(|f| f.terrain(pos)).unwrap_or_default()
    }

    fn say(&mut self, msg: impl Into<String>) {
        self.messages.push_back(msg.into());
    }

    /// Play one keystroke
    pub fn act(&mut self, action: Action) {
        // A pending --More-- swallows everything but escape
        if self.messages.len() > 1 {
            if action == Action::Escape {
                self.messages.clear();
            }
            return;
        }
        self.messages.clear();

        let pending = std::mem::replace(&mut self.pending, Pending::None);
        let took_time = match (pending, action) {
            (Pending::KickDirection, Action::Move(dir)) => self.kick(dir),
            (Pending::ClimbOut, Action::Confirm) => {
                self.end_reason = Some("escaped the dungeon".to_string());
                false
            }
            (Pending::KickDirection | Pending::ClimbOut, _) => {
                self.say("Never mind.");
                false
            }
            (Pending::None, action) => self.command(action),
        };

        if took_time && !self.is_over() {
            self.end_turn();
        }
        self.remember();
    }

    fn command(&mut self, action: Action) -> bool {
        match action {
            Action::Move(dir) => self.walk(dir),
            // Unprompted 'y' is a move
            Action::Confirm => self.walk(Direction::NorthWest),
            Action::Kick => {
                self.pending = Pending::KickDirection;
                self.say("In what direction?");
                false
            }
            Action::Search => {
                self.search();
                true
            }
            Action::Down => self.descend(),
            Action::Up => self.climb(),
            Action::Escape => false,
        }
    }

    fn walk(&mut self, dir: Direction) -> bool {
        let (dr, dc) = dir.delta();
        let to = self.pos.offset(dr, dc);
        if !to.in_bounds() {
            return false;
        }

        if let Some(idx) = self.floor().and_then(|f| f.monster_at(to)) {
            let damage = 2 + i64::from(self.rng.rnd(5));
            self.attack(idx, damage);
            return true;
        }

        if self.trapped > 0 {
            self.trapped -= 1;
            self.say("You cannot pull your foot out of the bear trap.");
            return true;
        }

        let here = self.terrain(self.pos);
        let there = self.terrain(to);
        if dir.is_diagonal() && (here.is_intact_door() || there.is_intact_door()) {
            self.say("You can't move diagonally through an intact doorway.");
            return false;
        }

        if let Terrain::Door { state, vertical } = there {
            if state.contains(DoorState::LOCKED) {
                self.say("This door is locked.");
                return false;
            }
            if state.contains(DoorState::CLOSED) {
                if self.rng.rn2(3) != 0 {
                    self.set_terrain(to, Terrain::Door {
                        state: DoorState::OPEN,
                        vertical,
                    });
                    self.say("The door opens.");
                } else {
                    self.say("This door is stuck.");
                }
                return true;
            }
        }

        if !there.is_passable() {
            return false;
        }

        self.pos = to;
        self.spring_trap();
        true
    }

    fn spring_trap(&mut self) {
        let pos = self.pos;
        let sprung = self.floor_mut().is_some_and(|floor| {
            let cell = &mut floor.map.cells[pos.index()];
            cell.trap_seen |= cell.trap;
            cell.trap
        });
        if sprung {
            self.trapped = 4 + self.rng.rn2(4);
            self.say("A bear trap closes on your foot!");
        }
    }

    fn attack(&mut self, idx: usize, damage: i64) {
        let hit = self.rng.rn2(20) < 14;
        let depth = self.depth as i64;
        let Some(floor) = self.floor_mut() else {
            return;
        };
        let Some(monster) = floor.monsters.get_mut(idx) else {
            return;
        };
        let name = monster.name();
        let killed = if hit {
            monster.hp -= damage;
            monster.hp <= 0
        } else {
            false
        };
        if killed {
            floor.monsters.remove(idx);
        }

        if !hit {
            self.say(format!("You miss the {name}."));
        } else if killed {
            self.score += KILL_POINTS * (depth + 1);
            self.say(format!("You kill the {name}!"));
        } else {
            self.say(format!("You hit the {name}."));
        }
    }

    fn kick(&mut self, dir: Direction) -> bool {
        let (dr, dc) = dir.delta();
        let to = self.pos.offset(dr, dc);
        if !to.in_bounds() {
            self.say("You kick at empty space.");
            return true;
        }

        if let Some(idx) = self.floor().and_then(|f| f.monster_at(to)) {
            let damage = i64::from(self.rng.rnd(4));
            self.attack(idx, damage);
            return true;
        }

        match self.terrain(to) {
            Terrain::Door { state, vertical } if state.intersects(DoorState::CLOSED | DoorState::LOCKED) => {
                if self.rng.one_in(3) {
                    self.set_terrain(to, Terrain::Door {
                        state: DoorState::BROKEN,
                        vertical,
                    });
                    self.say("WHAMM!! The door crashes open!");
                } else {
                    self.say("WHAMM!!");
                }
            }
            Terrain::Wall { .. } | Terrain::SecretDoor { .. } | Terrain::Stone | Terrain::SecretCorridor => {
                self.say("Ouch! That hurts!");
            }
            _ => self.say("You kick at empty space."),
        }
        true
    }

    fn search(&mut self) {
        let pos = self.pos;
        for dr in -1..=1i8 {
            for dc in -1..=1i8 {
                let at = pos.offset(dr, dc);
                if (dr == 0 && dc == 0) || !at.in_bounds() {
                    continue;
                }
                match self.terrain(at) {
                    Terrain::SecretDoor { vertical } if self.rng.one_in(7) => {
                        self.set_terrain(at, Terrain::Door {
                            state: DoorState::CLOSED,
                            vertical,
                        });
                        self.say("You find a hidden door.");
                    }
                    Terrain::SecretCorridor if self.rng.one_in(7) => {
                        self.set_terrain(at, Terrain::Corridor);
                        self.say("You find a hidden passage.");
                    }
                    _ => {}
                }
            }
        }
    }

    fn descend(&mut self) -> bool {
        if self.terrain(self.pos) != Terrain::StairsDown {
            self.say("You can't go down here.");
            return false;
        }
        if self.trapped > 0 {
            self.trapped -= 1;
            self.say("You are caught in a bear trap.");
            return true;
        }

        let next = self.depth + 1;
        if next >= self.templates.len() {
            self.score += DEPTH_POINTS * next as i64;
            self.end_reason = Some("descended past the last level".to_string());
            return true;
        }
        self.change_level(next);
        true
    }

    fn climb(&mut self) -> bool {
        if self.terrain(self.pos) != Terrain::StairsUp {
            self.say("You can't go up here.");
            return false;
        }
        if self.depth == 0 {
            self.pending = Pending::ClimbOut;
            self.say("Beware, there will be no return! Still climb? [yn] (n)");
            return false;
        }
        self.change_level(self.depth - 1);
        true
    }

    fn change_level(&mut self, depth: usize) {
        let going_down = depth > self.depth;
        if self.floors[depth].is_none() {
            let floor = Floor::new(self.templates[depth].clone(), &mut self.rng);
            self.floors[depth] = Some(floor);
        }
        self.depth = depth;

        let Some(floor) = self.floor() else {
            return;
        };
        let arrival = if going_down {
            floor.map.find(Terrain::StairsUp).or(floor.map.start)
        } else {
            floor.map.find(Terrain::StairsDown)
        };
        self.pos = arrival.unwrap_or_default();
        self.trapped = 0;

        if depth > self.deepest {
            self.deepest = depth;
            self.score += DEPTH_POINTS * depth as i64;
        }
        tracing::debug!(depth = depth + 1, pos = %self.pos, "level change");
    }

    fn set_terrain(&mut self, pos: Position, terrain: Terrain) {
        if let Some(floor) = self.floor_mut() {
            floor.map.cells[pos.index()].terrain = terrain;
        }
    }

    /// Monsters act, then the clock advances
    fn end_turn(&mut self) {
        let visible = self.visible();
        let player = self.pos;
        let mut bites = Vec::new();

        if let Some(floor) = self.floors.get_mut(self.depth).and_then(Option::as_mut) {
            for i in 0..floor.monsters.len() {
                let here = floor.monsters[i].pos;
                if here.is_adjacent(&player) && floor.can_move(here, player) {
                    bites.push(i);
                    continue;
                }
                if !visible[here.index()] {
                    continue;
                }
                let step = neighbors(here, true)
                    .into_iter()
                    .filter(|&next| {
                        next != player
                            && floor.monster_at(next).is_none()
                            && floor.can_move(here, next)
                            && next.chebyshev(&player) < here.chebyshev(&player)
                    })
                    .min_by_key(|next| next.chebyshev(&player));
                if let Some(next) = step {
                    floor.monsters[i].pos = next;
                }
            }
        }

        for i in bites {
            let Some(name) = self.floor().map(|f| f.monsters[i].name()) else {
                continue;
            };
            if self.rng.rn2(3) == 0 {
                self.say(format!("The {name} misses."));
                continue;
            }
            self.hp -= i64::from(self.rng.rnd(2));
            self.say(format!("The {name} bites!"));
            if self.hp <= 0 {
                self.say("You die...");
                self.end_reason = Some(format!("killed by a {name}"));
                return;
            }
        }

        self.time += 1;
        if self.time % REGEN_INTERVAL == 0 && self.hp < self.max_hp {
            self.hp += 1;
        }
    }

    /// Cells the player can see: the lit room they are in, plus everything
    /// adjacent
    pub fn visible(&self) -> Array2<bool> {
        let mut vis = Array2::from_elem((ROWNO, COLNO), false);
        let Some(floor) = self.floor() else {
            return vis;
        };

        vis[self.pos.index()] = true;
        for n in neighbors(self.pos, true) {
            vis[n.index()] = true;
        }

        let mut queue = VecDeque::new();
        let mut lit = Array2::from_elem((ROWNO, COLNO), false);
        let here = floor.terrain(self.pos);
        if here.is_room() {
            queue.push_back(self.pos);
        } else if matches!(here, Terrain::Door { .. }) {
            queue.extend(
                neighbors(self.pos, false)
                    .into_iter()
                    .filter(|&n| floor.terrain(n).is_room()),
            );
        }
        for &pos in &queue {
            lit[pos.index()] = true;
        }

        while let Some(cur) = queue.pop_front() {
            vis[cur.index()] = true;
            for n in neighbors(cur, true) {
                vis[n.index()] = true;
                if !lit[n.index()] && floor.terrain(n).is_room() {
                    lit[n.index()] = true;
                    queue.push_back(n);
                }
            }
        }
        vis
    }

    /// Fold what is visible now into the player's memory
    fn remember(&mut self) {
        let visible = self.visible();
        if let Some(floor) = self.floor_mut() {
            for (idx, &seen) in visible.indexed_iter() {
                if seen {
                    floor.memory[idx] = floor.map.cells[idx].glyph();
                }
            }
        }
    }

    /// Message line and terminal text
    pub fn message(&self) -> (String, String) {
        let Some(first) = self.messages.front() else {
            return (String::new(), String::new());
        };
        if self.messages.len() > 1 {
            (first.clone(), format!("{first}--More--"))
        } else {
            (first.clone(), first.clone())
        }
    }

    /// Screen as the player sees it
    pub fn observe(&self) -> Observation {
        let mut obs = Observation::blank();
        let Some(floor) = self.floor() else {
            return obs;
        };

        for (idx, &glyph) in floor.memory.indexed_iter() {
            obs.glyphs[idx] = glyph;
            obs.chars[idx] = display_char(glyph);
        }
        let visible = self.visible();
        for monster in &floor.monsters {
            if visible[monster.pos.index()] {
                obs.glyphs[monster.pos.index()] = monster.glyph();
                obs.chars[monster.pos.index()] = monster.letter;
            }
        }
        obs.glyphs[self.pos.index()] = mon_to_glyph(PLAYER_MON);
        obs.chars[self.pos.index()] = AGENT_CHAR;

        let (message, tty) = self.message();
        obs.message = message;
        obs.tty = tty;

        let stats = &mut obs.stats;
        stats.x = i64::from(self.pos.col);
        stats.y = i64::from(self.pos.row);
        stats.strength = 16;
        stats.dexterity = 14;
        stats.constitution = 15;
        stats.intelligence = 10;
        stats.wisdom = 10;
        stats.charisma = 8;
        stats.score = self.score;
        stats.hitpoints = self.hp.max(0);
        stats.max_hitpoints = self.max_hp;
        stats.depth = self.depth as i64 + 1;
        stats.armor_class = 6;
        stats.experience_level = 1;
        stats.time = self.time;
        stats.hunger_state = 1;
        stats.dungeon_number = 0;
        stats.level_number = self.depth as i64 + 1;
        obs
    }
}
