/// The dungeon as an arena of rooms laid out on a grid, linked by doors.

use std::collections::VecDeque;
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::{MAX_ENEMIES_PER_ROOM, ROOM_HEIGHT, ROOM_WIDTH, SPAWN_MARGIN};
use crate::entities::{BossTier, Enemy, Item, ItemKind, RoomKind};
use crate::geometry::{Direction, RoomLayout};

/// Index of a room in its graph's arena.
pub type RoomId = usize;

#[derive(Clone, Debug)]
pub struct Room {
    pub position: (usize, usize),
    pub kind: RoomKind,
    connections: [Option<RoomId>; 4],
    pub layout: RoomLayout,
    pub enemies: Vec<Enemy>,
    pub items: Vec<Item>,
    enemies_spawned: bool,
    items_spawned: bool,
}

impl Room {
    pub fn new(kind: RoomKind, position: (usize, usize)) -> Room {
        Room {
            position,
            kind,
            connections: [None; 4],
            layout: RoomLayout::new(ROOM_WIDTH, ROOM_HEIGHT),
            enemies: Vec::new(),
            items: Vec::new(),
            enemies_spawned: false,
            items_spawned: false,
        }
    }

    pub fn connection(&self, direction: Direction) -> Option<RoomId> {
        self.connections[direction.index()]
    }

    pub fn connections(&self) -> impl Iterator<Item = (Direction, RoomId)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(|d| self.connection(d).map(|id| (d, id)))
    }

    pub fn has_living_enemies(&self) -> bool {
        self.enemies.iter().any(|e| e.alive)
    }

    pub fn enemies_spawned(&self) -> bool {
        self.enemies_spawned
    }

    pub fn items_spawned(&self) -> bool {
        self.items_spawned
    }

    /// Populate the room with enemies, once.  Start and treasure rooms stay
    /// empty; the boss room gets a single large boss in the middle.
    pub fn spawn_enemies(&mut self, rng: &mut impl Rng) {
        if self.enemies_spawned || matches!(self.kind, RoomKind::Start | RoomKind::Treasure) {
            return;
        }
        self.enemies_spawned = true;

        if self.kind == RoomKind::Boss {
            let (cx, cy) = self.layout.center();
            self.enemies.push(Enemy::boss(BossTier::Large, cx, cy, rng));
            return;
        }

        let count = rng.gen_range(1..=MAX_ENEMIES_PER_ROOM);
        for _ in 0..count {
            let (x, y) = self.spawn_point(rng);
            let enemy = if rng.gen_bool(0.5) {
                Enemy::walker(x, y)
            } else {
                Enemy::shooter(x, y)
            };
            self.enemies.push(enemy);
        }
    }

    /// Drop the treasure, once.  Only treasure rooms hold any.
    pub fn spawn_items(&mut self, rng: &mut impl Rng) {
        if self.items_spawned {
            return;
        }
        self.items_spawned = true;

        if self.kind == RoomKind::Treasure {
            let (x, y) = self.spawn_point(rng);
            if let Some(kind) = ItemKind::TREASURE.choose(rng) {
                self.items.push(Item::new(*kind, x, y));
            }
        }
    }

    fn spawn_point(&self, rng: &mut impl Rng) -> (i32, i32) {
        (
            rng.gen_range(SPAWN_MARGIN..=self.layout.width - SPAWN_MARGIN),
            rng.gen_range(SPAWN_MARGIN..=self.layout.height - SPAWN_MARGIN),
        )
    }
}

// ── Graph ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct RoomGraph {
    width: usize,
    height: usize,
    cells: Vec<Option<RoomId>>,
    rooms: Vec<Room>,
    start: Option<RoomId>,
    main_path: Vec<(usize, usize)>,
}

impl RoomGraph {
    pub fn new(width: usize, height: usize) -> RoomGraph {
        RoomGraph {
            width,
            height,
            cells: vec![None; width * height],
            rooms: Vec::new(),
            start: None,
            main_path: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Room occupying cell `(x, y)`, if any.
    pub fn at(&self, x: usize, y: usize) -> Option<RoomId> {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            None
        }
    }

    pub fn room(&self, id: RoomId) -> &Room {
        &self.rooms[id]
    }

    pub fn room_mut(&mut self, id: RoomId) -> &mut Room {
        &mut self.rooms[id]
    }

    /// Rooms currently placed on the grid, in row-major cell order.
    pub fn rooms(&self) -> impl Iterator<Item = (RoomId, &Room)> + '_ {
        self.cells
            .iter()
            .filter_map(|cell| *cell)
            .map(move |id| (id, &self.rooms[id]))
    }

    pub fn room_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn start(&self) -> Option<RoomId> {
        self.start
    }

    pub fn main_path(&self) -> &[(usize, usize)] {
        &self.main_path
    }

    pub(crate) fn set_main_path(&mut self, path: Vec<(usize, usize)>) {
        self.main_path = path;
    }

    pub fn count_kind(&self, kind: RoomKind) -> usize {
        self.rooms().filter(|(_, r)| r.kind == kind).count()
    }

    pub fn find_kind(&self, kind: RoomKind) -> Option<RoomId> {
        self.rooms().find(|(_, r)| r.kind == kind).map(|(id, _)| id)
    }

    /// Put a fresh room of `kind` on cell `(x, y)`.  A room already on that
    /// cell is discarded: its arena slot is reused and it loses its
    /// connections, enemies and items.  Rooms that linked to the old room now
    /// link to the new one.
    pub fn place(&mut self, x: usize, y: usize, kind: RoomKind) -> RoomId {
        let room = Room::new(kind, (x, y));
        let idx = y * self.width + x;
        let id = match self.cells[idx] {
            Some(id) => {
                self.rooms[id] = room;
                id
            }
            None => {
                self.rooms.push(room);
                let id = self.rooms.len() - 1;
                self.cells[idx] = Some(id);
                id
            }
        };
        if kind == RoomKind::Start {
            self.start = Some(id);
        }
        id
    }

    /// Link `from` to `to` through `direction` and back through the opposite
    /// side, adding doors to both rooms.
    pub fn connect(&mut self, from: RoomId, direction: Direction, to: RoomId) {
        let back = direction.opposite();
        let a = &mut self.rooms[from];
        a.connections[direction.index()] = Some(to);
        a.layout.add_door(direction);
        let b = &mut self.rooms[to];
        b.connections[back.index()] = Some(from);
        b.layout.add_door(back);
    }

    /// Rooms reachable from `from` by following connections.
    pub fn reachable_from(&self, from: RoomId) -> Vec<bool> {
        let mut seen = vec![false; self.rooms.len()];
        let mut queue = VecDeque::from([from]);
        seen[from] = true;
        while let Some(id) = queue.pop_front() {
            for (_, next) in self.rooms[id].connections() {
                if !seen[next] {
                    seen[next] = true;
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    /// Whether every connection has a matching one coming back.
    pub fn is_symmetric(&self) -> bool {
        self.rooms().all(|(id, room)| {
            room.connections()
                .all(|(dir, other)| self.rooms[other].connection(dir.opposite()) == Some(id))
        })
    }
}

/// Text map: `S` start, `B` boss, `T` treasure, `#` normal, `.` empty.
impl fmt::Display for RoomGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            let row: Vec<&str> = (0..self.width)
                .map(|x| match self.at(x, y).map(|id| self.rooms[id].kind) {
                    Some(RoomKind::Start) => "S",
                    Some(RoomKind::Boss) => "B",
                    Some(RoomKind::Treasure) => "T",
                    Some(RoomKind::Normal) => "#",
                    None => ".",
                })
                .collect();
            writeln!(f, "{}", row.join(" "))?;
        }
        Ok(())
    }
}
