/// Procedural dungeon layout.
///
/// A short random walk from the centre fixes the route to the boss; the
/// grid is then padded with side rooms, each linked into what already exists
/// so every room stays reachable from the start.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::config::{FILL_CHANCE, MAIN_PATH_LENGTH, MIN_GRID_SIZE, PATH_NEIGHBOUR_CHANCE};
use crate::entities::RoomKind;
use crate::geometry::Direction;
use crate::graph::{RoomGraph, RoomId};

/// Neighbour order used by every scan, so a seed always walks the same way.
const SCAN_ORDER: [Direction; 4] = [
    Direction::Down,
    Direction::Right,
    Direction::Up,
    Direction::Left,
];

pub struct LevelGenerator<'r, R: Rng> {
    graph: RoomGraph,
    rng: &'r mut R,
}

/// Build a dungeon on a `width` x `height` grid (each side at least 5).
pub fn generate(width: usize, height: usize, rng: &mut impl Rng) -> RoomGraph {
    LevelGenerator::new(width, height, rng).generate()
}

impl<'r, R: Rng> LevelGenerator<'r, R> {
    pub fn new(width: usize, height: usize, rng: &'r mut R) -> Self {
        let width = width.max(MIN_GRID_SIZE);
        let height = height.max(MIN_GRID_SIZE);
        LevelGenerator {
            graph: RoomGraph::new(width, height),
            rng,
        }
    }

    pub fn generate(mut self) -> RoomGraph {
        let start = (self.graph.width() / 2, self.graph.height() / 2);
        self.create_room(start.0, start.1, RoomKind::Start);

        let main_path = self.walk_main_path(start);

        if let Some(&(bx, by)) = main_path.last() {
            self.place_boss(bx, by);
        }
        self.add_treasure_room(&main_path);
        self.pad_main_path(&main_path);
        self.fill_remaining();

        self.graph.set_main_path(main_path);
        debug!(
            rooms = self.graph.room_count(),
            width = self.graph.width(),
            height = self.graph.height(),
            "level generated\n{}",
            self.graph
        );
        self.graph
    }

    fn create_room(&mut self, x: usize, y: usize, kind: RoomKind) -> RoomId {
        let id = self.graph.place(x, y, kind);
        self.graph.room_mut(id).spawn_enemies(&mut *self.rng);
        id
    }

    fn neighbour(&self, (x, y): (usize, usize), direction: Direction) -> Option<(usize, usize)> {
        let (dx, dy) = direction.offset();
        let (nx, ny) = (x as i32 + dx, y as i32 + dy);
        self.graph
            .in_bounds(nx, ny)
            .then_some((nx as usize, ny as usize))
    }

    fn room_at(&self, (x, y): (usize, usize)) -> Option<RoomId> {
        self.graph.at(x, y)
    }

    // ── Main path ────────────────────────────────────────────────────────────

    /// Random walk that never revisits a cell of the current path.  A dead
    /// end pops the tail; running out of path starts over.
    fn walk_main_path(&mut self, start: (usize, usize)) -> Vec<(usize, usize)> {
        let target = MAIN_PATH_LENGTH.min(self.graph.width() + self.graph.height() - 2);
        let mut path = vec![start];

        while path.len() < target {
            let Some(&current) = path.last() else {
                path.push(start);
                continue;
            };

            let candidates: Vec<(Direction, (usize, usize))> = SCAN_ORDER
                .iter()
                .filter_map(|&d| self.neighbour(current, d).map(|cell| (d, cell)))
                .filter(|(_, cell)| !path.contains(cell))
                .collect();

            let Some(&(direction, next)) = candidates.choose(&mut *self.rng) else {
                path.pop();
                if path.is_empty() {
                    debug!("main path walk exhausted, restarting");
                    path.push(start);
                }
                continue;
            };

            let next_id = match self.room_at(next) {
                Some(id) => id,
                None => self.create_room(next.0, next.1, RoomKind::Normal),
            };
            if let Some(current_id) = self.room_at(current) {
                self.graph.connect(current_id, direction, next_id);
            }
            path.push(next);
        }

        path
    }

    /// Replace the room at the end of the path with the boss room and link it
    /// to every room next to it.
    fn place_boss(&mut self, x: usize, y: usize) {
        let boss = self.create_room(x, y, RoomKind::Boss);
        for direction in Direction::ALL {
            if let Some(neighbour) = self.neighbour((x, y), direction).and_then(|c| self.room_at(c))
            {
                self.graph.connect(boss, direction, neighbour);
            }
        }
    }

    fn add_treasure_room(&mut self, main_path: &[(usize, usize)]) {
        if main_path.len() <= 2 {
            return;
        }
        let interior = &main_path[1..main_path.len() - 1];
        let Some(&(x, y)) = interior.choose(&mut *self.rng) else {
            return;
        };
        let Some(id) = self.graph.at(x, y) else {
            return;
        };
        let room = self.graph.room_mut(id);
        room.kind = RoomKind::Treasure;
        room.enemies.clear();
        room.spawn_items(&mut *self.rng);
    }

    // ── Densification ────────────────────────────────────────────────────────

    /// Sprout side rooms straight off the main path.
    fn pad_main_path(&mut self, main_path: &[(usize, usize)]) {
        for &cell in main_path {
            for direction in SCAN_ORDER {
                let Some(next) = self.neighbour(cell, direction) else {
                    continue;
                };
                if self.room_at(next).is_none() && self.rng.gen_bool(PATH_NEIGHBOUR_CHANCE) {
                    self.create_and_connect(next, cell);
                }
            }
        }
    }

    /// Sprinkle rooms over the rest of the grid, each hooked to its nearest
    /// room along an axis.
    fn fill_remaining(&mut self) {
        for y in 0..self.graph.height() {
            for x in 0..self.graph.width() {
                if self.graph.at(x, y).is_none() && self.rng.gen_bool(FILL_CHANCE) {
                    if let Some(anchor) = self.nearest_free_anchor((x, y)) {
                        self.create_and_connect((x, y), anchor);
                    }
                }
            }
        }
    }

    /// Closest room straight up, down, left or right of `cell` that still has
    /// a free door facing it.
    fn nearest_free_anchor(&self, cell: (usize, usize)) -> Option<(usize, usize)> {
        let reach = self.graph.width().max(self.graph.height()) as i32;
        for distance in 1..reach {
            for (dx, dy) in [(0, distance), (distance, 0), (0, -distance), (-distance, 0)] {
                let (nx, ny) = (cell.0 as i32 + dx, cell.1 as i32 + dy);
                if !self.graph.in_bounds(nx, ny) {
                    continue;
                }
                let anchor = (nx as usize, ny as usize);
                let Some(id) = self.room_at(anchor) else {
                    continue;
                };
                let facing = Direction::from_offset(-dx, -dy);
                if self.graph.room(id).connection(facing).is_none() {
                    return Some(anchor);
                }
            }
        }
        None
    }

    /// New normal room on `cell`, linked to the room on `anchor`.  Nothing
    /// is created when the anchor's door on that side is already taken.
    fn create_and_connect(&mut self, cell: (usize, usize), anchor: (usize, usize)) {
        let Some(anchor_id) = self.room_at(anchor) else {
            return;
        };
        let direction = Direction::from_offset(
            cell.0 as i32 - anchor.0 as i32,
            cell.1 as i32 - anchor.1 as i32,
        );
        if self.graph.room(anchor_id).connection(direction).is_some() {
            return;
        }
        let id = self.create_room(cell.0, cell.1, RoomKind::Normal);
        self.graph.connect(anchor_id, direction, id);
    }
}
