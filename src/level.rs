/// The level at play time: which room the player is in, when they may
/// leave it, and what collides with what inside it.

use rand::Rng;
use tracing::{debug, info};

use crate::config::{DOOR_INSET, WALL_THICKNESS};
use crate::enemy::EnemyContext;
use crate::entities::{Cue, Effect, Enemy, Item, ItemKind, Player, RoomKind};
use crate::error::GameError;
use crate::geometry::{Direction, Rect, RoomLayout};
use crate::graph::{Room, RoomGraph, RoomId};

#[derive(Debug)]
pub struct LevelRuntime {
    graph: RoomGraph,
    current: RoomId,
    screen: (i32, i32),
    offset: (i32, i32),
    /// Whether the current room had living enemies at the last settle, so
    /// the doors can be heard opening.
    enemies_were_alive: bool,
}

impl LevelRuntime {
    /// Enter `graph` at its start room.  `screen` is the drawable area in
    /// room pixels, used to centre the current room.
    pub fn new(graph: RoomGraph, screen: (i32, i32)) -> Result<LevelRuntime, GameError> {
        let current = graph.start().ok_or(GameError::StartRoomMissing {
            width: graph.width(),
            height: graph.height(),
        })?;
        let enemies_were_alive = graph.room(current).has_living_enemies();
        let mut level = LevelRuntime {
            graph,
            current,
            screen,
            offset: (0, 0),
            enemies_were_alive,
        };
        level.calculate_offsets();
        Ok(level)
    }

    pub fn graph(&self) -> &RoomGraph {
        &self.graph
    }

    pub fn room_mut(&mut self, id: RoomId) -> &mut Room {
        self.graph.room_mut(id)
    }

    pub fn current_id(&self) -> RoomId {
        self.current
    }

    pub fn current_room(&self) -> &Room {
        self.graph.room(self.current)
    }

    pub fn current_room_mut(&mut self) -> &mut Room {
        self.graph.room_mut(self.current)
    }

    pub fn layout(&self) -> &RoomLayout {
        &self.current_room().layout
    }

    /// Top-left corner of the current room on screen.
    pub fn offset(&self) -> (i32, i32) {
        self.offset
    }

    pub fn set_screen(&mut self, screen: (i32, i32)) {
        self.screen = screen;
        self.calculate_offsets();
    }

    fn calculate_offsets(&mut self) {
        let layout = &self.graph.room(self.current).layout;
        self.offset = (
            (self.screen.0 - layout.width) / 2,
            (self.screen.1 - layout.height) / 2,
        );
    }

    pub fn check_collision(&self, rect: &Rect) -> bool {
        self.layout().check_collision(rect)
    }

    // ── Room transitions ─────────────────────────────────────────────────────

    /// Walk through the door on `direction`.  Refused, with nothing changed,
    /// while an enemy in the room is alive or when there is no door there.
    pub fn change_room(
        &mut self,
        direction: Direction,
        player: &mut Player,
        now_ms: u64,
        cues: &mut Vec<Cue>,
    ) -> bool {
        if self.current_room().has_living_enemies() {
            return false;
        }
        let Some(next) = self.current_room().connection(direction) else {
            return false;
        };

        self.current = next;
        self.calculate_offsets();

        let room = self.current_room();
        let hostile = room.has_living_enemies();
        if hostile {
            cues.push(Cue::DoorClose);
        }

        let entry = entry_rect(&room.layout, direction, player.rect());
        player.body.place(entry);
        player.lock_movement(now_ms);

        info!(
            ?direction,
            kind = ?room.kind,
            position = ?room.position,
            enemies = room.enemies.len(),
            "entered room"
        );
        self.enemies_were_alive = hostile;
        true
    }

    /// Door the player is pressing against, if the room is clear.
    pub fn check_door_collision(&self, player_rect: &Rect) -> Option<Direction> {
        let room = self.current_room();
        if room.has_living_enemies() {
            return None;
        }
        let probe = player_rect.inflate(2, 2);
        room.layout
            .doors()
            .iter()
            .find(|(_, door)| probe.intersects(door))
            .map(|(direction, _)| *direction)
    }

    // ── Combat & pickups ─────────────────────────────────────────────────────

    /// Resolve the player's shots against the room's enemies.  Each shot
    /// damages the first live enemy it overlaps and is used up; anything the
    /// hit spawns joins the room.
    pub fn check_projectile_collisions(&mut self, player: &mut Player, rng: &mut impl Rng) {
        let damage = player.damage;
        let enemies = &mut self.graph.room_mut(self.current).enemies;
        let mut spawned: Vec<Enemy> = Vec::new();

        player.projectiles.retain(|projectile| {
            let rect = projectile.rect();
            match enemies
                .iter_mut()
                .find(|e| e.alive && rect.intersects(&e.rect()))
            {
                Some(enemy) => {
                    spawned.extend(enemy.take_damage(damage, rng));
                    false
                }
                None => true,
            }
        });

        if !spawned.is_empty() {
            debug!(count = spawned.len(), "enemies spawned by split");
        }
        enemies.extend(spawned);
    }

    /// Pick up whatever the player is standing on.  A winning item ends the
    /// scan at once and is returned without applying anything; other items
    /// apply their effect and the scan continues.
    pub fn check_item_collisions(&mut self, player: &mut Player) -> Option<Effect> {
        let rect = player.rect();
        let items = &mut self.graph.room_mut(self.current).items;
        let mut i = 0;
        while i < items.len() {
            let Some(effect) = items[i].touch(&rect) else {
                i += 1;
                continue;
            };
            let item = items.remove(i);
            info!(kind = ?item.kind, "item collected");
            if effect.win {
                return Some(effect);
            }
            player.apply_effect(&effect);
        }
        None
    }

    /// Once the boss room is clear, make sure exactly one trophy is waiting
    /// in the middle of it.  Returns `true` when a trophy was placed.
    pub fn ensure_trophy(&mut self) -> bool {
        let room = self.current_room_mut();
        if room.kind != RoomKind::Boss || room.has_living_enemies() {
            return false;
        }
        if room.items.iter().any(|item| item.kind == ItemKind::Trophy) {
            return false;
        }
        let (cx, cy) = room.layout.center();
        room.items.push(Item::new(ItemKind::Trophy, cx, cy));
        info!("boss defeated, trophy placed");
        true
    }

    // ── Per-tick update ──────────────────────────────────────────────────────

    /// Update every enemy in the current room.  Other rooms stay frozen.
    pub fn update_enemies(
        &mut self,
        player: &Player,
        now_ms: u64,
        dt_ms: f32,
        rng: &mut impl Rng,
        cues: &mut Vec<Cue>,
    ) {
        let room = self.graph.room_mut(self.current);
        let ctx = EnemyContext {
            player: player.body.center(),
            player_velocity: Some(player.velocity),
            layout: &room.layout,
            now_ms,
            dt_ms,
        };
        for enemy in room.enemies.iter_mut() {
            enemy.update(&ctx, rng, cues);
        }
    }

    /// End-of-tick housekeeping: doors open once the last enemy falls, the
    /// boss room produces its trophy, and dead enemies are cleared out.
    pub fn settle(&mut self, cues: &mut Vec<Cue>) {
        let alive = self.current_room().has_living_enemies();
        if self.enemies_were_alive && !alive {
            cues.push(Cue::DoorOpen);
        }
        self.enemies_were_alive = alive;

        self.ensure_trophy();
        self.current_room_mut().enemies.retain(|e| e.alive);
    }
}

/// Where the player lands after walking `direction` into a room: just inside
/// the wall they came through, centred along it.
fn entry_rect(layout: &RoomLayout, direction: Direction, player: Rect) -> Rect {
    let bounds = layout.bounds();
    let inset = WALL_THICKNESS + 2 * DOOR_INSET;
    let (cx, cy) = bounds.center();
    let mut rect = player;
    match direction {
        Direction::Up => {
            rect.x = cx - rect.w / 2;
            rect.y = bounds.bottom() - inset - rect.h;
        }
        Direction::Down => {
            rect.x = cx - rect.w / 2;
            rect.y = bounds.top() + inset;
        }
        Direction::Left => {
            rect.x = bounds.right() - inset - rect.w;
            rect.y = cy - rect.h / 2;
        }
        Direction::Right => {
            rect.x = bounds.left() + inset;
            rect.y = cy - rect.h / 2;
        }
    }
    rect
}
