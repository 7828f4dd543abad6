/// Player movement, shooting and damage.

use tracing::info;

use crate::config::{PLAYER_INVINCIBILITY_MS, PLAYER_SHOOT_DELAY, ROOM_ENTRY_LOCK_MS};
use crate::entities::{Cue, Effect, Enemy, Player, Projectile};
use crate::geometry::{Direction, RoomLayout};
use crate::projectile::update_projectiles;

/// Input for one tick, as a snapshot of what is held right now.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    /// -1 left, 0 none, 1 right.
    pub move_x: i8,
    /// -1 up, 0 none, 1 down.
    pub move_y: i8,
    pub aim: Option<Direction>,
}

impl InputSnapshot {
    /// Snapshot from held movement keys; opposite keys cancel out.
    pub fn from_keys(up: bool, down: bool, left: bool, right: bool, aim: Option<Direction>) -> Self {
        InputSnapshot {
            move_x: right as i8 - left as i8,
            move_y: down as i8 - up as i8,
            aim,
        }
    }
}

// ── Movement ──────────────────────────────────────────────────────────────────

impl Player {
    /// Move one tick's worth along each held axis.  Blocked moves snap the
    /// player flush against the wall ahead.
    pub fn handle_movement(&mut self, input: &InputSnapshot, layout: &RoomLayout) {
        let before = self.body.center();
        if !self.can_move {
            self.velocity = (0.0, 0.0);
            return;
        }

        let dx = input.move_x as f32 * self.speed;
        let dy = input.move_y as f32 * self.speed;
        if let Some(facing) = facing_for(input) {
            self.facing = facing;
        }

        if dx != 0.0 {
            if !layout.check_collision(&self.body.peek(dx, 0.0)) {
                self.body.shift(dx, 0.0);
            } else {
                let rect = self.body.rect;
                let ahead = layout.walls.iter().filter(|w| {
                    (dx > 0.0 && w.left() > rect.right()) || (dx < 0.0 && w.right() < rect.left())
                });
                let snapped = if dx > 0.0 {
                    ahead.map(|w| w.left()).min().map(|edge| edge - rect.w)
                } else {
                    ahead.map(|w| w.right()).max()
                };
                if let Some(x) = snapped {
                    self.body.rect.x = x;
                }
                self.body.clear_remainder_x();
            }
        }

        if dy != 0.0 {
            if !layout.check_collision(&self.body.peek(0.0, dy)) {
                self.body.shift(0.0, dy);
            } else {
                let rect = self.body.rect;
                let ahead = layout.walls.iter().filter(|w| {
                    (dy > 0.0 && w.top() > rect.bottom()) || (dy < 0.0 && w.bottom() < rect.top())
                });
                let snapped = if dy > 0.0 {
                    ahead.map(|w| w.top()).min().map(|edge| edge - rect.h)
                } else {
                    ahead.map(|w| w.bottom()).max()
                };
                if let Some(y) = snapped {
                    self.body.rect.y = y;
                }
                self.body.clear_remainder_y();
            }
        }

        let clamped = self.body.rect.clamp_within(&layout.bounds());
        if clamped != self.body.rect {
            self.body.place(clamped);
        }

        let after = self.body.center();
        self.velocity = ((after.0 - before.0) as f32, (after.1 - before.1) as f32);
    }

    /// Freeze movement; used right after walking through a door.
    pub fn lock_movement(&mut self, now_ms: u64) {
        self.can_move = false;
        self.locked_at = now_ms;
        self.velocity = (0.0, 0.0);
    }

    pub fn unlock_movement(&mut self, now_ms: u64) {
        if !self.can_move && now_ms.saturating_sub(self.locked_at) > ROOM_ENTRY_LOCK_MS {
            self.can_move = true;
        }
    }
}

fn facing_for(input: &InputSnapshot) -> Option<Direction> {
    match (input.move_x, input.move_y) {
        (x, _) if x < 0 => Some(Direction::Left),
        (x, _) if x > 0 => Some(Direction::Right),
        (_, y) if y < 0 => Some(Direction::Up),
        (_, y) if y > 0 => Some(Direction::Down),
        _ => None,
    }
}

// ── Shooting ──────────────────────────────────────────────────────────────────

impl Player {
    /// Fire toward `aim` when the gun is ready.
    pub fn handle_shooting(&mut self, aim: Option<Direction>, cues: &mut Vec<Cue>) {
        if aim.is_none() {
            self.shooting = None;
        }
        if self.shoot_cooldown > 0 {
            return;
        }
        let Some(direction) = aim else {
            return;
        };
        let (cx, cy) = self.body.center();
        self.projectiles.push(Projectile::cardinal(cx, cy, direction));
        self.shooting = Some(direction);
        self.shoot_cooldown = PLAYER_SHOOT_DELAY;
        cues.push(Cue::Shoot);
    }

    /// Move the player's shots and tick the gun cooldown.
    pub fn update_projectiles(&mut self, layout: &RoomLayout, cues: &mut Vec<Cue>) {
        update_projectiles(&mut self.projectiles, Some(layout), cues);
        self.shoot_cooldown = self.shoot_cooldown.saturating_sub(1);
    }
}

// ── Damage & pickups ──────────────────────────────────────────────────────────

impl Player {
    /// Lose `amount` hp unless invincible or already dead.  Surviving a hit
    /// opens a short invincibility window.
    pub fn take_damage(&mut self, amount: i32, now_ms: u64, cues: &mut Vec<Cue>) {
        if self.is_invincible() || self.dead {
            return;
        }
        cues.push(Cue::PlayerHurt);
        self.hp -= amount;
        info!(amount, hp = self.hp, "player took damage");
        if self.hp <= 0 {
            self.dead = true;
            self.death_time = Some(now_ms);
        } else {
            self.invincible_since = Some(now_ms);
        }
    }

    pub fn update_invincibility(&mut self, now_ms: u64) {
        if let Some(since) = self.invincible_since {
            if now_ms.saturating_sub(since) >= PLAYER_INVINCIBILITY_MS {
                self.invincible_since = None;
            }
        }
    }

    /// Take contact and projectile hits from the enemies of the current room.
    pub fn check_enemy_collisions(&mut self, enemies: &mut [Enemy], now_ms: u64, cues: &mut Vec<Cue>) {
        if self.is_invincible() {
            return;
        }
        let rect = self.rect();
        for enemy in enemies.iter_mut() {
            if enemy.check_hit_player(&rect) {
                self.take_damage(enemy.contact_damage(), now_ms, cues);
            }
        }
    }

    pub fn apply_effect(&mut self, effect: &Effect) {
        self.hp += effect.hp;
        self.speed += effect.speed;
        self.damage += effect.damage;
        if effect.upgrade {
            self.upgraded = true;
        }
    }
}
