/// Enemy behaviour: homing walkers, turret-like shooters and the splitting
/// boss.

use std::f32::consts::TAU;

use rand::Rng;
use tracing::debug;

use crate::config::{
    BOSS_ACCELERATION, BOSS_BOUNCE_COOLDOWN, BOSS_BOUNCE_FORCE, BOSS_BOUNCE_PROBE,
    BOSS_HITBOX_SCALE, BOSS_ROOM_MARGIN, BOSS_SPLIT_SCATTER, BOSS_WANDER_CHANCE,
    BOSS_WANDER_JITTER, SHOOTER_FRAMES, SHOOTER_FRAME_MS, SHOOTER_HP, SHOOTER_INTERVAL_MS,
    SHOOTER_LEAD_TICKS, SHOOTER_SPEED, SPEED_REFERENCE_MS, WALKER_FRAMES, WALKER_FRAME_MS,
    CONTACT_DAMAGE, WALKER_HP, WALKER_SPEED,
};
use crate::entities::{
    enemy_body, Animation, BossState, BossTier, Cue, Enemy, EnemyKind, Projectile, ShooterState,
};
use crate::geometry::{heading, Body, Rect, RoomLayout};
use crate::projectile::update_projectiles;

/// Everything an enemy may look at while updating.
pub struct EnemyContext<'a> {
    /// Player centre.
    pub player: (i32, i32),
    /// Player movement over the last tick, if it is being tracked.
    pub player_velocity: Option<(f32, f32)>,
    pub layout: &'a RoomLayout,
    pub now_ms: u64,
    pub dt_ms: f32,
}

// ── Constructors ─────────────────────────────────────────────────────────────

impl Enemy {
    pub fn walker(x: i32, y: i32) -> Enemy {
        Enemy {
            body: enemy_body(x, y),
            hp: WALKER_HP,
            speed: WALKER_SPEED,
            alive: true,
            animation: Animation::new(WALKER_FRAMES, WALKER_FRAME_MS),
            kind: EnemyKind::Walker,
        }
    }

    pub fn shooter(x: i32, y: i32) -> Enemy {
        Enemy {
            body: enemy_body(x, y),
            hp: SHOOTER_HP,
            speed: SHOOTER_SPEED,
            alive: true,
            animation: Animation::new(SHOOTER_FRAMES, SHOOTER_FRAME_MS),
            kind: EnemyKind::Shooter(ShooterState {
                interval_ms: SHOOTER_INTERVAL_MS,
                last_shot_ms: 0,
                projectiles: Vec::new(),
                target: (x, y),
                target_velocity: None,
            }),
        }
    }

    /// Boss of the given tier centred on `(x, y)`, heading off diagonally.
    pub fn boss(tier: BossTier, x: i32, y: i32, rng: &mut impl Rng) -> Enemy {
        let size = tier.size();
        let hitbox_size = (size as f32 * BOSS_HITBOX_SCALE) as i32;
        let sign = |positive: bool| if positive { 1.0 } else { -1.0 };
        Enemy {
            body: Body::centered(x, y, size, size),
            hp: tier.max_hp(),
            speed: tier.speed(),
            alive: true,
            animation: Animation::new(1, 0.0),
            kind: EnemyKind::SplittingBoss(BossState {
                tier,
                max_hp: tier.max_hp(),
                consumed: Vec::new(),
                direction: (sign(rng.gen_bool(0.5)), sign(rng.gen_bool(0.5))),
                velocity: (0.0, 0.0),
                bounce_cooldown: 0,
                hitbox: Rect::from_center(x, y, hitbox_size, hitbox_size),
            }),
        }
    }
}

// ── Per-tick update ──────────────────────────────────────────────────────────

impl Enemy {
    pub fn update(&mut self, ctx: &EnemyContext, rng: &mut impl Rng, cues: &mut Vec<Cue>) {
        if !self.alive {
            return;
        }
        self.advance_animation(ctx.dt_ms);

        if let EnemyKind::SplittingBoss(_) = self.kind {
            self.update_boss(ctx, rng);
            return;
        }

        self.home_toward(ctx.player, ctx.dt_ms);

        let center = self.body.center();
        if let EnemyKind::Shooter(shooter) = &mut self.kind {
            shooter.target = ctx.player;
            shooter.target_velocity = ctx.player_velocity;
            if ctx.now_ms.saturating_sub(shooter.last_shot_ms) > shooter.interval_ms {
                shooter.last_shot_ms = ctx.now_ms;
                shooter.fire_from(center);
                cues.push(Cue::Shoot);
            }
            update_projectiles(&mut shooter.projectiles, Some(ctx.layout), cues);
        }
    }

    fn advance_animation(&mut self, dt_ms: f32) {
        let anim = &mut self.animation;
        if anim.frames <= 1 || anim.frame_ms <= 0.0 {
            return;
        }
        anim.timer_ms += dt_ms;
        while anim.timer_ms >= anim.frame_ms {
            anim.timer_ms -= anim.frame_ms;
            anim.frame = (anim.frame + 1) % anim.frames;
        }
    }

    /// Step straight at `target`; walls are ignored.
    fn home_toward(&mut self, target: (i32, i32), dt_ms: f32) {
        let (hx, hy) = heading(self.body.center_f32(), (target.0 as f32, target.1 as f32));
        let scale = self.speed * dt_ms / SPEED_REFERENCE_MS;
        self.body.shift(hx * scale, hy * scale);
    }

    fn update_boss(&mut self, ctx: &EnemyContext, rng: &mut impl Rng) {
        let EnemyKind::SplittingBoss(boss) = &mut self.kind else {
            return;
        };

        boss.velocity.0 += boss.direction.0 * BOSS_ACCELERATION;
        boss.velocity.1 += boss.direction.1 * BOSS_ACCELERATION;

        let max_speed = self.speed * ctx.dt_ms / SPEED_REFERENCE_MS;
        let speed = (boss.velocity.0 * boss.velocity.0 + boss.velocity.1 * boss.velocity.1).sqrt();
        if speed > max_speed {
            boss.velocity.0 = boss.velocity.0 / speed * max_speed;
            boss.velocity.1 = boss.velocity.1 / speed * max_speed;
        }

        self.body.shift(boss.velocity.0, boss.velocity.1);
        let (cx, cy) = self.body.center();
        boss.hitbox.set_center(cx, cy);

        if ctx.layout.check_collision(&boss.hitbox) {
            if boss.bounce_cooldown == 0 {
                bounce(boss, &self.body.rect, ctx.layout, rng);
                boss.bounce_cooldown = BOSS_BOUNCE_COOLDOWN;
            } else {
                boss.bounce_cooldown -= 1;
            }
        }

        keep_in_bounds(boss, &mut self.body, &ctx.layout.bounds());
    }
}

/// Reflect off whichever axes are blocked, then nudge the wander direction.
fn bounce(boss: &mut BossState, sprite: &Rect, layout: &RoomLayout, rng: &mut impl Rng) {
    let probe_x = sprite.offset((boss.direction.0 * BOSS_BOUNCE_PROBE as f32) as i32, 0);
    if layout.check_collision(&probe_x) {
        boss.direction.0 = -boss.direction.0;
        boss.velocity.0 *= -BOSS_BOUNCE_FORCE;
    }

    let probe_y = sprite.offset(0, (boss.direction.1 * BOSS_BOUNCE_PROBE as f32) as i32);
    if layout.check_collision(&probe_y) {
        boss.direction.1 = -boss.direction.1;
        boss.velocity.1 *= -BOSS_BOUNCE_FORCE;
    }

    if rng.gen_bool(BOSS_WANDER_CHANCE) {
        boss.direction.0 += rng.gen_range(-BOSS_WANDER_JITTER..BOSS_WANDER_JITTER);
        boss.direction.1 += rng.gen_range(-BOSS_WANDER_JITTER..BOSS_WANDER_JITTER);
    }

    let length = (boss.direction.0 * boss.direction.0 + boss.direction.1 * boss.direction.1).sqrt();
    if length > 0.0 {
        boss.direction.0 /= length;
        boss.direction.1 /= length;
    }
}

fn keep_in_bounds(boss: &mut BossState, body: &mut Body, room: &Rect) {
    let margin = BOSS_ROOM_MARGIN;
    let rect = &mut body.rect;

    if rect.left() < room.left() + margin {
        rect.x = room.left() + margin;
        boss.direction.0 = boss.direction.0.abs();
        boss.velocity.0 = boss.velocity.0.abs();
        body.clear_remainder_x();
    } else if rect.right() > room.right() - margin {
        rect.x = room.right() - margin - rect.w;
        boss.direction.0 = -boss.direction.0.abs();
        boss.velocity.0 = -boss.velocity.0.abs();
        body.clear_remainder_x();
    }

    let rect = &mut body.rect;
    if rect.top() < room.top() + margin {
        rect.y = room.top() + margin;
        boss.direction.1 = boss.direction.1.abs();
        boss.velocity.1 = boss.velocity.1.abs();
        body.clear_remainder_y();
    } else if rect.bottom() > room.bottom() - margin {
        rect.y = room.bottom() - margin - rect.h;
        boss.direction.1 = -boss.direction.1.abs();
        boss.velocity.1 = -boss.velocity.1.abs();
        body.clear_remainder_y();
    }

    let (cx, cy) = body.center();
    boss.hitbox.set_center(cx, cy);
}

impl ShooterState {
    /// Fire a homing shot from `origin` at the last known target, leading it
    /// when the target's velocity is known.
    fn fire_from(&mut self, origin: (i32, i32)) {
        let mut aim = (self.target.0 as f32, self.target.1 as f32);
        if let Some((vx, vy)) = self.target_velocity {
            aim.0 += vx * SHOOTER_LEAD_TICKS;
            aim.1 += vy * SHOOTER_LEAD_TICKS;
        }
        let (dx, dy) = heading((origin.0 as f32, origin.1 as f32), aim);
        self.projectiles
            .push(Projectile::homing(origin.0, origin.1, dx, dy));
    }
}

// ── Combat ───────────────────────────────────────────────────────────────────

impl Enemy {
    /// Apply `amount` damage.  Returns any enemies spawned as a result, which
    /// the caller must add to the room; only splitting bosses spawn anything.
    pub fn take_damage(&mut self, amount: i32, rng: &mut impl Rng) -> Vec<Enemy> {
        let center = self.body.center();
        let EnemyKind::SplittingBoss(boss) = &mut self.kind else {
            self.hp -= amount;
            if self.hp <= 0 {
                self.alive = false;
            }
            return Vec::new();
        };

        let old_fraction = self.hp as f32 / boss.max_hp as f32;
        self.hp -= amount;
        let new_fraction = self.hp as f32 / boss.max_hp as f32;

        let mut children = Vec::new();
        for &threshold in boss.tier.thresholds() {
            if old_fraction > threshold
                && threshold >= new_fraction
                && !boss.consumed.contains(&threshold)
            {
                children.extend(split(boss.tier, center, true, rng));
                boss.consumed.push(threshold);
            }
        }

        if self.hp <= 0 && self.alive {
            self.alive = false;
            if boss.tier.thresholds().is_empty() {
                return Vec::new();
            }
            debug!(tier = ?boss.tier, "boss destroyed, final split");
            return split(boss.tier, center, false, rng);
        }

        if !children.is_empty() {
            debug!(tier = ?boss.tier, hp = self.hp, spawned = children.len(), "boss split");
        }
        children
    }

    /// Whether this enemy hurts the player this tick.  A shooter only hurts
    /// through its projectiles, and the projectile that lands is consumed.
    pub fn check_hit_player(&mut self, player_rect: &Rect) -> bool {
        match &mut self.kind {
            EnemyKind::Walker => self.alive && self.body.rect.intersects(player_rect),
            EnemyKind::Shooter(shooter) => {
                match shooter
                    .projectiles
                    .iter()
                    .position(|p| p.rect().intersects(player_rect))
                {
                    Some(i) => {
                        shooter.projectiles.remove(i);
                        true
                    }
                    None => false,
                }
            }
            EnemyKind::SplittingBoss(boss) => self.alive && boss.hitbox.intersects(player_rect),
        }
    }

    /// Every touching enemy costs the player one hit point, whatever its size.
    pub fn contact_damage(&self) -> i32 {
        CONTACT_DAMAGE
    }
}

/// Spawn the children of a `tier` boss at `center`.  Mid-fight splits
/// scatter the children; the split on death stacks them on the spot.
fn split(tier: BossTier, center: (i32, i32), scatter: bool, rng: &mut impl Rng) -> Vec<Enemy> {
    let Some(child_tier) = tier.next() else {
        return Vec::new();
    };

    (0..tier.child_count())
        .map(|_| {
            let (ox, oy) = if scatter {
                (
                    rng.gen_range(-BOSS_SPLIT_SCATTER..=BOSS_SPLIT_SCATTER),
                    rng.gen_range(-BOSS_SPLIT_SCATTER..=BOSS_SPLIT_SCATTER),
                )
            } else {
                (0, 0)
            };
            let mut child = Enemy::boss(child_tier, center.0 + ox, center.1 + oy, rng);
            let angle = rng.gen_range(0.0..TAU);
            let direction = (angle.cos(), angle.sin());
            let speed = child.speed;
            if let EnemyKind::SplittingBoss(state) = &mut child.kind {
                state.direction = direction;
                state.velocity = (direction.0 * speed, direction.1 * speed);
            }
            child
        })
        .collect()
}
