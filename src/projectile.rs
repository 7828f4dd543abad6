/// Projectile and item behaviour.

use crate::config::{PROJECTILE_LIFETIME, PROJECTILE_SIZE, PROJECTILE_SPEED};
use crate::entities::{Cue, Effect, Heading, Item, ItemKind, Projectile, ITEM_SIZE};
use crate::geometry::{Body, Direction, Rect, RoomLayout};

impl Projectile {
    /// Straight shot fired by the player from `(x, y)`.
    pub fn cardinal(x: i32, y: i32, direction: Direction) -> Projectile {
        Projectile {
            body: Body::centered(x, y, PROJECTILE_SIZE, PROJECTILE_SIZE),
            heading: Heading::Cardinal(direction),
            speed: PROJECTILE_SPEED,
            lifetime: PROJECTILE_LIFETIME,
        }
    }

    /// Shot along the unit vector `(dir_x, dir_y)`.
    pub fn homing(x: i32, y: i32, dir_x: f32, dir_y: f32) -> Projectile {
        Projectile {
            body: Body::centered(x, y, PROJECTILE_SIZE, PROJECTILE_SIZE),
            heading: Heading::Vector(dir_x, dir_y),
            speed: PROJECTILE_SPEED,
            lifetime: PROJECTILE_LIFETIME,
        }
    }

    pub fn rect(&self) -> Rect {
        self.body.rect
    }

    /// Advance one tick.  Returns `true` once the projectile is spent, either
    /// because its lifetime ran out or because it hit a wall.
    pub fn update(&mut self, layout: Option<&RoomLayout>, cues: &mut Vec<Cue>) -> bool {
        let (dx, dy) = match self.heading {
            Heading::Cardinal(direction) => {
                let (ox, oy) = direction.offset();
                (ox as f32 * self.speed, oy as f32 * self.speed)
            }
            Heading::Vector(x, y) => (x * self.speed, y * self.speed),
        };
        self.body.shift(dx, dy);

        if let Some(layout) = layout {
            if layout.check_collision(&self.body.rect) {
                cues.push(Cue::Hit);
                self.lifetime = 0;
            }
        }

        self.lifetime = self.lifetime.saturating_sub(1);
        self.lifetime == 0
    }
}

/// Advance every projectile in `projectiles`, dropping the spent ones.
pub fn update_projectiles(
    projectiles: &mut Vec<Projectile>,
    layout: Option<&RoomLayout>,
    cues: &mut Vec<Cue>,
) {
    projectiles.retain_mut(|p| !p.update(layout, cues));
}

// ── Items ─────────────────────────────────────────────────────────────────────

impl ItemKind {
    pub fn effect(self) -> Effect {
        match self {
            ItemKind::HealthUp => Effect { hp: 3, ..Effect::default() },
            ItemKind::SpeedUp => Effect { speed: 1.0, ..Effect::default() },
            ItemKind::DamageUp => Effect { damage: 1, ..Effect::default() },
            ItemKind::Upgrade => Effect {
                hp: 3,
                speed: 1.0,
                damage: 1,
                upgrade: true,
                win: false,
            },
            ItemKind::Trophy => Effect { win: true, ..Effect::default() },
        }
    }
}

impl Item {
    /// Item whose top-left corner is at `(x, y)`.
    pub fn new(kind: ItemKind, x: i32, y: i32) -> Item {
        Item {
            rect: Rect::new(x, y, ITEM_SIZE, ITEM_SIZE),
            kind,
            collected: false,
        }
    }

    /// Collect the item if the player touches it, returning its effect the
    /// first time only.
    pub fn touch(&mut self, player_rect: &Rect) -> Option<Effect> {
        if !self.collected && self.rect.intersects(player_rect) {
            self.collected = true;
            return Some(self.kind.effect());
        }
        None
    }
}
