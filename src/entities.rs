/// All game entity types, pure data.  Behaviour lives in `enemy`,
/// `projectile`, `player` and `level`.

use crate::config::{
    BOSS_BASE_SIZE, ENEMY_SIZE, PLAYER_DAMAGE, PLAYER_HP, PLAYER_SHOOTING_COOLDOWN, PLAYER_SIZE,
    PLAYER_SPEED,
};
use crate::geometry::{Body, Direction, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoomKind {
    Start,
    Normal,
    Treasure,
    Boss,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    Won,
    Lost,
}

/// Fire-and-forget sound signals for the audio collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    DoorOpen,
    DoorClose,
    /// A projectile splashed against a wall.
    Hit,
    Shoot,
    PlayerHurt,
    Victory,
    Defeat,
}

// ── Items ─────────────────────────────────────────────────────────────────────

pub const ITEM_SIZE: i32 = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    HealthUp,
    SpeedUp,
    DamageUp,
    /// Every stat up at once, plus the upgraded look.
    Upgrade,
    /// Appears once the boss room is cleared; picking it up wins the run.
    Trophy,
}

impl ItemKind {
    /// Kinds a treasure room can roll.
    pub const TREASURE: [ItemKind; 4] = [
        ItemKind::HealthUp,
        ItemKind::SpeedUp,
        ItemKind::DamageUp,
        ItemKind::Upgrade,
    ];
}

/// What picking up an item does to the player.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Effect {
    pub hp: i32,
    pub speed: f32,
    pub damage: i32,
    pub upgrade: bool,
    pub win: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub rect: Rect,
    pub kind: ItemKind,
    pub collected: bool,
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Heading {
    /// Player shots travel along one axis.
    Cardinal(Direction),
    /// Shooter shots follow a fixed unit vector toward their target.
    Vector(f32, f32),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub body: Body,
    pub heading: Heading,
    pub speed: f32,
    /// Ticks left before the projectile fizzles.
    pub lifetime: u32,
}

// ── Enemies ───────────────────────────────────────────────────────────────────

/// Sprite frame cycling, advanced by elapsed milliseconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Animation {
    pub frames: u8,
    pub frame: u8,
    pub frame_ms: f32,
    pub(crate) timer_ms: f32,
}

impl Animation {
    pub fn new(frames: u8, frame_ms: f32) -> Animation {
        Animation { frames, frame: 0, frame_ms, timer_ms: 0.0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BossTier {
    Large,
    Medium,
    Small,
}

impl BossTier {
    pub fn max_hp(self) -> i32 {
        match self {
            BossTier::Large => 20,
            BossTier::Medium => 10,
            BossTier::Small => 5,
        }
    }

    pub fn speed(self) -> f32 {
        match self {
            BossTier::Large => 2.5,
            BossTier::Medium => 3.5,
            BossTier::Small => 4.5,
        }
    }

    /// Sprite edge length in pixels.
    pub fn size(self) -> i32 {
        match self {
            BossTier::Large => BOSS_BASE_SIZE,
            BossTier::Medium => BOSS_BASE_SIZE * 3 / 4,
            BossTier::Small => BOSS_BASE_SIZE / 2,
        }
    }

    /// Health fractions at which this tier splits.
    pub fn thresholds(self) -> &'static [f32] {
        match self {
            BossTier::Large => &[0.5, 0.25],
            BossTier::Medium => &[0.5],
            BossTier::Small => &[],
        }
    }

    /// Children spawned per split.
    pub fn child_count(self) -> usize {
        match self {
            BossTier::Large => 2,
            BossTier::Medium | BossTier::Small => 3,
        }
    }

    pub fn next(self) -> Option<BossTier> {
        match self {
            BossTier::Large => Some(BossTier::Medium),
            BossTier::Medium => Some(BossTier::Small),
            BossTier::Small => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShooterState {
    pub interval_ms: u64,
    pub last_shot_ms: u64,
    pub projectiles: Vec<Projectile>,
    /// Where the player was last seen.
    pub target: (i32, i32),
    /// Player velocity in pixels per tick, when known, for leading shots.
    pub target_velocity: Option<(f32, f32)>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BossState {
    pub tier: BossTier,
    pub max_hp: i32,
    /// Thresholds this instance has already split at.
    pub consumed: Vec<f32>,
    /// Wander direction the boss accelerates along.
    pub direction: (f32, f32),
    pub velocity: (f32, f32),
    pub bounce_cooldown: u32,
    pub hitbox: Rect,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EnemyKind {
    Walker,
    Shooter(ShooterState),
    SplittingBoss(BossState),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub body: Body,
    pub hp: i32,
    pub speed: f32,
    pub alive: bool,
    pub animation: Animation,
    pub kind: EnemyKind,
}

impl Enemy {
    pub fn rect(&self) -> Rect {
        self.body.rect
    }

    pub fn boss_tier(&self) -> Option<BossTier> {
        match &self.kind {
            EnemyKind::SplittingBoss(boss) => Some(boss.tier),
            _ => None,
        }
    }
}

pub(crate) fn enemy_body(x: i32, y: i32) -> Body {
    Body::centered(x, y, ENEMY_SIZE, ENEMY_SIZE)
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub body: Body,
    pub hp: i32,
    pub speed: f32,
    pub damage: i32,
    pub upgraded: bool,
    pub projectiles: Vec<Projectile>,
    /// Ticks until the next shot is allowed.
    pub shoot_cooldown: u32,
    pub facing: Direction,
    /// Aim of the most recent shot, cleared when the trigger is released.
    pub shooting: Option<Direction>,
    /// Start of the current invincibility window.
    pub invincible_since: Option<u64>,
    pub can_move: bool,
    /// When movement was last locked by a room change.
    pub locked_at: u64,
    /// Movement applied on the last tick, in pixels.
    pub velocity: (f32, f32),
    pub dead: bool,
    pub death_time: Option<u64>,
}

impl Player {
    pub fn new(x: i32, y: i32) -> Player {
        Player {
            body: Body::centered(x, y, PLAYER_SIZE, PLAYER_SIZE),
            hp: PLAYER_HP,
            speed: PLAYER_SPEED,
            damage: PLAYER_DAMAGE,
            upgraded: false,
            projectiles: Vec::new(),
            shoot_cooldown: PLAYER_SHOOTING_COOLDOWN,
            facing: Direction::Up,
            shooting: None,
            invincible_since: None,
            can_move: true,
            locked_at: 0,
            velocity: (0.0, 0.0),
            dead: false,
            death_time: None,
        }
    }

    pub fn rect(&self) -> Rect {
        self.body.rect
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_since.is_some()
    }

    /// Where the player points: the aim while shooting, else the facing.
    pub fn heading(&self) -> Direction {
        self.shooting.unwrap_or(self.facing)
    }
}
