/// Tunables for the whole game, grouped by concern.
///
/// Distances are in room pixels; the terminal front end scales rooms down to
/// whatever cell grid it has available.

// ── Rooms ─────────────────────────────────────────────────────────────────────

pub const ROOM_WIDTH: i32 = 800;
pub const ROOM_HEIGHT: i32 = 600;
pub const WALL_THICKNESS: i32 = 50;
pub const DOOR_SIZE: i32 = 60;
/// Gap between a door rectangle and the outer room edge.
pub const DOOR_INSET: i32 = 1;

/// Enemies and treasure never spawn closer than this to the room edge.
pub const SPAWN_MARGIN: i32 = 100;

// ── Timing ────────────────────────────────────────────────────────────────────

/// Milliseconds of game time covered by one simulation tick (240 Hz).
pub const TICK_MS: u64 = 4;
/// Reference frame length that per-tick speeds are expressed against.
pub const SPEED_REFERENCE_MS: f32 = 16.0;
/// Simulation ticks advanced per rendered frame (~30 FPS rendering).
pub const TICKS_PER_FRAME: u32 = 8;

// ── Player ────────────────────────────────────────────────────────────────────

pub const PLAYER_SIZE: i32 = 50;
pub const PLAYER_HP: i32 = 8;
pub const PLAYER_SPEED: f32 = 1.0;
pub const PLAYER_DAMAGE: i32 = 1;
/// Ticks before the very first shot is allowed.
pub const PLAYER_SHOOTING_COOLDOWN: u32 = 5;
/// Ticks between consecutive shots.
pub const PLAYER_SHOOT_DELAY: u32 = 90;
pub const PLAYER_INVINCIBILITY_MS: u64 = 500;
/// Movement stays locked this long after walking through a door.
pub const ROOM_ENTRY_LOCK_MS: u64 = 250;

// ── Projectiles ───────────────────────────────────────────────────────────────

pub const PROJECTILE_SIZE: i32 = 20;
pub const PROJECTILE_SPEED: f32 = 2.0;
pub const PROJECTILE_LIFETIME: u32 = 200;

// ── Enemies ───────────────────────────────────────────────────────────────────

pub const ENEMY_SIZE: i32 = 50;
/// Hit points lost when any enemy touches the player.
pub const CONTACT_DAMAGE: i32 = 1;

pub const WALKER_HP: i32 = 6;
pub const WALKER_SPEED: f32 = 1.1;
pub const WALKER_FRAMES: u8 = 12;
pub const WALKER_FRAME_MS: f32 = 100.0;

pub const SHOOTER_HP: i32 = 4;
pub const SHOOTER_SPEED: f32 = 0.0;
pub const SHOOTER_INTERVAL_MS: u64 = 1200;
pub const SHOOTER_FRAMES: u8 = 4;
pub const SHOOTER_FRAME_MS: f32 = 125.0;
/// How many ticks ahead a shooter leads its target when it knows the velocity.
pub const SHOOTER_LEAD_TICKS: f32 = 10.0;

pub const MAX_ENEMIES_PER_ROOM: u32 = 4;

// ── Boss ──────────────────────────────────────────────────────────────────────

pub const BOSS_BASE_SIZE: i32 = 150;
pub const BOSS_ACCELERATION: f32 = 0.1;
pub const BOSS_BOUNCE_FORCE: f32 = 1.2;
pub const BOSS_BOUNCE_COOLDOWN: u32 = 10;
pub const BOSS_BOUNCE_PROBE: i32 = 5;
pub const BOSS_WANDER_CHANCE: f64 = 0.3;
pub const BOSS_WANDER_JITTER: f32 = 0.5;
pub const BOSS_ROOM_MARGIN: i32 = 20;
pub const BOSS_SPLIT_SCATTER: i32 = 30;
/// Hitbox edge as a fraction of the sprite edge.
pub const BOSS_HITBOX_SCALE: f32 = 0.8;

// ── Level generation ──────────────────────────────────────────────────────────

pub const MIN_GRID_SIZE: usize = 5;
pub const MAIN_PATH_LENGTH: usize = 4;
pub const PATH_NEIGHBOUR_CHANCE: f64 = 0.7;
pub const FILL_CHANCE: f64 = 0.4;

// ── Run settings ──────────────────────────────────────────────────────────────

/// Settings chosen per run, as opposed to the fixed tunables above.
#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub grid_width: usize,
    pub grid_height: usize,
    /// Dungeon seed; `None` draws one from system entropy.
    pub seed: Option<u64>,
    /// Screen size in room pixels, used to centre the current room.
    pub screen_width: i32,
    pub screen_height: i32,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            grid_width: 7,
            grid_height: 7,
            seed: None,
            screen_width: ROOM_WIDTH,
            screen_height: ROOM_HEIGHT,
        }
    }
}
