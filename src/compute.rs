/// Game-session logic: one fixed simulation tick at a time.
///
/// `tick` takes the current session, an input snapshot and an RNG handle and
/// advances everything by `TICK_MS`.  Randomness only comes through the
/// injected RNG, so a seeded RNG replays a run exactly.

use rand::Rng;
use tracing::info;

use crate::config::{GameConfig, ROOM_HEIGHT, ROOM_WIDTH, TICK_MS};
use crate::entities::{Cue, GameStatus, Player};
use crate::error::GameError;
use crate::generator::generate;
use crate::level::LevelRuntime;
use crate::player::InputSnapshot;

#[derive(Debug)]
pub struct GameSession {
    pub level: LevelRuntime,
    pub player: Player,
    pub status: GameStatus,
    /// Game clock in milliseconds; advances by `TICK_MS` per tick.
    pub now_ms: u64,
    /// Seconds taken to win, once the trophy is picked up.
    pub final_time: Option<u64>,
}

impl GameSession {
    pub fn elapsed_seconds(&self) -> u64 {
        self.now_ms / 1000
    }
}

// ── Constructors ─────────────────────────────────────────────────────────────

/// Generate a dungeon and drop the player in the middle of the start room.
pub fn init_session(config: &GameConfig, rng: &mut impl Rng) -> Result<GameSession, GameError> {
    let graph = generate(config.grid_width, config.grid_height, rng);
    let level = LevelRuntime::new(graph, (config.screen_width, config.screen_height))?;
    info!(
        seed = ?config.seed,
        rooms = level.graph().room_count(),
        "session started"
    );
    Ok(GameSession {
        level,
        player: Player::new(ROOM_WIDTH / 2, ROOM_HEIGHT / 2),
        status: GameStatus::Playing,
        now_ms: 0,
        final_time: None,
    })
}

// ── Per-tick update ──────────────────────────────────────────────────────────

/// Advance the session by one tick and return the sound cues it produced.
/// A finished session is left untouched.
pub fn tick(session: &mut GameSession, input: &InputSnapshot, rng: &mut impl Rng) -> Vec<Cue> {
    let mut cues = Vec::new();
    if session.status != GameStatus::Playing {
        return cues;
    }

    session.now_ms += TICK_MS;
    let now = session.now_ms;
    let GameSession { level, player, .. } = &mut *session;

    // ── 1. Movement and doors ────────────────────────────────────────────────
    player.handle_movement(input, level.layout());
    if let Some(direction) = level.check_door_collision(&player.rect()) {
        level.change_room(direction, player, now, &mut cues);
    }

    // ── 2. Shooting ──────────────────────────────────────────────────────────
    player.handle_shooting(input.aim, &mut cues);
    player.update_projectiles(level.layout(), &mut cues);
    level.check_projectile_collisions(player, rng);

    // ── 3. Pickups ───────────────────────────────────────────────────────────
    if let Some(effect) = level.check_item_collisions(player) {
        if effect.win {
            let seconds = now / 1000;
            info!(seconds, "run won");
            session.status = GameStatus::Won;
            session.final_time = Some(seconds);
            cues.push(Cue::Victory);
            return cues;
        }
    }

    // ── 4. Timers ────────────────────────────────────────────────────────────
    player.unlock_movement(now);
    player.update_invincibility(now);

    // ── 5. Room upkeep and enemies ───────────────────────────────────────────
    level.settle(&mut cues);
    level.update_enemies(player, now, TICK_MS as f32, rng, &mut cues);
    player.check_enemy_collisions(&mut level.current_room_mut().enemies, now, &mut cues);

    // ── 6. Status ────────────────────────────────────────────────────────────
    if player.dead {
        info!(seconds = now / 1000, "player died");
        session.status = GameStatus::Lost;
        cues.push(Cue::Defeat);
    }

    cues
}
