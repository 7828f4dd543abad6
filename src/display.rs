/// Rendering layer; all terminal I/O lives here.
///
/// The current room is drawn scaled into the terminal: one cell covers
/// `px_col` x `px_row` room pixels.  No game logic is performed; this module
/// only translates the session into terminal commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};
use dungeon_crawler::compute::GameSession;
use dungeon_crawler::config::{ROOM_HEIGHT, ROOM_WIDTH};
use dungeon_crawler::entities::{
    BossTier, Enemy, EnemyKind, GameStatus, Item, ItemKind, Player, Projectile, RoomKind,
};
use dungeon_crawler::geometry::{Direction, Rect};
use dungeon_crawler::graph::RoomGraph;

use crate::assets::{AssetRegistry, Glyph, Sprite};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_HUD: Color = Color::Yellow;
const C_HUD_HP: Color = Color::Red;
const C_HINT: Color = Color::DarkGrey;
const C_MAP_ROOM: Color = Color::Grey;
const C_MAP_CURRENT: Color = Color::White;
const C_MAP_BOSS: Color = Color::DarkRed;
const C_MAP_TREASURE: Color = Color::Yellow;

/// Rows taken by the HUD above the room and the hint line below it.
const HUD_ROWS: u16 = 1;
const HINT_ROWS: u16 = 1;

// ── Viewport ──────────────────────────────────────────────────────────────────

/// Maps room pixels onto terminal cells.  Cells are about twice as tall as
/// they are wide, so a row covers twice the pixels of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
    px_col: i32,
    px_row: i32,
}

impl Viewport {
    /// Largest scale at which a whole room fits in a `cols` x `rows` terminal.
    pub fn fit(cols: u16, rows: u16) -> Viewport {
        let play_cols = cols.max(1) as i32;
        let play_rows = rows.saturating_sub(HUD_ROWS + HINT_ROWS).max(1) as i32;
        let by_width = div_ceil(ROOM_WIDTH, play_cols);
        let by_height = div_ceil(ROOM_HEIGHT, play_rows * 2);
        let px_col = by_width.max(by_height).max(1);
        Viewport { cols, rows, px_col, px_row: px_col * 2 }
    }

    /// Size of the play area in room pixels.
    pub fn screen_pixels(&self) -> (i32, i32) {
        let play_rows = self.rows.saturating_sub(HUD_ROWS + HINT_ROWS) as i32;
        (self.cols as i32 * self.px_col, play_rows * self.px_row)
    }

    fn last_play_row(&self) -> i32 {
        self.rows.saturating_sub(HINT_ROWS + 1) as i32
    }

    /// Cell span covered by `rect`, clipped to the play area.  Anything
    /// visible covers at least one cell.
    fn cells(&self, rect: &Rect, offset: (i32, i32)) -> Option<(i32, i32, i32, i32)> {
        let c0 = (rect.x + offset.0).div_euclid(self.px_col);
        let r0 = (rect.y + offset.1).div_euclid(self.px_row) + HUD_ROWS as i32;
        let c1 = ((rect.right() + offset.0 - 1).div_euclid(self.px_col)).max(c0);
        let r1 = ((rect.bottom() + offset.1 - 1).div_euclid(self.px_row) + HUD_ROWS as i32).max(r0);

        let c0 = c0.max(0);
        let r0 = r0.max(HUD_ROWS as i32);
        let c1 = c1.min(self.cols as i32 - 1);
        let r1 = r1.min(self.last_play_row());
        (c0 <= c1 && r0 <= r1).then_some((c0, r0, c1, r1))
    }
}

fn div_ceil(a: i32, b: i32) -> i32 {
    (a + b - 1) / b
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    session: &GameSession,
    assets: &AssetRegistry,
    view: &Viewport,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let offset = session.level.offset();
    let room = session.level.current_room();

    for wall in &room.layout.walls {
        fill(out, view, offset, wall, assets.glyph(Sprite::Wall))?;
    }
    let door = if room.has_living_enemies() { Sprite::DoorClosed } else { Sprite::DoorOpen };
    for (_, rect) in room.layout.doors() {
        fill(out, view, offset, rect, assets.glyph(door))?;
    }

    for item in &room.items {
        draw_item(out, view, offset, item, assets)?;
    }
    for enemy in room.enemies.iter().filter(|e| e.alive) {
        draw_enemy(out, view, offset, enemy, assets)?;
    }
    for shot in &session.player.projectiles {
        draw_projectile(out, view, offset, shot, assets.glyph(Sprite::PlayerShot))?;
    }
    draw_player(out, view, offset, &session.player, session.now_ms, assets)?;

    draw_hud(out, view, session, room.kind)?;
    draw_minimap(out, view, session.level.graph(), session.level.current_id())?;
    draw_controls_hint(out, view)?;

    match session.status {
        GameStatus::Playing => {}
        GameStatus::Won => draw_overlay(out, view, "V I C T O R Y", Color::Yellow, session)?,
        GameStatus::Lost => draw_overlay(out, view, "W A S T E D", Color::Red, session)?,
    }

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, view.rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

fn fill<W: Write>(
    out: &mut W,
    view: &Viewport,
    offset: (i32, i32),
    rect: &Rect,
    glyph: Glyph,
) -> std::io::Result<()> {
    let Some((c0, r0, c1, r1)) = view.cells(rect, offset) else {
        return Ok(());
    };
    let line: String = std::iter::repeat(glyph.symbol).take((c1 - c0 + 1) as usize).collect();
    out.queue(style::SetForegroundColor(glyph.color))?;
    for row in r0..=r1 {
        out.queue(cursor::MoveTo(c0 as u16, row as u16))?;
        out.queue(Print(&line))?;
    }
    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_player<W: Write>(
    out: &mut W,
    view: &Viewport,
    offset: (i32, i32),
    player: &Player,
    now_ms: u64,
    assets: &AssetRegistry,
) -> std::io::Result<()> {
    // Blink while invincible.
    if player.is_invincible() && (now_ms / 100) % 2 == 1 {
        return Ok(());
    }
    let sprite = if player.upgraded { Sprite::PlayerUpgraded } else { Sprite::Player };
    let glyph = assets.glyph(sprite);
    fill(out, view, offset, &player.rect(), glyph)?;

    let Some(span) = view.cells(&player.rect(), offset) else {
        return Ok(());
    };
    let (col, row, symbol) = aim_marker(span, player.heading());
    out.queue(cursor::MoveTo(col as u16, row as u16))?;
    out.queue(style::SetForegroundColor(glyph.color))?;
    out.queue(Print(symbol))?;
    Ok(())
}

/// Edge cell of the player's span that points along `heading`, and the
/// arrow drawn there.
fn aim_marker((c0, r0, c1, r1): (i32, i32, i32, i32), heading: Direction) -> (i32, i32, char) {
    let mid_c = (c0 + c1) / 2;
    let mid_r = (r0 + r1) / 2;
    match heading {
        Direction::Up => (mid_c, r0, '^'),
        Direction::Down => (mid_c, r1, 'v'),
        Direction::Left => (c0, mid_r, '<'),
        Direction::Right => (c1, mid_r, '>'),
    }
}

fn draw_enemy<W: Write>(
    out: &mut W,
    view: &Viewport,
    offset: (i32, i32),
    enemy: &Enemy,
    assets: &AssetRegistry,
) -> std::io::Result<()> {
    let sprite = match &enemy.kind {
        EnemyKind::Walker => Sprite::Walker,
        EnemyKind::Shooter(shooter) => {
            for shot in &shooter.projectiles {
                draw_projectile(out, view, offset, shot, assets.glyph(Sprite::EnemyShot))?;
            }
            Sprite::Shooter
        }
        EnemyKind::SplittingBoss(boss) => match boss.tier {
            BossTier::Large => Sprite::BossLarge,
            BossTier::Medium => Sprite::BossMedium,
            BossTier::Small => Sprite::BossSmall,
        },
    };
    fill(out, view, offset, &enemy.rect(), assets.glyph(sprite))
}

fn draw_projectile<W: Write>(
    out: &mut W,
    view: &Viewport,
    offset: (i32, i32),
    shot: &Projectile,
    glyph: Glyph,
) -> std::io::Result<()> {
    fill(out, view, offset, &shot.rect(), glyph)
}

fn draw_item<W: Write>(
    out: &mut W,
    view: &Viewport,
    offset: (i32, i32),
    item: &Item,
    assets: &AssetRegistry,
) -> std::io::Result<()> {
    let sprite = match item.kind {
        ItemKind::HealthUp => Sprite::HealthUp,
        ItemKind::SpeedUp => Sprite::SpeedUp,
        ItemKind::DamageUp => Sprite::DamageUp,
        ItemKind::Upgrade => Sprite::Upgrade,
        ItemKind::Trophy => Sprite::Trophy,
    };
    fill(out, view, offset, &item.rect, assets.glyph(sprite))
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

pub fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn draw_hud<W: Write>(
    out: &mut W,
    view: &Viewport,
    session: &GameSession,
    kind: RoomKind,
) -> std::io::Result<()> {
    let seconds = session.final_time.unwrap_or_else(|| session.elapsed_seconds());

    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD))?;
    out.queue(Print(format!("{:<9} {}", room_label(kind), format_time(seconds))))?;

    let player = &session.player;
    let stats = format!("DMG {}  SPD {:.1}  ", player.damage, player.speed);
    let hearts = format!("HP {}", "♥".repeat(player.hp.max(0) as usize));
    let width = (stats.chars().count() + hearts.chars().count() + 1) as u16;
    out.queue(cursor::MoveTo(view.cols.saturating_sub(width), 0))?;
    out.queue(Print(&stats))?;
    out.queue(style::SetForegroundColor(C_HUD_HP))?;
    out.queue(Print(&hearts))?;
    Ok(())
}

fn room_label(kind: RoomKind) -> &'static str {
    match kind {
        RoomKind::Start => "[START]",
        RoomKind::Normal => "[ROOM]",
        RoomKind::Treasure => "[TREASURE]",
        RoomKind::Boss => "[BOSS]",
    }
}

/// Grid of the dungeon in the top-right corner of the play area.
fn draw_minimap<W: Write>(
    out: &mut W,
    view: &Viewport,
    graph: &RoomGraph,
    current: usize,
) -> std::io::Result<()> {
    let left = view.cols.saturating_sub(graph.width() as u16 + 1);
    for y in 0..graph.height() {
        let row = HUD_ROWS + y as u16;
        if row as i32 > view.last_play_row() {
            break;
        }
        out.queue(cursor::MoveTo(left, row))?;
        for x in 0..graph.width() {
            let (symbol, color) = match graph.at(x, y) {
                None => (' ', C_MAP_ROOM),
                Some(id) if id == current => ('◆', C_MAP_CURRENT),
                Some(id) => match graph.room(id).kind {
                    RoomKind::Boss => ('■', C_MAP_BOSS),
                    RoomKind::Treasure => ('■', C_MAP_TREASURE),
                    RoomKind::Start | RoomKind::Normal => ('□', C_MAP_ROOM),
                },
            };
            out.queue(style::SetForegroundColor(color))?;
            out.queue(Print(symbol))?;
        }
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("W A S D : Move   ← ↑ → ↓ : Shoot   Q : Quit"))?;
    Ok(())
}

// ── End-of-run overlay ────────────────────────────────────────────────────────

fn draw_overlay<W: Write>(
    out: &mut W,
    view: &Viewport,
    title: &str,
    color: Color,
    session: &GameSession,
) -> std::io::Result<()> {
    let time_line = match session.final_time {
        Some(seconds) => format!("Time: {}", format_time(seconds)),
        None => format!("Survived: {}", format_time(session.elapsed_seconds())),
    };
    let lines: [(String, Color); 5] = [
        ("╔══════════════════════╗".to_string(), color),
        (format!("║{:^22}║", title), color),
        ("╚══════════════════════╝".to_string(), color),
        (time_line, Color::White),
        ("SPACE / R - Menu   Q - Quit".to_string(), C_HINT),
    ];

    let cx = view.cols / 2;
    let start_row = (view.rows / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, (msg, color)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(msg))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_fits_whole_room() {
        let view = Viewport::fit(80, 24);
        let (w, h) = view.screen_pixels();
        assert!(w >= ROOM_WIDTH);
        assert!(h >= ROOM_HEIGHT);
        assert_eq!(view.px_row, view.px_col * 2);
    }

    #[test]
    fn rect_outside_play_area_is_clipped_away() {
        let view = Viewport::fit(80, 24);
        assert!(view.cells(&Rect::new(-500, -500, 10, 10), (0, 0)).is_none());
        let (c0, r0, _, _) = view.cells(&Rect::new(0, 0, 1, 1), (0, 0)).unwrap();
        assert_eq!((c0, r0), (0, HUD_ROWS as i32));
    }

    #[test]
    fn aim_marker_sits_on_the_heading_edge() {
        let span = (10, 3, 14, 5);
        assert_eq!(aim_marker(span, Direction::Up), (12, 3, '^'));
        assert_eq!(aim_marker(span, Direction::Down), (12, 5, 'v'));
        assert_eq!(aim_marker(span, Direction::Left), (10, 4, '<'));
        assert_eq!(aim_marker(span, Direction::Right), (14, 4, '>'));
    }

    #[test]
    fn time_is_minutes_and_seconds() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(125), "02:05");
    }
}
