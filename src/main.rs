mod assets;
mod display;

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{self, stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal, ExecutableCommand, QueueableCommand,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, trace, warn};
use tracing_subscriber::EnvFilter;

use dungeon_crawler::compute::{init_session, tick, GameSession};
use dungeon_crawler::config::{GameConfig, TICKS_PER_FRAME};
use dungeon_crawler::entities::{Cue, GameStatus};
use dungeon_crawler::geometry::Direction;
use dungeon_crawler::player::InputSnapshot;
use dungeon_crawler::scores::{default_score_path, ScoreBoard};

use assets::{AssetRegistry, Sprite};
use display::{format_time, Viewport};

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 4 frames (≈133 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 4;

const RECORDS_SHOWN: usize = 5;

#[derive(Parser, Debug)]
#[command(name = "dungeon_crawler", version, about = "Terminal dungeon crawler")]
struct Cli {
    /// Dungeon seed; the same seed builds the same dungeon.
    #[arg(long)]
    seed: Option<u64>,
    /// Dungeon grid width in rooms (minimum 5).
    #[arg(long, default_value_t = 7)]
    width: usize,
    /// Dungeon grid height in rooms (minimum 5).
    #[arg(long, default_value_t = 7)]
    height: usize,
    /// Where to write the log; the terminal itself is taken by the game.
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Glyph theme file overriding the built-in sprites.
    #[arg(long)]
    theme: Option<PathBuf>,
    /// Best-times file.
    #[arg(long)]
    scores: Option<PathBuf>,
}

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, frame))
}

/// Build this frame's input from the keys currently held.  When several
/// arrows are held, the first in up/down/left/right order aims.
fn snapshot(key_frame: &HashMap<KeyCode, u64>, frame: u64) -> InputSnapshot {
    let held = |keys: &[KeyCode]| any_held(key_frame, keys, frame);
    let aim = [
        (KeyCode::Up, Direction::Up),
        (KeyCode::Down, Direction::Down),
        (KeyCode::Left, Direction::Left),
        (KeyCode::Right, Direction::Right),
    ]
    .into_iter()
    .find(|(key, _)| is_held(key_frame, key, frame))
    .map(|(_, direction)| direction);

    InputSnapshot::from_keys(
        held(&[KeyCode::Char('w'), KeyCode::Char('W')]),
        held(&[KeyCode::Char('s'), KeyCode::Char('S')]),
        held(&[KeyCode::Char('a'), KeyCode::Char('A')]),
        held(&[KeyCode::Char('d'), KeyCode::Char('D')]),
        aim,
    )
}

// ── Logging ───────────────────────────────────────────────────────────────────

fn init_logging(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start,
    Records,
    Info,
    Quit,
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    best: Option<u64>,
) -> io::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "⚔  DUNGEON  CRAWLER  ⚔";
    print_centered(out, cx, cy.saturating_sub(6), title, Color::Cyan)?;

    if let Some(best) = best {
        let best = format!("Best Time: {}", format_time(best));
        print_centered(out, cx, cy.saturating_sub(5), &best, Color::Yellow)?;
    }

    let options: &[(&str, &str, Color)] = &[
        ("1", "Start", Color::Green),
        ("2", "Records", Color::Yellow),
        ("3", "Info", Color::Cyan),
        ("Q", "Quit", Color::Red),
    ];
    for (i, (key, label, color)) in options.iter().enumerate() {
        let row = cy.saturating_sub(2) + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(6), row))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("[{}] ", key)))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*label))?;
    }

    out.queue(style::ResetColor)?;
    out.flush()?;

    loop {
        match rx.recv() {
            Ok(Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. })) => match code {
                KeyCode::Char('1') | KeyCode::Enter => return Ok(MenuResult::Start),
                KeyCode::Char('2') => return Ok(MenuResult::Records),
                KeyCode::Char('3') => return Ok(MenuResult::Info),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(MenuResult::Quit);
                }
                _ => {}
            },
            Ok(_) => {}
            // Input thread gone: nothing more can be chosen.
            Err(_) => return Ok(MenuResult::Quit),
        }
    }
}

fn print_centered<W: Write>(out: &mut W, cx: u16, row: u16, text: &str, color: Color) -> io::Result<()> {
    out.queue(cursor::MoveTo(cx.saturating_sub(text.chars().count() as u16 / 2), row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

/// Show `lines` until any key is pressed.
fn show_page<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    lines: &[(String, Color)],
) -> io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let (width, height) = terminal::size()?;
    let start = (height / 2).saturating_sub(lines.len() as u16 / 2 + 1);
    for (i, (line, color)) in lines.iter().enumerate() {
        print_centered(out, width / 2, start + i as u16, line, *color)?;
    }
    print_centered(
        out,
        width / 2,
        start + lines.len() as u16 + 1,
        "press any key",
        Color::DarkGrey,
    )?;
    out.queue(style::ResetColor)?;
    out.flush()?;

    loop {
        match rx.recv() {
            Ok(Event::Key(KeyEvent { kind: KeyEventKind::Press, .. })) | Err(_) => return Ok(()),
            Ok(_) => {}
        }
    }
}

fn records_page(scores: &ScoreBoard) -> Vec<(String, Color)> {
    let mut lines = vec![("BEST TIMES".to_string(), Color::Yellow), (String::new(), Color::White)];
    let top = scores.top(RECORDS_SHOWN);
    if top.is_empty() {
        lines.push(("no wins yet".to_string(), Color::DarkGrey));
    }
    for (rank, seconds) in top.into_iter().enumerate() {
        lines.push((format!("{}. {}", rank + 1, format_time(seconds)), Color::White));
    }
    lines
}

fn info_page(assets: &AssetRegistry) -> Vec<(String, Color)> {
    let legend: &[(Sprite, &str)] = &[
        (Sprite::Walker, "Walker: chases you"),
        (Sprite::Shooter, "Shooter: fires at where you are going"),
        (Sprite::BossLarge, "Boss: splits as it weakens"),
        (Sprite::HealthUp, "Health up: +3 hp"),
        (Sprite::SpeedUp, "Speed up: +1 speed"),
        (Sprite::DamageUp, "Damage up: +1 damage"),
        (Sprite::Upgrade, "Upgrade: all of the above"),
        (Sprite::Trophy, "Trophy: take it to win"),
    ];
    let mut lines = vec![
        ("Clear each room to open its doors.".to_string(), Color::White),
        ("Find the boss, beat it, grab the trophy.".to_string(), Color::White),
        (String::new(), Color::White),
    ];
    for (sprite, text) in legend {
        let glyph = assets.glyph(*sprite);
        lines.push((format!("{}  {:<38}", glyph.symbol, text), glyph.color));
    }
    lines.push((String::new(), Color::White));
    lines.push(("W A S D : Move   ← ↑ → ↓ : Shoot   Q : Quit".to_string(), Color::DarkGrey));
    lines
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Returns `true` → quit program,  `false` → back to menu.
///
/// Input model as in a held-key map: each key maps to the frame it was last
/// pressed or repeated, and every frame the live keys become one
/// `InputSnapshot` fed to each simulation tick of that frame.
fn game_loop<W: Write>(
    out: &mut W,
    session: &mut GameSession,
    rng: &mut ChaCha8Rng,
    assets: &AssetRegistry,
    rx: &mpsc::Receiver<Event>,
) -> io::Result<bool> {
    let (cols, rows) = terminal::size()?;
    let mut view = Viewport::fit(cols, rows);
    session.level.set_screen(view.screen_pixels());

    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        loop {
            let ev = match rx.try_recv() {
                Ok(ev) => ev,
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return Ok(true),
            };
            match ev {
                Event::Key(KeyEvent { code, kind, modifiers, .. }) => match kind {
                    KeyEventKind::Press => {
                        key_frame.insert(code, frame);
                        match code {
                            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                                return Ok(true);
                            }
                            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                                return Ok(true);
                            }
                            KeyCode::Char(' ') | KeyCode::Char('r') | KeyCode::Char('R')
                                if session.status != GameStatus::Playing =>
                            {
                                return Ok(false);
                            }
                            _ => {}
                        }
                    }
                    KeyEventKind::Repeat => {
                        key_frame.insert(code, frame);
                    }
                    KeyEventKind::Release => {
                        key_frame.remove(&code);
                    }
                },
                Event::Resize(cols, rows) => {
                    view = Viewport::fit(cols, rows);
                    session.level.set_screen(view.screen_pixels());
                }
                _ => {}
            }
        }

        // ── Simulate ──────────────────────────────────────────────────────────
        let input = snapshot(&key_frame, frame);
        for _ in 0..TICKS_PER_FRAME {
            if session.status != GameStatus::Playing {
                break;
            }
            let cues = tick(session, &input, rng);
            play_cues(out, &cues)?;
        }

        display::render(out, session, assets, &view)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

/// The terminal bell stands in for the big sound effects; everything else
/// only goes to the log.
fn play_cues<W: Write>(out: &mut W, cues: &[Cue]) -> io::Result<()> {
    for cue in cues {
        trace!(?cue, "cue");
        if matches!(cue, Cue::Victory | Cue::Defeat | Cue::PlayerHurt) {
            out.queue(Print('\x07'))?;
        }
    }
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let log_path = cli
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("dungeon_crawler.log"));
    init_logging(&log_path)?;

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Ghostty / kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx, &cli);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>, cli: &Cli) -> io::Result<()> {
    let assets = match &cli.theme {
        Some(path) => AssetRegistry::load(path),
        None => AssetRegistry::builtin(),
    };
    let scores = ScoreBoard::new(cli.scores.clone().unwrap_or_else(default_score_path));

    loop {
        let best = scores.top(1).first().copied();
        match show_menu(out, rx, best)? {
            MenuResult::Quit => break,
            MenuResult::Records => show_page(out, rx, &records_page(&scores))?,
            MenuResult::Info => show_page(out, rx, &info_page(&assets))?,
            MenuResult::Start => {
                let seed = cli.seed.unwrap_or_else(rand::random);
                info!(seed, width = cli.width, height = cli.height, "new run");
                let config = GameConfig {
                    grid_width: cli.width,
                    grid_height: cli.height,
                    seed: Some(seed),
                    ..GameConfig::default()
                };
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let mut session = init_session(&config, &mut rng)
                    .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

                let quit = game_loop(out, &mut session, &mut rng, &assets, rx)?;

                if let Some(seconds) = session.final_time {
                    if let Err(e) = scores.record(seconds) {
                        warn!(error = %e, "could not save time");
                    }
                }

                if quit {
                    break;
                }
            }
        }
    }
    Ok(())
}
