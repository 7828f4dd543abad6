/// Glyph registry: which character and colour each sprite is drawn with.
///
/// Every sprite has a built-in glyph.  A JSON theme file can override any of
/// them by sprite name; the colour is optional:
///
/// ```text
/// { "glyphs": {
///     "walker": { "symbol": "w", "color": "green" },
///     "wall":   { "symbol": "#" }
/// } }
/// ```
///
/// Unknown names, bad entries and unreadable files are logged and skipped;
/// drawing always has a glyph to fall back on.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crossterm::style::Color;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ThemeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Root of a theme file.  Entries stay untyped until applied so one bad
/// entry does not reject the rest.
#[derive(Debug, Default, Deserialize)]
pub struct ThemeFile {
    #[serde(default)]
    pub glyphs: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GlyphEntry {
    symbol: char,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sprite {
    Wall,
    DoorOpen,
    DoorClosed,
    Player,
    PlayerUpgraded,
    PlayerShot,
    EnemyShot,
    Walker,
    Shooter,
    BossLarge,
    BossMedium,
    BossSmall,
    HealthUp,
    SpeedUp,
    DamageUp,
    Upgrade,
    Trophy,
}

impl Sprite {
    pub const ALL: [Sprite; 17] = [
        Sprite::Wall,
        Sprite::DoorOpen,
        Sprite::DoorClosed,
        Sprite::Player,
        Sprite::PlayerUpgraded,
        Sprite::PlayerShot,
        Sprite::EnemyShot,
        Sprite::Walker,
        Sprite::Shooter,
        Sprite::BossLarge,
        Sprite::BossMedium,
        Sprite::BossSmall,
        Sprite::HealthUp,
        Sprite::SpeedUp,
        Sprite::DamageUp,
        Sprite::Upgrade,
        Sprite::Trophy,
    ];

    /// Name used in theme files.
    pub fn name(self) -> &'static str {
        match self {
            Sprite::Wall => "wall",
            Sprite::DoorOpen => "door_open",
            Sprite::DoorClosed => "door_closed",
            Sprite::Player => "player",
            Sprite::PlayerUpgraded => "player_upgraded",
            Sprite::PlayerShot => "player_shot",
            Sprite::EnemyShot => "enemy_shot",
            Sprite::Walker => "walker",
            Sprite::Shooter => "shooter",
            Sprite::BossLarge => "boss_large",
            Sprite::BossMedium => "boss_medium",
            Sprite::BossSmall => "boss_small",
            Sprite::HealthUp => "health_up",
            Sprite::SpeedUp => "speed_up",
            Sprite::DamageUp => "damage_up",
            Sprite::Upgrade => "upgrade",
            Sprite::Trophy => "trophy",
        }
    }

    fn from_name(name: &str) -> Option<Sprite> {
        Sprite::ALL.into_iter().find(|s| s.name() == name)
    }

    fn builtin(self) -> Glyph {
        let (symbol, color) = match self {
            Sprite::Wall => ('█', Color::DarkGrey),
            Sprite::DoorOpen => ('░', Color::DarkYellow),
            Sprite::DoorClosed => ('▓', Color::DarkRed),
            Sprite::Player => ('@', Color::White),
            Sprite::PlayerUpgraded => ('@', Color::Cyan),
            Sprite::PlayerShot => ('•', Color::Cyan),
            Sprite::EnemyShot => ('*', Color::Magenta),
            Sprite::Walker => ('w', Color::Green),
            Sprite::Shooter => ('s', Color::Red),
            Sprite::BossLarge => ('B', Color::DarkMagenta),
            Sprite::BossMedium => ('b', Color::Magenta),
            Sprite::BossSmall => ('o', Color::Magenta),
            Sprite::HealthUp => ('♥', Color::Red),
            Sprite::SpeedUp => ('»', Color::Yellow),
            Sprite::DamageUp => ('†', Color::DarkCyan),
            Sprite::Upgrade => ('★', Color::Yellow),
            Sprite::Trophy => ('♛', Color::Yellow),
        };
        Glyph { symbol, color }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyph {
    pub symbol: char,
    pub color: Color,
}

pub struct AssetRegistry {
    glyphs: HashMap<Sprite, Glyph>,
}

impl AssetRegistry {
    pub fn builtin() -> AssetRegistry {
        AssetRegistry {
            glyphs: Sprite::ALL.into_iter().map(|s| (s, s.builtin())).collect(),
        }
    }

    /// Built-in glyphs with any overrides from `path` applied on top.
    pub fn load(path: &Path) -> AssetRegistry {
        let mut registry = AssetRegistry::builtin();
        match std::fs::read_to_string(path)
            .map_err(ThemeError::from)
            .and_then(|text| registry.apply_theme(&text))
        {
            Ok(applied) => info!(path = %path.display(), applied, "theme loaded"),
            Err(e) => warn!(path = %path.display(), error = %e, "theme unusable, using built-in glyphs"),
        }
        registry
    }

    /// Apply a JSON theme; returns how many overrides took effect.
    pub fn apply_theme(&mut self, text: &str) -> Result<usize, ThemeError> {
        let theme: ThemeFile = serde_json::from_str(text)?;
        let mut applied = 0;
        for (name, value) in theme.glyphs {
            match parse_entry(&name, value) {
                Some((sprite, glyph)) => {
                    self.glyphs.insert(sprite, glyph);
                    applied += 1;
                }
                None => warn!(entry = %name, "bad theme entry skipped"),
            }
        }
        Ok(applied)
    }

    pub fn glyph(&self, sprite: Sprite) -> Glyph {
        self.glyphs.get(&sprite).copied().unwrap_or_else(|| sprite.builtin())
    }
}

fn parse_entry(name: &str, value: serde_json::Value) -> Option<(Sprite, Glyph)> {
    let sprite = Sprite::from_name(name)?;
    let entry: GlyphEntry = serde_json::from_value(value).ok()?;
    let color = match entry.color {
        Some(color) => Color::try_from(color.as_str()).ok()?,
        None => sprite.builtin().color,
    };
    Some((sprite, Glyph { symbol: entry.symbol, color }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_overrides_named_sprites_only() {
        let mut assets = AssetRegistry::builtin();
        let applied = assets
            .apply_theme(r#"{ "glyphs": { "walker": { "symbol": "W", "color": "red" }, "trophy": { "symbol": "T" } } }"#)
            .unwrap();
        assert_eq!(applied, 2);
        assert_eq!(assets.glyph(Sprite::Walker), Glyph { symbol: 'W', color: Color::Red });
        assert_eq!(assets.glyph(Sprite::Trophy).symbol, 'T');
        assert_eq!(assets.glyph(Sprite::Trophy).color, Sprite::Trophy.builtin().color);
        assert_eq!(assets.glyph(Sprite::Shooter), Sprite::Shooter.builtin());
    }

    #[test]
    fn hash_and_spaces_are_valid_symbols() {
        let mut assets = AssetRegistry::builtin();
        let applied = assets
            .apply_theme(r##"{ "glyphs": { "wall": { "symbol": "#", "color": "grey" }, "door_open": { "symbol": " " } } }"##)
            .unwrap();
        assert_eq!(applied, 2);
        assert_eq!(assets.glyph(Sprite::Wall), Glyph { symbol: '#', color: Color::Grey });
        assert_eq!(assets.glyph(Sprite::DoorOpen).symbol, ' ');
    }

    #[test]
    fn bad_entries_fall_back() {
        let mut assets = AssetRegistry::builtin();
        let applied = assets
            .apply_theme(
                r#"{ "glyphs": {
                    "dragon": { "symbol": "D", "color": "red" },
                    "walker": { "symbol": "ww" },
                    "shooter": { "symbol": "S", "color": "not_a_colour" },
                    "wall": 3,
                    "trophy": { "symbol": "$" }
                } }"#,
            )
            .unwrap();
        assert_eq!(applied, 1);
        assert_eq!(assets.glyph(Sprite::Trophy).symbol, '$');
        for sprite in Sprite::ALL.into_iter().filter(|s| *s != Sprite::Trophy) {
            assert_eq!(assets.glyph(sprite), sprite.builtin());
        }
    }

    #[test]
    fn malformed_theme_is_rejected_whole() {
        let mut assets = AssetRegistry::builtin();
        let result = assets.apply_theme("walker = w green");
        assert!(matches!(result, Err(ThemeError::Serialization(_))));
        assert_eq!(assets.glyph(Sprite::Walker), Sprite::Walker.builtin());
    }

    #[test]
    fn missing_theme_file_uses_builtin() {
        let assets = AssetRegistry::load(Path::new("/nonexistent/theme.json"));
        assert_eq!(assets.glyph(Sprite::Player), Sprite::Player.builtin());
    }
}
