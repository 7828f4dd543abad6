/// Best-time records, one whole number of seconds per line.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::GameError;

pub struct ScoreBoard {
    path: PathBuf,
}

/// `$HOME/.dungeon_crawler_scores`, or the working directory without `$HOME`.
pub fn default_score_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".dungeon_crawler_scores")
}

impl ScoreBoard {
    pub fn new(path: impl Into<PathBuf>) -> ScoreBoard {
        ScoreBoard { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one winning time.
    pub fn record(&self, seconds: u64) -> Result<(), GameError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{seconds}")?;
        Ok(())
    }

    /// Every readable time in file order.  A missing file is an empty board;
    /// lines that are not a number are skipped.
    pub fn load(&self) -> Result<Vec<u64>, GameError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let scores = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(n, line)| match line.trim().parse() {
                Ok(seconds) => Some(seconds),
                Err(_) => {
                    warn!(path = %self.path.display(), line = n + 1, "skipping bad score entry");
                    None
                }
            })
            .collect();
        Ok(scores)
    }

    /// The `n` fastest times, fastest first.  An unreadable board reads as
    /// empty.
    pub fn top(&self, n: usize) -> Vec<u64> {
        let mut scores = self.load().unwrap_or_else(|e| {
            warn!(error = %e, "could not read scores");
            Vec::new()
        });
        scores.sort_unstable();
        scores.truncate(n);
        scores
    }
}
