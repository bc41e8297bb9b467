//! Flat JSON score store shared by every game.
//!
//! The file holds one object mapping a game key to its entries, best first. Reading never fails: a
//! missing or unreadable file is an empty store. Writing rewrites the whole file.

use chrono::{Local, NaiveDateTime, SubsecRound};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::{fs, io};
use thiserror::Error;

use crate::GameId;

/// Entries kept per game.
pub const MAX_ENTRIES: usize = 20;

/// Entries returned when the caller does not ask for a specific amount.
pub const DEFAULT_LIMIT: usize = 10;

pub const DEFAULT_FILE_NAME: &str = "scores.json";

#[derive(Error, Debug)]
pub enum LeaderboardError {
    #[error("could not write leaderboard file: {0}")]
    Io(#[from] io::Error),
    #[error("could not encode leaderboard: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, LeaderboardError>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub player: String,
    pub score: f64,
    #[serde(default)]
    pub extra: Map<String, Value>,
    pub time: NaiveDateTime,
}

/// Game key to entries, in the order games first appeared in the file.
pub type Scores = IndexMap<String, Vec<ScoreEntry>>;

/// Score produced by a finished round, before it is attributed to a player.
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    pub game: GameId,
    pub score: f64,
    pub extra: Map<String, Value>,
}

impl Submission {
    pub fn new(game: GameId, score: f64) -> Self {
        Self {
            game,
            score,
            extra: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}

/// Appends `entry` under `game`, then keeps only the best [`MAX_ENTRIES`].
///
/// The sort is stable, so an entry tying an older one ranks below it.
pub fn record(scores: &mut Scores, game: &str, entry: ScoreEntry) {
    let entries = scores.entry(game.to_string()).or_default();
    entries.push(entry);
    entries.sort_by(|a, b| b.score.total_cmp(&a.score));
    entries.truncate(MAX_ENTRIES);
}

/// One menu line: rank, player, score, timestamp, and at most two extra fields.
pub fn format_entry(rank: usize, entry: &ScoreEntry) -> String {
    let mut line = format!(
        "{:2}. {:<12}  score={:<6}  {}",
        rank,
        entry.player,
        entry.score,
        entry.time.format("%Y-%m-%dT%H:%M:%S"),
    );
    let parts: Vec<String> = entry
        .extra
        .iter()
        .take(2)
        .map(|(key, value)| match value {
            Value::String(text) => format!("{key}={text}"),
            other => format!("{key}={other}"),
        })
        .collect();
    if !parts.is_empty() {
        let _ = write!(line, " | {}", parts.join(", "));
    }
    line
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Leaderboard {
    path: PathBuf,
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::new(DEFAULT_FILE_NAME)
    }
}

impl Leaderboard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole store, treating a missing or corrupt file as empty.
    pub fn load(&self) -> Scores {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("no leaderboard at {}", self.path.display());
                return Scores::new();
            }
            Err(err) => {
                log::warn!("could not read {}: {}", self.path.display(), err);
                return Scores::new();
            }
        };
        serde_json::from_slice(&bytes).unwrap_or_else(|err| {
            log::warn!(
                "ignoring corrupt leaderboard {}: {}",
                self.path.display(),
                err
            );
            Scores::new()
        })
    }

    pub fn save(&self, scores: &Scores) -> Result<()> {
        let json = serde_json::to_vec_pretty(scores)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Records a score stamped with the current local time and persists the store.
    pub fn add_score(
        &self,
        game: &str,
        player: &str,
        score: f64,
        extra: Map<String, Value>,
    ) -> Result<ScoreEntry> {
        let entry = ScoreEntry {
            player: player.to_string(),
            score,
            extra,
            time: Local::now().naive_local().trunc_subsecs(0),
        };
        let mut scores = self.load();
        record(&mut scores, game, entry.clone());
        self.save(&scores)?;
        log::debug!("recorded {} for {} in {}", score, player, game);
        Ok(entry)
    }

    pub fn submit(&self, player: &str, submission: &Submission) -> Result<ScoreEntry> {
        self.add_score(
            submission.game.key(),
            player,
            submission.score,
            submission.extra.clone(),
        )
    }

    /// Best `limit` entries of `game`, empty when the game has no scores.
    pub fn leaderboard(&self, game: &str, limit: usize) -> Vec<ScoreEntry> {
        let mut scores = self.load();
        let mut entries = scores.swap_remove(game).unwrap_or_default();
        entries.truncate(limit);
        entries
    }

    /// Keys of every game that has scores.
    pub fn games(&self) -> Vec<String> {
        self.load().into_keys().collect()
    }
}
