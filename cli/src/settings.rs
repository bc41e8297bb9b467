//! Optional TOML settings file.
//!
//! ```toml
//! player = "ana"
//! scores = "scores.json"
//! minesweeper = "medium"
//! memory = "hard"
//! tic_tac_toe = "impossible"
//! ```

use anyhow::{Context, Result};
use arcade_core::{DEFAULT_FILE_NAME, memory, minesweeper, tictactoe::BotDifficulty};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{fs, io};

/// Read from the working directory when no `--config` is given.
pub const DEFAULT_SETTINGS_FILE: &str = "arcade.toml";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub player: Option<String>,
    pub scores: Option<PathBuf>,
    pub minesweeper: minesweeper::Difficulty,
    pub memory: memory::Difficulty,
    pub tic_tac_toe: BotDifficulty,
}

impl Settings {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads `path`, or [`DEFAULT_SETTINGS_FILE`] if present when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path, true),
            None => (Path::new(DEFAULT_SETTINGS_FILE), false),
        };
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if !required && err.kind() == io::ErrorKind::NotFound => {
                log::debug!("no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("could not read settings from {}", path.display()));
            }
        };
        let settings = Self::parse(&text)
            .with_context(|| format!("invalid settings in {}", path.display()))?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Applies command-line (or environment) values over the file's.
    pub fn resolve(&self, player: Option<String>, scores: Option<PathBuf>) -> Resolved {
        Resolved {
            player: player.or_else(|| self.player.clone()),
            scores: scores
                .or_else(|| self.scores.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE_NAME)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolved {
    /// `None` means the player is asked for a name.
    pub player: Option<String>,
    pub scores: PathBuf,
}
