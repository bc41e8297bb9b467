use anyhow::{Context, Result};
use arcade_core::{Leaderboard, Submission, player_name};
use rand::prelude::*;
use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

use crate::settings::Settings;

/// Line-based terminal: prompts on the output, answers from the input.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Reads one line with its line ending removed; `None` at end of input.
    pub fn read_raw(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(len);
        Ok(Some(line))
    }

    /// Like [`Console::read_raw`], trimmed.
    pub fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        Ok(self.read_raw(prompt)?.map(|line| line.trim().to_string()))
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R, W: Write> Write for Console<R, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.output.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.output.flush()
    }
}

/// Wall-clock time between inputs, fed to the game controllers.
pub struct Clock(Instant);

impl Clock {
    pub fn start() -> Self {
        Self(Instant::now())
    }

    /// Time since the previous lap.
    pub fn lap(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now - self.0;
        self.0 = now;
        dt
    }
}

/// State shared by every game launched from one run of the program.
pub struct Session<R, W> {
    pub console: Console<R, W>,
    pub settings: Settings,
    pub leaderboard: Leaderboard,
    player: Option<String>,
    seeds: SmallRng,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(
        console: Console<R, W>,
        settings: Settings,
        leaderboard: Leaderboard,
        player: Option<String>,
        seed: u64,
    ) -> Self {
        Self {
            console,
            settings,
            leaderboard,
            player: player.map(|name| player_name(&name).to_string()),
            seeds: SmallRng::seed_from_u64(seed),
        }
    }

    /// The player's name, asking for it the first time.
    pub fn player(&mut self) -> Result<&str> {
        if self.player.is_none() {
            let answer = self.console.ask("Enter your name: ")?.unwrap_or_default();
            self.player = Some(player_name(&answer).to_string());
        }
        Ok(self.player.as_deref().unwrap_or_default())
    }

    /// A fresh seed for the next game, derived from the session seed.
    pub fn next_seed(&mut self) -> u64 {
        self.seeds.next_u64()
    }

    /// Saves a finished round's score, if it earned one.
    ///
    /// A failed write is shown to the player without ending the session.
    pub fn record(&mut self, submission: Option<Submission>) -> Result<()> {
        let Some(submission) = submission else {
            return Ok(());
        };
        let player = self.player()?.to_string();
        match self.leaderboard.submit(&player, &submission) {
            Ok(entry) => writeln!(
                self.console,
                "Saved {} points for {} on the {} leaderboard.",
                entry.score,
                entry.player,
                submission.game.title()
            )?,
            Err(err) => {
                let err = anyhow::Error::new(err).context(format!(
                    "could not save score to {}",
                    self.leaderboard.path().display()
                ));
                log::warn!("{:#}", err);
                writeln!(self.console, "{err:#}")?;
            }
        }
        Ok(())
    }

    pub fn write_line(&mut self, line: impl AsRef<str>) -> Result<()> {
        writeln!(self.console, "{}", line.as_ref()).context("could not write to the terminal")
    }
}
