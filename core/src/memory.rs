//! Memory Match: turn two cards at a time and find every pair.

use core::fmt;
use core::str::FromStr;
use ndarray::Array2;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::*;

/// How long a mismatched pair stays face up.
pub const MISMATCH_DELAY: Duration = Duration::from_millis(700);

pub const SYMBOLS: [&str; 18] = [
    "🍎", "🍌", "🍇", "🍓", "🍒", "🍉", "🥝", "🍍", "🍑", "🥥", "🥕", "🍆", "🌽", "🍋", "🥦", "🍊",
    "🍐", "🍈",
];

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// Board size as `(rows, cols)`.
    pub const fn size(self) -> Coord2 {
        match self {
            Self::Easy => (4, 4),
            Self::Medium => (4, 6),
            Self::Hard => (6, 6),
        }
    }

    pub const fn pairs(self) -> usize {
        let (rows, cols) = self.size();
        (rows as usize * cols as usize) / 2
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Please type: easy, medium, or hard (got {s:?})"))
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Face {
    #[default]
    Down,
    Up,
    Matched,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Card {
    /// Index into [`SYMBOLS`].
    pub symbol: u8,
    pub face: Face,
}

impl Card {
    pub fn symbol(&self) -> &'static str {
        SYMBOLS[usize::from(self.symbol)]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PickOutcome {
    /// The card was already face up.
    NoChange,
    Turned,
    Matched,
    Mismatched,
    Won,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Pick(Coord2),
    NewGame,
    SetDifficulty(Difficulty),
}

/// Cards shown after a mismatch, and how long until they flip back.
#[derive(Copy, Clone, Debug)]
struct Lock {
    cards: [Coord2; 2],
    remaining: Duration,
}

pub struct MemoryMatch {
    difficulty: Difficulty,
    cards: Array2<Card>,
    first_pick: Option<Coord2>,
    lock: Option<Lock>,
    pairs_found: usize,
    attempts: u32,
    elapsed: Duration,
    won: bool,
    rng: SmallRng,
    round: u32,
}

impl MemoryMatch {
    pub fn new(difficulty: Difficulty, seed: u64) -> Self {
        let (rows, cols) = difficulty.size();
        let mut game = Self {
            difficulty,
            cards: Array2::default((usize::from(rows), usize::from(cols))),
            first_pick: None,
            lock: None,
            pairs_found: 0,
            attempts: 0,
            elapsed: Duration::ZERO,
            won: false,
            rng: SmallRng::seed_from_u64(seed),
            round: 0,
        };
        game.deal();
        game
    }

    fn deal(&mut self) {
        let (rows, cols) = self.difficulty.size();
        let pairs = self.difficulty.pairs();
        let mut symbols: Vec<u8> = (0..pairs as u8).chain(0..pairs as u8).collect();
        symbols.shuffle(&mut self.rng);
        let shape = (usize::from(rows), usize::from(cols));
        self.cards = Array2::from_shape_fn(shape, |(row, col)| Card {
            symbol: symbols[row * usize::from(cols) + col],
            face: Face::Down,
        });
        self.first_pick = None;
        self.lock = None;
        self.pairs_found = 0;
        self.attempts = 0;
        self.elapsed = Duration::ZERO;
        self.won = false;
        log::debug!("dealt {} pairs on {:?}", pairs, self.difficulty);
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn cards(&self) -> &Array2<Card> {
        &self.cards
    }

    pub fn size(&self) -> Coord2 {
        grid_size(&self.cards)
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn pairs_found(&self) -> usize {
        self.pairs_found
    }

    pub fn elapsed_secs(&self) -> u32 {
        whole_secs(self.elapsed)
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    /// Turns a face-down card. The second card of a pair counts as one attempt.
    pub fn pick(&mut self, coords: Coord2) -> Result<PickOutcome> {
        if self.won {
            return Err(GameError::AlreadyEnded);
        }
        if self.lock.is_some() {
            return Err(GameError::InputLocked);
        }
        let (rows, cols) = self.size();
        if coords.0 >= rows || coords.1 >= cols {
            return Err(GameError::InvalidCoords);
        }
        let index = coords.to_nd_index();
        if self.cards[index].face != Face::Down {
            return Ok(PickOutcome::NoChange);
        }
        self.cards[index].face = Face::Up;

        let Some(first) = self.first_pick.take() else {
            self.first_pick = Some(coords);
            return Ok(PickOutcome::Turned);
        };

        self.attempts += 1;
        let first_index = first.to_nd_index();
        if self.cards[first_index].symbol != self.cards[index].symbol {
            self.lock = Some(Lock {
                cards: [first, coords],
                remaining: MISMATCH_DELAY,
            });
            return Ok(PickOutcome::Mismatched);
        }

        self.cards[first_index].face = Face::Matched;
        self.cards[index].face = Face::Matched;
        self.pairs_found += 1;
        if self.pairs_found == self.difficulty.pairs() {
            self.won = true;
            log::debug!(
                "won {} in {} attempts and {}s",
                self.difficulty,
                self.attempts,
                self.elapsed_secs()
            );
            return Ok(PickOutcome::Won);
        }
        Ok(PickOutcome::Matched)
    }

    pub fn new_game(&mut self) {
        self.round += 1;
        self.deal();
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.new_game();
    }
}

impl FrameGame for MemoryMatch {
    type Input = Input;

    fn handle(&mut self, input: Input) -> Result<()> {
        match input {
            Input::Pick(coords) => self.pick(coords).map(drop),
            Input::NewGame => {
                self.new_game();
                Ok(())
            }
            Input::SetDifficulty(difficulty) => {
                self.set_difficulty(difficulty);
                Ok(())
            }
        }
    }

    fn advance(&mut self, dt: Duration) {
        if self.won {
            return;
        }
        self.elapsed += dt;
        if let Some(lock) = self.lock.as_mut() {
            lock.remaining = lock.remaining.saturating_sub(dt);
            if lock.remaining.is_zero() {
                for coords in lock.cards {
                    self.cards[coords.to_nd_index()].face = Face::Down;
                }
                self.lock = None;
            }
        }
    }

    fn is_finished(&self) -> bool {
        self.won
    }

    /// Fewer seconds and attempts score higher.
    fn submission(&self) -> Option<Submission> {
        if !self.won || self.attempts == 0 {
            return None;
        }
        let secs = self.elapsed_secs();
        let penalty = i64::from(secs) * 50 + i64::from(self.attempts) * 20;
        let score = (10_000 - penalty).max(1);
        Some(
            Submission::new(GameId::MemoryMatch, score as f64)
                .with("difficulty", self.difficulty.name())
                .with("time_s", secs)
                .with("attempts", self.attempts),
        )
    }

    fn round(&self) -> u32 {
        self.round
    }
}
