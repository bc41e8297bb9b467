//! Minesweeper with first-click-safe mine placement.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use board::*;
pub use generator::*;

use crate::*;

mod board;
mod generator;

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
        use Difficulty::*;
        match self {
            Easy => (8, 7),
            Medium => (15, 15),
            Hard => (20, 20),
        }
    }

    pub const fn mines(self) -> CellCount {
        use Difficulty::*;
        match self {
            Easy => 10,
            Medium => 40,
            Hard => 80,
        }
    }

    pub const fn name(self) -> &'static str {
        use Difficulty::*;
        match self {
            Easy => "easy",
            Medium => "medium",
            Hard => "hard",
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

/// Valid transitions:
/// - Ready -> Active (first reveal)
/// - Active -> Won
/// - Active -> Lost
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    Ready,
    Active,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Reveal(Coord2),
    ToggleFlag(Coord2),
    NewGame,
}

pub struct Minesweeper<G = RandomMineGenerator> {
    difficulty: Difficulty,
    board: Board,
    generator: G,
    state: GameState,
    elapsed: Duration,
    best_time: Option<u32>,
    round: u32,
}

impl<G: MineGenerator> Minesweeper<G> {
    pub fn new(difficulty: Difficulty, generator: G) -> Self {
        Self {
            difficulty,
            board: Board::new(difficulty.size(), difficulty.mines()),
            generator,
            state: GameState::Ready,
            elapsed: Duration::ZERO,
            best_time: None,
            round: 0,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn elapsed_secs(&self) -> u32 {
        whole_secs(self.elapsed)
    }

    /// Fastest win of this session, in seconds.
    pub fn best_time(&self) -> Option<u32> {
        self.best_time
    }

    /// How many mines have not been flagged yet
    pub fn mines_left(&self) -> isize {
        (self.board.mine_count() as isize) - (self.board.flagged_count() as isize)
    }

    /// Reveals a cell; the first reveal of a round lays the mines around it first.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        self.check_not_finished()?;
        let coords = self.board.validate_coords(coords)?;

        if self.board.cell(coords).is_flagged {
            return Ok(RevealOutcome::NoChange);
        }

        if self.state == GameState::Ready {
            self.board.place_mines(coords, &mut self.generator)?;
            self.state = GameState::Active;
            log::debug!("started at {:?}", coords);
        }

        let outcome = self.board.reveal_cell(coords)?;
        match outcome {
            RevealOutcome::HitMine => self.end_game(false),
            RevealOutcome::Won => self.end_game(true),
            RevealOutcome::Revealed | RevealOutcome::NoChange => {}
        }
        Ok(outcome)
    }

    /// Flags or unflags a hidden cell. Ignored until the first reveal.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<FlagOutcome> {
        let coords = self.board.validate_coords(coords)?;
        self.check_not_finished()?;
        if self.state == GameState::Ready {
            return Ok(FlagOutcome::NoChange);
        }
        self.board.toggle_flag(coords)
    }

    pub fn new_game(&mut self) {
        self.board = Board::new(self.difficulty.size(), self.difficulty.mines());
        self.state = GameState::Ready;
        self.elapsed = Duration::ZERO;
        self.round += 1;
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.new_game();
    }

    fn end_game(&mut self, won: bool) {
        self.state = if won { GameState::Won } else { GameState::Lost };
        let secs = self.elapsed_secs();
        if won && self.best_time.is_none_or(|best| secs < best) {
            self.best_time = Some(secs);
        }
        log::debug!("ended after {}s, won: {}", secs, won);
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.state.is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}

impl<G: MineGenerator> FrameGame for Minesweeper<G> {
    type Input = Input;

    fn handle(&mut self, input: Input) -> Result<()> {
        match input {
            Input::Reveal(coords) => self.reveal(coords).map(drop),
            Input::ToggleFlag(coords) => self.toggle_flag(coords).map(drop),
            Input::NewGame => {
                self.new_game();
                Ok(())
            }
        }
    }

    fn advance(&mut self, dt: Duration) {
        if self.state == GameState::Active {
            self.elapsed += dt;
        }
    }

    fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Faster wins score higher; instant wins are not recorded.
    fn submission(&self) -> Option<Submission> {
        let secs = self.elapsed_secs();
        if self.state != GameState::Won || secs == 0 {
            return None;
        }
        let score = 10_000i64.saturating_sub(i64::from(secs) * 50).max(1);
        Some(
            Submission::new(GameId::Minesweeper, score as f64)
                .with("difficulty", self.difficulty.name())
                .with("time_s", secs)
                .with("mines", self.board.mine_count()),
        )
    }

    fn round(&self) -> u32 {
        self.round
    }
}
