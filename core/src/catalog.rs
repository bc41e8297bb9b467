use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Every game shipped in the bundle.
///
/// The serialized form is the key the game's scores are stored under in the leaderboard file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameId {
    #[serde(rename = "tic_tac_toe")]
    TicTacToe,
    #[serde(rename = "snake")]
    Snake,
    #[serde(rename = "minesweeper")]
    Minesweeper,
    #[serde(rename = "2048_5x5")]
    TwentyFortyEight,
    #[serde(rename = "flappy_bird")]
    FlappyBird,
    #[serde(rename = "memory_match")]
    MemoryMatch,
    #[serde(rename = "typing_test")]
    TypingTest,
}

impl GameId {
    /// Launcher order.
    pub const ALL: [GameId; 7] = [
        Self::TicTacToe,
        Self::Snake,
        Self::Minesweeper,
        Self::TwentyFortyEight,
        Self::FlappyBird,
        Self::MemoryMatch,
        Self::TypingTest,
    ];

    pub const fn key(self) -> &'static str {
        use GameId::*;
        match self {
            TicTacToe => "tic_tac_toe",
            Snake => "snake",
            Minesweeper => "minesweeper",
            TwentyFortyEight => "2048_5x5",
            FlappyBird => "flappy_bird",
            MemoryMatch => "memory_match",
            TypingTest => "typing_test",
        }
    }

    pub const fn title(self) -> &'static str {
        use GameId::*;
        match self {
            TicTacToe => "Tic Tac Toe",
            Snake => "Snake",
            Minesweeper => "Minesweeper",
            TwentyFortyEight => "2048",
            FlappyBird => "Flappy Bird",
            MemoryMatch => "Memory Match",
            TypingTest => "Typing Speed Test",
        }
    }

    /// Whether finished rounds of this game are recorded on the leaderboard.
    pub const fn keeps_scores(self) -> bool {
        !matches!(self, Self::TicTacToe)
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown game: {0}")]
pub struct UnknownGame(pub String);

impl FromStr for GameId {
    type Err = UnknownGame;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use GameId::*;
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Ok(match normalized.as_str() {
            "tic_tac_toe" | "tictactoe" | "ttt" => TicTacToe,
            "snake" => Snake,
            "minesweeper" | "mines" => Minesweeper,
            "2048_5x5" | "2048" => TwentyFortyEight,
            "flappy_bird" | "flappy" => FlappyBird,
            "memory_match" | "memory" => MemoryMatch,
            "typing_test" | "typing" => TypingTest,
            _ => return Err(UnknownGame(s.to_string())),
        })
    }
}
