//! Terminal front-ends, one per game.
//!
//! Each front-end owns a [`Controller`] for its game, turns typed commands into game inputs, and
//! hands finished rounds to the session's leaderboard.

use anyhow::Result;
use arcade_core::tictactoe::Mark;
use arcade_core::{Coord2, FrameGame, GameError, GameId};
use clap::Args;
use std::io::{BufRead, Write};

use crate::session::Session;

pub mod flappy;
pub mod memory;
pub mod minesweeper;
pub mod snake;
pub mod tictactoe;
pub mod twenty48;
pub mod typing;

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayOptions {
    /// Difficulty for minesweeper, memory match, or the tic-tac-toe bot
    #[arg(short, long)]
    pub difficulty: Option<String>,

    /// Tic-tac-toe: two people share the keyboard instead of facing the bot
    #[arg(long)]
    pub two_player: bool,

    /// Tic-tac-toe: the bot opens each round
    #[arg(long)]
    pub bot_starts: bool,

    /// Tic-tac-toe: which mark opens each round (O against the bot means the bot opens)
    #[arg(long, value_name = "X|O")]
    pub first: Option<Mark>,
}

/// Runs `game` until the player quits or input runs out.
pub fn play<R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    game: GameId,
    options: &PlayOptions,
) -> Result<()> {
    log::info!("starting {}", game);
    match game {
        GameId::TicTacToe => tictactoe::run(session, options),
        GameId::Snake => snake::run(session),
        GameId::Minesweeper => minesweeper::run(session, options),
        GameId::TwentyFortyEight => twenty48::run(session),
        GameId::FlappyBird => flappy::run(session),
        GameId::MemoryMatch => memory::run(session, options),
        GameId::TypingTest => typing::run(session),
    }
}

/// Parses a 1-based `row col` (or `row,col`) pair into grid coordinates.
pub fn parse_cell(text: &str) -> Option<Coord2> {
    let parts: Vec<&str> = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .collect();
    let [row, col] = parts.as_slice() else {
        return None;
    };
    let row: u8 = row.parse().ok()?;
    let col: u8 = col.parse().ok()?;
    Some((row.checked_sub(1)?, col.checked_sub(1)?))
}

/// Column numbers above a grid whose cells are `width` characters wide.
pub fn column_header(cols: u8, width: usize) -> String {
    let mut line = String::from("    ");
    for col in 1..=cols {
        line.push_str(&format!("{col:>width$}"));
    }
    line
}

/// Shows each rejected input to the player.
pub fn report<R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    errors: &[GameError],
) -> Result<()> {
    for err in errors {
        session.write_line(err.to_string())?;
    }
    Ok(())
}

/// Records the finished round, at most once per round.
pub fn settle<G: FrameGame, R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    controller: &mut arcade_core::Controller<G>,
) -> Result<()> {
    let submission = controller.take_submission();
    session.record(submission)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_one_based() {
        assert_eq!(parse_cell("1 1"), Some((0, 0)));
        assert_eq!(parse_cell(" 3,7 "), Some((2, 6)));
        assert_eq!(parse_cell("0 2"), None);
        assert_eq!(parse_cell("2"), None);
        assert_eq!(parse_cell("1 2 3"), None);
        assert_eq!(parse_cell("a b"), None);
    }

    #[test]
    fn header_is_right_aligned() {
        assert_eq!(column_header(3, 3), "      1  2  3");
    }
}
