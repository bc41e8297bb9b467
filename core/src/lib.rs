//! Rules and state for a bundle of small single-player arcade games.
//!
//! Every game is a plain state struct implementing [`FrameGame`], driven by a [`Controller`] that
//! owns it. Finished rounds produce a [`Submission`] for the shared [`Leaderboard`].

pub use catalog::*;
pub use error::*;
pub use frame::*;
pub use leaderboard::{
    DEFAULT_FILE_NAME, DEFAULT_LIMIT, Leaderboard, LeaderboardError, MAX_ENTRIES, ScoreEntry,
    Scores, Submission, format_entry, record,
};
pub use types::*;

pub mod flappy;
pub mod leaderboard;
pub mod memory;
pub mod minesweeper;
pub mod snake;
pub mod tictactoe;
pub mod twenty48;
pub mod typing;

mod catalog;
mod error;
mod frame;
mod types;

/// Name used when a player does not give one.
pub const DEFAULT_PLAYER: &str = "Player";

/// Falls back to [`DEFAULT_PLAYER`] for blank names.
pub fn player_name(name: &str) -> &str {
    let name = name.trim();
    if name.is_empty() { DEFAULT_PLAYER } else { name }
}

/// Whole seconds in `elapsed`, the unit every game reports times in.
pub(crate) fn whole_secs(elapsed: std::time::Duration) -> u32 {
    elapsed.as_secs().try_into().unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_player_names_fall_back() {
        assert_eq!(player_name("  "), DEFAULT_PLAYER);
        assert_eq!(player_name(" ana "), "ana");
    }
}
