use anyhow::Result;
use arcade_core::{GameId, ScoreEntry, format_entry};
use std::io::{BufRead, Write};

use crate::session::Session;

fn write_entries<R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    title: &str,
    entries: &[ScoreEntry],
) -> Result<()> {
    session.write_line(format!("=== {title} ==="))?;
    if entries.is_empty() {
        session.write_line("No scores for this game yet.")?;
    }
    for (i, entry) in entries.iter().enumerate() {
        session.write_line(format_entry(i + 1, entry))?;
    }
    Ok(())
}

/// Prints the best `limit` entries of `game`, or of every game with scores.
pub fn show<R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    game: Option<GameId>,
    limit: usize,
) -> Result<()> {
    if let Some(game) = game {
        if !game.keeps_scores() {
            session.write_line(format!("{} does not keep scores.", game.title()))?;
            return Ok(());
        }
        let entries = session.leaderboard.leaderboard(game.key(), limit);
        return write_entries(session, game.title(), &entries);
    }

    let keys = session.leaderboard.games();
    if keys.is_empty() {
        session.write_line("No scores available yet.")?;
    }
    for key in keys {
        // Keys written by other tools are listed under their raw name.
        let title = key.parse::<GameId>().map_or(key.as_str(), |game| game.title());
        let entries = session.leaderboard.leaderboard(&key, limit);
        write_entries(session, title, &entries)?;
    }
    Ok(())
}
