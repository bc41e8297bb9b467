use anyhow::Result;
use arcade_core::{GameId, MAX_ENTRIES, UnknownGame};
use std::io::{BufRead, Write};

use crate::play::{self, PlayOptions};
use crate::scores;
use crate::session::Session;

/// A menu number (1-based) or any name [`GameId`] accepts.
fn parse_choice(text: &str) -> Result<GameId, UnknownGame> {
    match text.parse::<usize>() {
        Ok(n) => n
            .checked_sub(1)
            .and_then(|i| GameId::ALL.get(i).copied())
            .ok_or_else(|| UnknownGame(text.to_string())),
        Err(_) => text.parse(),
    }
}

fn menu() -> String {
    let mut out = String::from("=== Arcade ===\n");
    for (i, game) in GameId::ALL.iter().enumerate() {
        out.push_str(&format!("{:>2}. {}\n", i + 1, game.title()));
    }
    out.push_str(" l. Leaderboards\n q. Quit");
    out
}

/// Launcher loop: pick a game, play it, come back.
pub fn run<R: BufRead, W: Write>(session: &mut Session<R, W>) -> Result<()> {
    loop {
        session.write_line(menu())?;
        let Some(choice) = session.console.ask("Choose a game: ")? else {
            break;
        };
        match choice.as_str() {
            "" => continue,
            "q" | "quit" => break,
            "l" | "leaderboard" | "leaderboards" => scores::show(session, None, MAX_ENTRIES)?,
            other => match parse_choice(other) {
                Ok(game) => play::play(session, game, &PlayOptions::default())?,
                Err(err) => session.write_line(err.to_string())?,
            },
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::{output, session};

    #[test]
    fn choices_by_number_or_name() {
        assert_eq!(parse_choice("1"), Ok(GameId::TicTacToe));
        assert_eq!(parse_choice("7"), Ok(GameId::TypingTest));
        assert_eq!(parse_choice("memory"), Ok(GameId::MemoryMatch));
        assert_eq!(parse_choice("0"), Err(UnknownGame("0".into())));
        assert_eq!(parse_choice("8"), Err(UnknownGame("8".into())));
    }

    #[test]
    fn menu_lists_every_game() {
        let text = menu();
        assert!(text.starts_with("=== Arcade ===\n 1. Tic Tac Toe\n 2. Snake\n"));
        assert!(text.contains(" 7. Typing Speed Test\n l. Leaderboards\n q. Quit"));
    }

    #[test]
    fn launcher_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session("9\n2\nq\nl\nq\n", dir.path());

        run(&mut session).unwrap();

        let text = output(session);
        assert!(text.contains("Unknown game: 9"));
        assert!(text.contains("Snake   Score: 0   High: 0"));
        assert!(text.contains("No scores available yet."));
        assert_eq!(text.matches("=== Arcade ===").count(), 4);
    }
}
