use anyhow::Result;
use arcade_core::memory::{Difficulty, Face, Input, MISMATCH_DELAY, MemoryMatch};
use arcade_core::{Controller, ToNdIndex, iter_coords};
use std::fmt::Write as _;
use std::io::{BufRead, Write};
use std::time::Duration;

use super::{PlayOptions, column_header, parse_cell, report, settle};
use crate::session::{Clock, Session};

const HELP: &str = "Commands: <row> <col> to turn a card, d <easy|medium|hard>, n for a new game, \
                    q to quit";

const FACE_DOWN: &str = "[]";

fn render(game: &MemoryMatch) -> String {
    let (rows, cols) = game.size();
    let mut out = format!(
        "Memory Match ({})   Attempts: {}   Pairs: {}/{}   Time: {}s\n",
        game.difficulty(),
        game.attempts(),
        game.pairs_found(),
        game.difficulty().pairs(),
        game.elapsed_secs()
    );
    out.push_str(&column_header(cols, 4));
    for coords in iter_coords((rows, cols)) {
        if coords.1 == 0 {
            let _ = write!(out, "\n{:>3} ", coords.0 + 1);
        }
        let card = game.cards()[coords.to_nd_index()];
        let face = match card.face {
            Face::Down => FACE_DOWN,
            Face::Up | Face::Matched => card.symbol(),
        };
        let _ = write!(out, "  {face}");
    }
    out.push('\n');
    if game.is_won() {
        let _ = write!(
            out,
            "You found every pair in {} attempts and {}s!",
            game.attempts(),
            game.elapsed_secs()
        );
    } else {
        out.push_str(HELP);
    }
    out
}

/// Game time ticked ahead of the wall clock by mismatch delays the terminal skips.
#[derive(Default)]
struct Ahead(Duration);

impl Ahead {
    /// The part of a wall-clock `lap` the game has not been ticked for yet.
    fn catch_up(&mut self, lap: Duration) -> Duration {
        let covered = lap.min(self.0);
        self.0 -= covered;
        lap - covered
    }
}

enum Command {
    Play(Input),
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    match line {
        "q" | "quit" => Some(Command::Quit),
        "n" | "new" => Some(Command::Play(Input::NewGame)),
        _ => match line.strip_prefix("d ") {
            Some(level) => level
                .parse()
                .ok()
                .map(|difficulty| Command::Play(Input::SetDifficulty(difficulty))),
            None => parse_cell(line).map(|coords| Command::Play(Input::Pick(coords))),
        },
    }
}

pub fn run<R: BufRead, W: Write>(session: &mut Session<R, W>, options: &PlayOptions) -> Result<()> {
    let difficulty: Difficulty = match options.difficulty.as_deref() {
        Some(name) => name.parse().map_err(anyhow::Error::msg)?,
        None => session.settings.memory,
    };
    let seed = session.next_seed();
    run_game(session, MemoryMatch::new(difficulty, seed))
}

fn run_game<R: BufRead, W: Write>(session: &mut Session<R, W>, game: MemoryMatch) -> Result<()> {
    let mut controller = Controller::new(game);
    let mut clock = Clock::start();
    let mut ahead = Ahead::default();

    loop {
        session.write_line(render(controller.game()))?;
        let Some(line) = session.console.ask("> ")? else {
            break;
        };
        controller.tick(ahead.catch_up(clock.lap()));

        match parse_command(&line) {
            Some(Command::Quit) => break,
            Some(Command::Play(input)) => {
                if !matches!(input, Input::Pick(_)) {
                    ahead = Ahead::default();
                }
                controller.push(input);
            }
            None => {
                session.write_line(HELP)?;
                continue;
            }
        }
        let errors = controller.tick(Duration::ZERO);
        report(session, &errors)?;

        if controller.game().is_locked() {
            session.write_line(render(controller.game()))?;
            session.write_line("No match.")?;
            controller.tick(MISMATCH_DELAY);
            ahead.0 += MISMATCH_DELAY;
        }
        settle(session, &mut controller)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::{output, session};
    use arcade_core::Coord2;

    fn cell((row, col): Coord2) -> String {
        format!("{} {}\n", row + 1, col + 1)
    }

    /// Script turning over every pair of `game` in order.
    fn solution(game: &MemoryMatch) -> String {
        let mut by_symbol: Vec<Vec<Coord2>> = vec![Vec::new(); game.difficulty().pairs()];
        for coords in iter_coords(game.size()) {
            let symbol = game.cards()[coords.to_nd_index()].symbol;
            by_symbol[usize::from(symbol)].push(coords);
        }
        by_symbol.into_iter().flatten().map(cell).collect()
    }

    #[test]
    fn clearing_the_board_records_the_score() {
        let dir = tempfile::tempdir().unwrap();
        let game = MemoryMatch::new(Difficulty::Easy, 5);
        let script = format!("{}ana\nq\n", solution(&game));
        let mut session = session(&script, dir.path());

        run_game(&mut session, game).unwrap();

        let entries = session.leaderboard.leaderboard("memory_match", 10);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].score, 9840.0);
        assert_eq!(entries[0].extra["attempts"], 8);
        assert_eq!(entries[0].extra["difficulty"], "Easy");
        assert!(output(session).contains("You found every pair in 8 attempts"));
    }

    #[test]
    fn mismatched_cards_flip_back() {
        let dir = tempfile::tempdir().unwrap();
        let game = MemoryMatch::new(Difficulty::Easy, 5);
        let first = game.cards()[[0, 0]].symbol;
        let other = iter_coords(game.size())
            .find(|&coords| game.cards()[coords.to_nd_index()].symbol != first)
            .unwrap();
        let script = format!("1 1\n{}q\n", cell(other));
        let mut session = session(&script, dir.path());

        run_game(&mut session, game).unwrap();

        let text = output(session);
        assert!(text.contains("No match."));
        let last = text.rsplit("Memory Match (").next().unwrap();
        assert_eq!(last.matches(FACE_DOWN).count(), 16);
        assert!(last.contains("Attempts: 1"));
    }

    #[test]
    fn skipped_delays_come_out_of_later_laps() {
        let mut ahead = Ahead::default();
        assert_eq!(ahead.catch_up(Duration::from_secs(2)), Duration::from_secs(2));

        ahead.0 = MISMATCH_DELAY;
        assert_eq!(ahead.catch_up(Duration::from_millis(200)), Duration::ZERO);
        assert_eq!(ahead.0, Duration::from_millis(500));
        assert_eq!(
            ahead.catch_up(Duration::from_millis(1500)),
            Duration::from_secs(1)
        );
        assert_eq!(ahead.0, Duration::ZERO);
    }

    #[test]
    fn difficulty_changes_deal_a_bigger_board() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session("d hard\nq\n", dir.path());

        run_game(&mut session, MemoryMatch::new(Difficulty::Easy, 1)).unwrap();

        let text = output(session);
        let last = text.rsplit("Memory Match (").next().unwrap();
        assert!(last.starts_with("Hard)"));
        assert_eq!(last.matches(FACE_DOWN).count(), 36);
    }
}
