use anyhow::Result;
use arcade_core::twenty48::{Input, TwentyFortyEight};
use arcade_core::{Controller, Direction};
use std::io::{BufRead, Write};
use std::time::Duration;

use super::{report, settle};
use crate::session::Session;

const HELP: &str = "Slide with w/a/s/d (several per line are fine), f to stop and keep the score, \
                    n for a new game, q to quit";

fn render(game: &TwentyFortyEight) -> String {
    let mut out = format!("2048   Score: {}   Best: {}\n", game.score(), game.best());
    for row in game.board().rows() {
        for &tile in row {
            if tile == 0 {
                out.push_str(&format!("{:>6}", '.'));
            } else {
                out.push_str(&format!("{tile:>6}"));
            }
        }
        out.push('\n');
    }
    if game.is_over() {
        out.push_str(&format!(
            "Game over! Final score: {}. n for a new game, q to quit",
            game.score()
        ));
    } else {
        out.push_str(HELP);
    }
    out
}

pub fn run<R: BufRead, W: Write>(session: &mut Session<R, W>) -> Result<()> {
    let seed = session.next_seed();
    run_game(session, TwentyFortyEight::new(seed))
}

fn run_game<R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    game: TwentyFortyEight,
) -> Result<()> {
    let mut controller = Controller::new(game);

    loop {
        session.write_line(render(controller.game()))?;
        let Some(line) = session.console.ask("> ")? else {
            break;
        };
        match line.as_str() {
            "q" | "quit" => break,
            "n" | "new" => controller.push(Input::NewGame),
            "f" | "finish" => controller.push(Input::Finish),
            keys => {
                let moves: Option<Vec<Direction>> = keys
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .map(|c| Direction::from_key(&c.to_string()))
                    .collect();
                match moves {
                    Some(moves) if !moves.is_empty() => {
                        for dir in moves {
                            controller.push(Input::Move(dir));
                        }
                    }
                    _ => {
                        session.write_line(HELP)?;
                        continue;
                    }
                }
            }
        }
        let errors = controller.tick(Duration::ZERO);
        // A burst of moves into a finished board only needs one notice.
        if let Some(err) = errors.first() {
            report(session, std::slice::from_ref(err))?;
        }
        settle(session, &mut controller)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::{output, session};
    use ndarray::Array2;

    fn pair_board() -> TwentyFortyEight {
        let mut board = Array2::zeros((5, 5));
        board[[0, 0]] = 2;
        board[[0, 1]] = 2;
        board[[4, 4]] = 8;
        TwentyFortyEight::with_board(board, 1)
    }

    #[test]
    fn tiles_line_up_in_columns() {
        let text = render(&pair_board());
        let rows: Vec<&str> = text.lines().collect();

        assert_eq!(rows[0], "2048   Score: 0   Best: 0");
        assert_eq!(rows[1], "     2     2     .     .     .");
        assert_eq!(rows[5], "     .     .     .     .     8");
    }

    #[test]
    fn stopping_early_records_the_score() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session("a\nf\nbo\nasd\nq\n", dir.path());

        run_game(&mut session, pair_board()).unwrap();

        let entries = session.leaderboard.leaderboard("2048_5x5", 10);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].score, 4.0);
        assert_eq!(entries[0].player, "bo");
        let text = output(session);
        assert!(text.contains("Game over! Final score: 4."));
        assert_eq!(
            text.matches("Game already ended, no new moves are accepted")
                .count(),
            1
        );
    }

    #[test]
    fn zero_scores_are_not_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session("f\nq\n", dir.path());

        run_game(&mut session, pair_board()).unwrap();

        assert!(session.leaderboard.games().is_empty());
    }
}
