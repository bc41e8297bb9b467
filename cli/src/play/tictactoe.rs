use anyhow::Result;
use arcade_core::Controller;
use arcade_core::tictactoe::{
    BOT, BOT_OPENING_DELAY, BotDifficulty, Input, Mark, Mode, Position, TicTacToe,
};
use std::io::{BufRead, Write};
use std::time::Duration;

use super::{PlayOptions, parse_cell, report};
use crate::session::Session;

const HELP: &str = "Commands: 1-9 or <row> <col> to play, n for a new round, q to quit";

fn render(game: &TicTacToe) -> String {
    let board = game.board();
    let rows: Vec<String> = (0..3u8)
        .map(|row| {
            let cells: Vec<String> = (0..3u8)
                .map(|col| match board.get((row, col)) {
                    Some(mark) => format!(" {mark} "),
                    None => format!(" {} ", row * 3 + col + 1),
                })
                .collect();
            cells.join("|")
        })
        .collect();
    format!(
        "{}\n{}\n{}",
        rows.join("\n---+---+---\n"),
        game.status(),
        game.tally_line()
    )
}

fn parse_position(line: &str) -> Option<Position> {
    match line.parse::<u8>() {
        Ok(n @ 1..=9) => Some(((n - 1) / 3, (n - 1) % 3)),
        Ok(_) => None,
        Err(_) => parse_cell(line),
    }
}

fn mode(default: BotDifficulty, options: &PlayOptions) -> Result<Mode> {
    if options.two_player {
        return Ok(Mode::TwoPlayer {
            first: options.first.unwrap_or(Mark::X),
        });
    }
    let difficulty = match options.difficulty.as_deref() {
        Some(name) => name.parse().map_err(anyhow::Error::msg)?,
        None => default,
    };
    Ok(Mode::VsBot {
        difficulty,
        human_starts: !options.bot_starts && options.first != Some(BOT),
    })
}

/// Asks until `parse` accepts the answer; an empty answer picks `default`.
fn choose<R: BufRead, W: Write, T>(
    session: &mut Session<R, W>,
    prompt: &str,
    default: T,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<Option<T>> {
    loop {
        let Some(answer) = session.console.ask(prompt)? else {
            return Ok(None);
        };
        if answer.is_empty() {
            return Ok(Some(default));
        }
        match parse(&answer) {
            Ok(value) => return Ok(Some(value)),
            Err(msg) => session.write_line(msg)?,
        }
    }
}

/// Mode, bot difficulty, and first player, asked before the first round.
fn ask_mode<R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    default: BotDifficulty,
) -> Result<Option<Mode>> {
    let two_player = choose(
        session,
        "Play against the (b)ot or (t)wo players? [b] ",
        false,
        |answer| match answer.to_ascii_lowercase().as_str() {
            "b" | "bot" | "1" => Ok(false),
            "t" | "two" | "2" => Ok(true),
            _ => Err("Please type b or t".to_string()),
        },
    )?;
    let Some(two_player) = two_player else {
        return Ok(None);
    };
    if two_player {
        let first = choose(session, "Who starts, X or O? [X] ", Mark::X, |answer| {
            answer.parse()
        })?;
        return Ok(first.map(|first| Mode::TwoPlayer { first }));
    }

    let prompt = format!("Bot difficulty (easy, hard, impossible)? [{default}] ");
    let Some(difficulty) = choose(session, &prompt, default, |answer| answer.parse())? else {
        return Ok(None);
    };
    let human_starts = choose(
        session,
        "Who starts, (y)ou or the (b)ot? [y] ",
        true,
        |answer| match answer.to_ascii_lowercase().as_str() {
            "y" | "you" | "me" => Ok(true),
            "b" | "bot" => Ok(false),
            _ => Err("Please type y or b".to_string()),
        },
    )?;
    Ok(human_starts.map(|human_starts| Mode::VsBot {
        difficulty,
        human_starts,
    }))
}

pub fn run<R: BufRead, W: Write>(session: &mut Session<R, W>, options: &PlayOptions) -> Result<()> {
    let default = session.settings.tic_tac_toe;
    let mode = if *options == PlayOptions::default() {
        match ask_mode(session, default)? {
            Some(mode) => mode,
            None => return Ok(()),
        }
    } else {
        mode(default, options)?
    };
    let mut controller = Controller::new(TicTacToe::new(mode, session.next_seed()));

    loop {
        // Bot delays elapse at once in the terminal.
        while controller.game().bot_pending() {
            controller.tick(BOT_OPENING_DELAY);
        }
        session.write_line(render(controller.game()))?;
        let Some(line) = session.console.ask("> ")? else {
            break;
        };
        match line.as_str() {
            "q" | "quit" => break,
            "n" | "new" => controller.push(Input::Reset),
            other => match parse_position(other) {
                Some(pos) => controller.push(Input::Play(pos)),
                None => {
                    session.write_line(HELP)?;
                    continue;
                }
            },
        }
        let errors = controller.tick(Duration::ZERO);
        report(session, &errors)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::{output, session};

    fn two_player() -> PlayOptions {
        PlayOptions {
            two_player: true,
            ..PlayOptions::default()
        }
    }

    #[test]
    fn two_players_share_the_board() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session("1\n4\n2\n5\n3\nn\nq\n", dir.path());

        run(&mut session, &two_player()).unwrap();

        let text = output(session);
        assert!(text.contains(" X | X | X "));
        assert!(text.contains("Player X wins!"));
        assert!(text.contains("X wins: 1   O wins: 0   Draws: 0"));
        assert!(text.contains(" 1 | 2 | 3 \n---+---+---\n 4 | 5 | 6 "));
    }

    #[test]
    fn bot_opens_in_the_first_corner() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session("q\n", dir.path());
        let options = PlayOptions {
            difficulty: Some("impossible".into()),
            bot_starts: true,
            ..PlayOptions::default()
        };

        run(&mut session, &options).unwrap();

        let text = output(session);
        assert!(text.contains(" O | 2 | 3 "));
        assert!(text.contains("Your turn (X)"));
    }

    #[test]
    fn taken_cells_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session("1\n1\nq\n", dir.path());
        let options = PlayOptions {
            difficulty: Some("impossible".into()),
            ..PlayOptions::default()
        };

        run(&mut session, &options).unwrap();

        assert!(output(session).contains("Cell is already taken"));
    }

    #[test]
    fn unknown_difficulty_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session("", dir.path());
        let options = PlayOptions {
            difficulty: Some("brutal".into()),
            ..PlayOptions::default()
        };

        assert!(run(&mut session, &options).is_err());
    }

    #[test]
    fn options_pick_who_opens() {
        let options = PlayOptions {
            two_player: true,
            first: Some(Mark::O),
            ..PlayOptions::default()
        };
        assert_eq!(
            mode(BotDifficulty::Easy, &options).unwrap(),
            Mode::TwoPlayer { first: Mark::O }
        );

        let options = PlayOptions {
            first: Some(Mark::O),
            ..PlayOptions::default()
        };
        assert_eq!(
            mode(BotDifficulty::Hard, &options).unwrap(),
            Mode::VsBot {
                difficulty: BotDifficulty::Hard,
                human_starts: false,
            }
        );
    }

    #[test]
    fn setup_questions_choose_two_players_with_o_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session("t\no\n5\nq\n", dir.path());

        run(&mut session, &PlayOptions::default()).unwrap();

        let text = output(session);
        assert!(text.contains("Player O's turn"));
        assert!(text.contains(" 4 | O | 6 "));
        assert!(text.contains("Player X's turn"));
    }

    #[test]
    fn setup_questions_choose_difficulty_and_bot_start() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session("b\nbrutal\nimpossible\nb\nq\n", dir.path());

        run(&mut session, &PlayOptions::default()).unwrap();

        let text = output(session);
        assert!(text.contains("Please type: easy, hard, or impossible"));
        assert!(text.contains(" O | 2 | 3 "));
        assert!(text.contains("Your turn (X)"));
    }

    #[test]
    fn empty_setup_answers_take_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session("\n\n\nq\n", dir.path());

        run(&mut session, &PlayOptions::default()).unwrap();

        let text = output(session);
        assert!(text.contains("[easy]"));
        assert!(text.contains(" 1 | 2 | 3 "));
        assert!(text.contains("Your turn (X)"));
    }

    #[test]
    fn input_ending_during_setup_plays_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session("b\n", dir.path());

        run(&mut session, &PlayOptions::default()).unwrap();

        assert!(!output(session).contains("Your turn"));
    }

    #[test]
    fn positions_accept_numbers_and_cells() {
        assert_eq!(parse_position("5"), Some((1, 1)));
        assert_eq!(parse_position("9"), Some((2, 2)));
        assert_eq!(parse_position("3 1"), Some((2, 0)));
        assert_eq!(parse_position("0"), None);
        assert_eq!(parse_position("10"), None);
    }
}
