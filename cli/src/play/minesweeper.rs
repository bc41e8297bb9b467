use anyhow::Result;
use arcade_core::minesweeper::{
    Difficulty, GameState, Input, MineGenerator, Minesweeper, RandomMineGenerator,
};
use arcade_core::{Controller, Coord2, iter_coords};
use std::fmt::Write as _;
use std::io::{BufRead, Write};
use std::time::Duration;

use super::{PlayOptions, column_header, parse_cell, report, settle};
use crate::session::{Clock, Session};

const HELP: &str = "Commands: <row> <col> to reveal, f <row> <col> to flag, \
                    d <easy|medium|hard>, n for a new game, q to quit";

#[derive(Copy, Clone, Debug, PartialEq)]
enum CellView {
    Hidden,
    Revealed(u8),
    Flagged,
    TriggeredMine,
    Mine,
    Misflagged,
}

impl CellView {
    fn symbol(self) -> char {
        use CellView::*;
        match self {
            Hidden => '#',
            Revealed(0) => '.',
            Revealed(count) => char::from(b'0' + count),
            Flagged => 'F',
            TriggeredMine => 'X',
            Mine => '*',
            Misflagged => '!',
        }
    }
}

fn cell_view<G: MineGenerator>(game: &Minesweeper<G>, coords: Coord2) -> CellView {
    let cell = game.board().cell(coords);
    match game.state() {
        GameState::Won if cell.is_mine => CellView::Flagged,
        GameState::Lost if cell.is_mine && cell.is_revealed => CellView::TriggeredMine,
        GameState::Lost if cell.is_mine && !cell.is_flagged => CellView::Mine,
        GameState::Won | GameState::Lost if cell.is_flagged && !cell.is_mine => {
            CellView::Misflagged
        }
        _ if cell.is_flagged => CellView::Flagged,
        _ if cell.is_revealed => CellView::Revealed(cell.neighbor_mines),
        _ => CellView::Hidden,
    }
}

fn render<G: MineGenerator>(game: &Minesweeper<G>) -> String {
    let (rows, cols) = game.board().size();
    let mut out = format!(
        "Minesweeper ({})   Mines left: {}   Time: {}s",
        game.difficulty(),
        game.mines_left(),
        game.elapsed_secs()
    );
    if let Some(best) = game.best_time() {
        let _ = write!(out, "   Best: {best}s");
    }
    out.push('\n');
    out.push_str(&column_header(cols, 3));
    for coords in iter_coords((rows, cols)) {
        if coords.1 == 0 {
            let _ = write!(out, "\n{:>3} ", coords.0 + 1);
        }
        let _ = write!(out, "{:>3}", cell_view(game, coords).symbol());
    }
    out.push('\n');
    out.push_str(match game.state() {
        GameState::Ready => "Reveal any cell to start; the first one is always safe.",
        GameState::Active => HELP,
        GameState::Won => "You cleared the board!",
        GameState::Lost => "Boom! You hit a mine.",
    });
    out
}

enum Command {
    Play(Input),
    Difficulty(Difficulty),
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    match line {
        "q" | "quit" => return Some(Command::Quit),
        "n" | "new" => return Some(Command::Play(Input::NewGame)),
        _ => {}
    }
    if let Some(rest) = line.strip_prefix("f ") {
        return parse_cell(rest).map(|coords| Command::Play(Input::ToggleFlag(coords)));
    }
    if let Some(rest) = line.strip_prefix("d ") {
        return rest.parse().ok().map(Command::Difficulty);
    }
    parse_cell(line).map(|coords| Command::Play(Input::Reveal(coords)))
}

pub fn run<R: BufRead, W: Write>(session: &mut Session<R, W>, options: &PlayOptions) -> Result<()> {
    let difficulty = match options.difficulty.as_deref() {
        Some(name) => name.parse().map_err(anyhow::Error::msg)?,
        None => session.settings.minesweeper,
    };
    let generator = RandomMineGenerator::new(session.next_seed());
    run_game(session, Minesweeper::new(difficulty, generator))
}

fn run_game<G: MineGenerator, R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    game: Minesweeper<G>,
) -> Result<()> {
    let mut controller = Controller::new(game);
    let mut clock = Clock::start();

    loop {
        session.write_line(render(controller.game()))?;
        let Some(line) = session.console.ask("> ")? else {
            break;
        };
        controller.tick(clock.lap());

        match parse_command(&line) {
            Some(Command::Quit) => break,
            Some(Command::Play(input)) => controller.push(input),
            Some(Command::Difficulty(difficulty)) => {
                controller.game_mut().set_difficulty(difficulty);
            }
            None => {
                session.write_line(HELP)?;
                continue;
            }
        }
        let errors = controller.tick(Duration::ZERO);
        report(session, &errors)?;
        settle(session, &mut controller)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::{output, session};
    use arcade_core::minesweeper::PresetMines;

    /// Easy board with a full row of mines across row 5.
    fn walled_game() -> Minesweeper<PresetMines> {
        let mut mines: Vec<Coord2> = (0..7).map(|col| (4, col)).collect();
        mines.extend([(7, 6), (7, 5), (6, 6)]);
        Minesweeper::new(Difficulty::Easy, PresetMines(mines))
    }

    #[test]
    fn losing_shows_every_mine() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session("1 1\nf 8 7\n5 1\nq\n", dir.path());

        run_game(&mut session, walled_game()).unwrap();

        let text = output(session);
        assert!(text.contains("Boom! You hit a mine."));
        assert!(text.contains("  5   X  *  *  *  *  *  *"));
        assert!(text.contains("  8   #  #  #  #  #  *  F"));
        assert!(text.contains("  1   .  .  .  .  .  .  ."));
    }

    #[test]
    fn moves_after_a_loss_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session("1 1\n5 1\n8 1\n", dir.path());

        run_game(&mut session, walled_game()).unwrap();

        assert!(output(session).contains("Game already ended, no new moves are accepted"));
    }

    #[test]
    fn unknown_commands_print_help() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session("explode\n9 9\nq\n", dir.path());

        run_game(&mut session, walled_game()).unwrap();

        let text = output(session);
        assert!(text.contains(HELP));
        assert!(text.contains("Invalid coordinates"));
    }

    #[test]
    fn difficulty_can_change_mid_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session("d hard\n", dir.path());

        run_game(&mut session, walled_game()).unwrap();

        assert!(output(session).contains("Minesweeper (hard)   Mines left: 80"));
    }

    #[test]
    fn command_parsing() {
        assert!(matches!(
            parse_command("f 2 3"),
            Some(Command::Play(Input::ToggleFlag((1, 2))))
        ));
        assert!(matches!(
            parse_command("4 5"),
            Some(Command::Play(Input::Reveal((3, 4))))
        ));
        assert!(matches!(
            parse_command("d medium"),
            Some(Command::Difficulty(Difficulty::Medium))
        ));
        assert!(parse_command("d extreme").is_none());
    }
}
