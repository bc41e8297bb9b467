use anyhow::Result;
use arcade_core::Controller;
use arcade_core::flappy::{BIRD_X, FRAME, Flappy, GROUND_Y, HEIGHT, Input, WIDTH};
use std::io::{BufRead, Write};
use std::time::Duration;

use super::settle;
use crate::session::Session;

/// Screen pixels per character cell.
const CELL_WIDTH: f64 = 20.0;
const CELL_HEIGHT: f64 = 40.0;

/// Frames played per typed key.
const FRAMES_PER_KEY: u32 = 8;

const HELP: &str = "f flaps then glides, . or an empty line glides; several per line are fine. \
                    q quits";

fn render(game: &Flappy) -> String {
    let cols = (WIDTH / CELL_WIDTH) as usize;
    let rows = (HEIGHT / CELL_HEIGHT) as usize;
    let bird = ((BIRD_X / CELL_WIDTH) as usize, (game.bird_y() / CELL_HEIGHT) as usize);

    let mut out = format!("Flappy Bird   Score: {}   Best: {}\n", game.score(), game.best());
    for row in 0..rows {
        let y = (row as f64 + 0.5) * CELL_HEIGHT;
        for col in 0..cols {
            let x = (col as f64 + 0.5) * CELL_WIDTH;
            let inside = |(x1, y1, x2, y2): (f64, f64, f64, f64)| {
                (x1..=x2).contains(&x) && (y1..=y2).contains(&y)
            };
            let c = if y >= GROUND_Y {
                '='
            } else if (col, row) == bird {
                '>'
            } else if game
                .pipes()
                .iter()
                .any(|pipe| pipe.rects().into_iter().any(inside))
            {
                '|'
            } else {
                ' '
            };
            out.push(c);
        }
        out.push('\n');
    }
    if game.is_over() {
        out.push_str(&format!(
            "Crashed! Score: {}. f to fly again, q to quit",
            game.score()
        ));
    } else {
        out.push_str(HELP);
    }
    out
}

pub fn run<R: BufRead, W: Write>(session: &mut Session<R, W>) -> Result<()> {
    let seed = session.next_seed();
    run_game(session, Flappy::new(seed))
}

fn run_game<R: BufRead, W: Write>(session: &mut Session<R, W>, game: Flappy) -> Result<()> {
    let mut controller = Controller::new(game);
    let per_key: Duration = FRAME * FRAMES_PER_KEY;

    loop {
        session.write_line(render(controller.game()))?;
        let Some(line) = session.console.ask("> ")? else {
            break;
        };
        if matches!(line.as_str(), "q" | "quit") {
            break;
        }
        let keys: Vec<char> = if line.is_empty() {
            vec!['.']
        } else {
            line.chars().filter(|c| !c.is_whitespace()).collect()
        };
        for key in keys {
            match key {
                'f' => controller.push(Input::Flap),
                '.' => {}
                _ => {
                    session.write_line(HELP)?;
                    break;
                }
            }
            controller.run_for(per_key, FRAME);
            settle(session, &mut controller)?;
        }
    }
    Ok(())
}
