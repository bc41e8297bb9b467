use anyhow::Result;
use arcade_core::snake::{HEIGHT, Input, Snake, WIDTH};
use arcade_core::{Controller, Direction};
use std::io::{BufRead, Write};
use std::time::Duration;

use super::{report, settle};
use crate::session::Session;

const HELP: &str = "Each w/a/s/d turns and moves one step, . or an empty line steps straight ahead; \
                    n restarts, q quits";

fn render(game: &Snake) -> String {
    let mut grid = vec![vec!['.'; WIDTH as usize]; HEIGHT as usize];
    let mut put = |(x, y): (i16, i16), c: char| grid[y as usize][x as usize] = c;
    for &cell in game.walls() {
        put(cell, '#');
    }
    for &cell in game.foods() {
        put(cell, '*');
    }
    for cell in game.body() {
        put(cell, 'o');
    }
    put(game.head(), '@');

    let mut out = format!(
        "Snake   Score: {}   High: {}   Time: {}s\n",
        game.score(),
        game.high_score(),
        game.elapsed_secs()
    );
    for row in grid {
        out.extend(row);
        out.push('\n');
    }
    if game.is_alive() {
        out.push_str(HELP);
    } else {
        out.push_str(&format!(
            "Game over! Score: {}. n to play again, q to quit",
            game.score()
        ));
    }
    out
}

/// Exactly one step at the pace the game has reached.
fn step(controller: &mut Controller<Snake>) -> Vec<arcade_core::GameError> {
    let wait = controller.game().until_next_step();
    controller.tick(wait)
}

pub fn run<R: BufRead, W: Write>(session: &mut Session<R, W>) -> Result<()> {
    let seed = session.next_seed();
    run_game(session, Snake::new(seed))
}

fn run_game<R: BufRead, W: Write>(session: &mut Session<R, W>, game: Snake) -> Result<()> {
    let mut controller = Controller::new(game);

    loop {
        session.write_line(render(controller.game()))?;
        let Some(line) = session.console.ask("> ")? else {
            break;
        };
        match line.as_str() {
            "q" | "quit" => break,
            "n" | "new" => {
                controller.push(Input::Restart);
                controller.tick(Duration::ZERO);
                continue;
            }
            "" => {
                let errors = step(&mut controller);
                report(session, &errors)?;
            }
            keys => {
                for key in keys.chars().filter(|c| !c.is_whitespace()) {
                    if !controller.game().is_alive() {
                        break;
                    }
                    if key != '.' {
                        let Some(dir) = Direction::from_key(&key.to_string()) else {
                            session.write_line(HELP)?;
                            break;
                        };
                        controller.push(Input::Turn(dir));
                    }
                    let errors = step(&mut controller);
                    report(session, &errors)?;
                }
            }
        }
        settle(session, &mut controller)?;
    }
    Ok(())
}
