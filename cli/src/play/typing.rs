use anyhow::Result;
use arcade_core::Controller;
use arcade_core::typing::{Input, TypingResult, TypingTest};
use std::io::{BufRead, Write};
use std::time::Duration;

use super::{report, settle};
use crate::session::{Clock, Session};

fn summary(result: &TypingResult) -> String {
    format!(
        "WPM: {:.1}   Accuracy: {:.1}%   Time: {:.1}s   Score: {}",
        result.wpm,
        result.accuracy,
        result.time_s,
        result.score()
    )
}

pub fn run<R: BufRead, W: Write>(session: &mut Session<R, W>) -> Result<()> {
    let seed = session.next_seed();
    run_game(session, TypingTest::new(seed))
}

fn run_game<R: BufRead, W: Write>(session: &mut Session<R, W>, game: TypingTest) -> Result<()> {
    let mut controller = Controller::new(game);

    loop {
        session.write_line("Type this sentence as fast and accurately as you can:")?;
        session.write_line(format!("\n    {}\n", controller.game().target()))?;
        let Some(answer) = session
            .console
            .ask("Press Enter when ready (q to quit): ")?
        else {
            break;
        };
        if answer == "q" {
            break;
        }

        // The clock starts as soon as the prompt appears.
        controller.push(Input::Text(String::new()));
        controller.tick(Duration::ZERO);
        let mut clock = Clock::start();
        let Some(typed) = session.console.read_raw("    ")? else {
            break;
        };
        controller.tick(clock.lap());
        controller.push(Input::Text(typed));
        controller.push(Input::Finish);
        let errors = controller.tick(Duration::ZERO);
        report(session, &errors)?;

        if let Some(result) = controller.game().result() {
            session.write_line(summary(&result))?;
        }
        settle(session, &mut controller)?;

        let again = session.console.ask("Another test? [y/N] ")?;
        if !again.is_some_and(|answer| answer.eq_ignore_ascii_case("y")) {
            break;
        }
        controller.push(Input::NewTest);
        controller.tick(Duration::ZERO);
    }
    Ok(())
}
