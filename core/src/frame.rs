//! Tick-driven ownership of a single game.
//!
//! A [`Controller`] is the only owner of a game's state. Front-ends push input events as they arrive
//! and call [`Controller::tick`] on a fixed timer; each tick first drains the queued inputs into
//! the game, then advances game time. Nothing inside a game reads the wall clock.

use std::collections::VecDeque;
use std::time::Duration;

use crate::{GameError, Submission};

pub trait FrameGame {
    type Input;

    /// Applies one input event.
    fn handle(&mut self, input: Self::Input) -> crate::Result<()>;

    /// Advances game time by `dt`.
    fn advance(&mut self, dt: Duration);

    /// Whether the current round is over.
    fn is_finished(&self) -> bool;

    /// Leaderboard entry earned by the current round, if any.
    fn submission(&self) -> Option<Submission> {
        None
    }

    /// Counter bumped on every new round, so a restarted game may submit again.
    fn round(&self) -> u32;
}

pub struct Controller<G: FrameGame> {
    game: G,
    inputs: VecDeque<G::Input>,
    clock: Duration,
    submitted_round: Option<u32>,
}

impl<G: FrameGame> Controller<G> {
    pub fn new(game: G) -> Self {
        Self {
            game,
            inputs: VecDeque::new(),
            clock: Duration::ZERO,
            submitted_round: None,
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    pub fn into_game(self) -> G {
        self.game
    }

    /// Total time ticked so far.
    pub fn clock(&self) -> Duration {
        self.clock
    }

    pub fn pending_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn push(&mut self, input: G::Input) {
        self.inputs.push_back(input);
    }

    /// Drains queued inputs into the game, then advances it by `dt`.
    ///
    /// Rejected inputs do not stop the tick; their errors are returned in queue order.
    pub fn tick(&mut self, dt: Duration) -> Vec<GameError> {
        let mut errors = Vec::new();
        while let Some(input) = self.inputs.pop_front() {
            if let Err(err) = self.game.handle(input) {
                log::debug!("input rejected: {}", err);
                errors.push(err);
            }
        }
        self.game.advance(dt);
        self.clock += dt;
        errors
    }

    /// Ticks repeatedly in `step` increments until `total` has elapsed.
    pub fn run_for(&mut self, total: Duration, step: Duration) -> Vec<GameError> {
        if step.is_zero() {
            return self.tick(total);
        }
        let mut errors = Vec::new();
        let mut remaining = total;
        while !remaining.is_zero() {
            let dt = remaining.min(step);
            errors.extend(self.tick(dt));
            remaining -= dt;
        }
        errors
    }

    /// The finished round's submission, handed out at most once per round.
    pub fn take_submission(&mut self) -> Option<Submission> {
        if !self.game.is_finished() {
            return None;
        }
        let round = self.game.round();
        if self.submitted_round == Some(round) {
            return None;
        }
        let submission = self.game.submission()?;
        self.submitted_round = Some(round);
        Some(submission)
    }
}
