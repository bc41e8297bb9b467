//! Typing speed test over a fixed set of sentences.

use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::*;

pub const SENTENCES: [&str; 8] = [
    "The quick brown fox jumps over the lazy dog.",
    "Python is a great language for learning to code.",
    "Typing fast and accurately takes practice and focus.",
    "Games are a fun way to improve programming skills.",
    "Never stop learning because life never stops teaching.",
    "Smooth code and clean design make projects enjoyable.",
    "Writing your own games is a powerful way to learn.",
    "Practice every day and you will see real progress.",
];

/// Characters per word in the WPM formula.
const CHARS_PER_WORD: f64 = 5.0;

const MIN_ELAPSED: Duration = Duration::from_millis(1);

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypingResult {
    pub wpm: f64,
    /// Percentage of positions matching the target.
    pub accuracy: f64,
    pub time_s: f64,
}

impl TypingResult {
    pub fn score(&self) -> u32 {
        (self.wpm * self.accuracy / 100.0).floor().max(1.0) as u32
    }
}

/// Speed and accuracy of `typed` against `target` over `elapsed`.
pub fn measure(typed: &str, target: &str, elapsed: Duration) -> TypingResult {
    let secs = elapsed.max(MIN_ELAPSED).as_secs_f64();
    let typed_len = typed.chars().count();
    let wpm = (typed_len as f64 / CHARS_PER_WORD) / (secs / 60.0);

    let correct = typed
        .chars()
        .zip(target.chars())
        .filter(|(a, b)| a == b)
        .count();
    let max_len = typed_len.max(target.chars().count()).max(1);
    let accuracy = correct as f64 / max_len as f64 * 100.0;

    TypingResult {
        wpm,
        accuracy,
        time_s: secs,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Key(char),
    Backspace,
    /// Replaces everything typed so far.
    Text(String),
    Finish,
    NewTest,
}

pub struct TypingTest {
    target: &'static str,
    typed: String,
    started: bool,
    elapsed: Duration,
    result: Option<TypingResult>,
    rng: SmallRng,
    round: u32,
}

impl TypingTest {
    pub fn new(seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let target = SENTENCES.choose(&mut rng).copied().unwrap_or(SENTENCES[0]);
        Self::with_rng(target, rng)
    }

    pub fn with_text(target: &'static str, seed: u64) -> Self {
        Self::with_rng(target, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(target: &'static str, rng: SmallRng) -> Self {
        Self {
            target,
            typed: String::new(),
            started: false,
            elapsed: Duration::ZERO,
            result: None,
            rng,
            round: 0,
        }
    }

    pub fn target(&self) -> &'static str {
        self.target
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn result(&self) -> Option<TypingResult> {
        self.result
    }

    fn check_open(&self) -> Result<()> {
        if self.result.is_some() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }

    /// Any keystroke starts the clock.
    pub fn key(&mut self, c: char) -> Result<()> {
        self.check_open()?;
        self.started = true;
        self.typed.push(c);
        Ok(())
    }

    pub fn backspace(&mut self) -> Result<()> {
        self.check_open()?;
        self.started = true;
        self.typed.pop();
        Ok(())
    }

    pub fn set_text(&mut self, text: &str) -> Result<()> {
        self.check_open()?;
        self.started = true;
        self.typed = text.trim_end_matches(['\r', '\n']).to_string();
        Ok(())
    }

    /// Stops the clock and scores what was typed.
    pub fn finish(&mut self) -> Result<TypingResult> {
        self.check_open()?;
        if !self.started {
            return Err(GameError::NotStarted);
        }
        let result = measure(&self.typed, self.target, self.elapsed);
        log::debug!(
            "finished: {:.1} wpm, {:.1}% in {:.1}s",
            result.wpm,
            result.accuracy,
            result.time_s
        );
        self.result = Some(result);
        Ok(result)
    }

    pub fn new_test(&mut self) {
        self.target = SENTENCES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(SENTENCES[0]);
        self.typed.clear();
        self.started = false;
        self.elapsed = Duration::ZERO;
        self.result = None;
        self.round += 1;
    }
}

impl FrameGame for TypingTest {
    type Input = Input;

    fn handle(&mut self, input: Input) -> Result<()> {
        match input {
            Input::Key(c) => self.key(c),
            Input::Backspace => self.backspace(),
            Input::Text(text) => self.set_text(&text),
            Input::Finish => self.finish().map(drop),
            Input::NewTest => {
                self.new_test();
                Ok(())
            }
        }
    }

    fn advance(&mut self, dt: Duration) {
        if self.started && self.result.is_none() {
            self.elapsed += dt;
        }
    }

    fn is_finished(&self) -> bool {
        self.result.is_some()
    }

    fn submission(&self) -> Option<Submission> {
        let result = self.result?;
        Some(
            Submission::new(GameId::TypingTest, f64::from(result.score()))
                .with("wpm", round1(result.wpm))
                .with("accuracy", round1(result.accuracy))
                .with("time_s", round1(result.time_s)),
        )
    }

    fn round(&self) -> u32 {
        self.round
    }
}
