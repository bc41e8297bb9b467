//! Flappy Bird with fixed 20 ms physics frames and pipes that tighten as the score grows.

use rand::prelude::*;
use std::time::Duration;

use crate::*;

pub const FRAME: Duration = Duration::from_millis(20);

pub const WIDTH: f64 = 400.0;
pub const HEIGHT: f64 = 600.0;
pub const GROUND_Y: f64 = HEIGHT - 50.0;

pub const BIRD_X: f64 = 80.0;
pub const BIRD_RADIUS: f64 = 14.0;
pub const PIPE_WIDTH: f64 = 70.0;

const GRAVITY: f64 = 0.55;
const FLAP_VELOCITY: f64 = -9.0;

const BASE_PIPE_GAP: f64 = 190.0;
const MIN_PIPE_GAP: f64 = 130.0;
const BASE_SPAWN_INTERVAL_MS: f64 = 1800.0;
const MIN_SPAWN_INTERVAL_MS: f64 = 1000.0;
const BASE_PIPE_SPEED: f64 = 3.0;
const MAX_PIPE_SPEED: f64 = 5.0;
const BASE_MIN_DISTANCE: f64 = 200.0;
const MIN_MIN_DISTANCE: f64 = 140.0;
const SPAWN_RETRY: Duration = Duration::from_millis(200);
const GAP_TOP_MIN: f64 = 100.0;
const GAP_BOTTOM_MAX: f64 = HEIGHT - 150.0;

/// Ramps from 0 at score 0 to 1 at score 10.
fn difficulty(score: u32) -> f64 {
    (f64::from(score) / 10.0).min(1.0)
}

fn lerp(from: f64, to: f64, f: f64) -> f64 {
    from - (from - to) * f
}

pub fn pipe_gap(score: u32) -> f64 {
    lerp(BASE_PIPE_GAP, MIN_PIPE_GAP, difficulty(score)).trunc()
}

pub fn spawn_interval(score: u32) -> Duration {
    let ms = lerp(BASE_SPAWN_INTERVAL_MS, MIN_SPAWN_INTERVAL_MS, difficulty(score));
    Duration::from_millis(ms as u64)
}

pub fn min_pipe_distance(score: u32) -> f64 {
    lerp(BASE_MIN_DISTANCE, MIN_MIN_DISTANCE, difficulty(score)).trunc()
}

/// Pixels per frame; reaches its maximum at score 15.
pub fn pipe_speed(score: u32) -> f64 {
    let f = (f64::from(score) / 15.0).min(1.0);
    BASE_PIPE_SPEED + (MAX_PIPE_SPEED - BASE_PIPE_SPEED) * f
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pipe {
    /// Left edge.
    pub x: f64,
    /// Bottom of the upper pipe.
    pub gap_y: f64,
    pub gap: f64,
    pub passed: bool,
}

impl Pipe {
    /// Upper and lower pipe as `(x1, y1, x2, y2)`.
    pub fn rects(&self) -> [(f64, f64, f64, f64); 2] {
        let x2 = self.x + PIPE_WIDTH;
        [
            (self.x, 0.0, x2, self.gap_y),
            (self.x, self.gap_y + self.gap, x2, GROUND_Y),
        ]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Input {
    /// Flaps, or restarts once the round is over.
    Flap,
}

pub struct Flappy {
    bird_y: f64,
    bird_vy: f64,
    pipes: Vec<Pipe>,
    score: u32,
    best: u32,
    over: bool,
    since_frame: Duration,
    spawn_timer: Duration,
    rng: SmallRng,
    round: u32,
}

impl Flappy {
    pub fn new(seed: u64) -> Self {
        Self::with_pipes(Vec::new(), seed)
    }

    pub fn with_pipes(pipes: Vec<Pipe>, seed: u64) -> Self {
        Self {
            bird_y: HEIGHT / 2.0,
            bird_vy: 0.0,
            pipes,
            score: 0,
            best: 0,
            over: false,
            since_frame: Duration::ZERO,
            spawn_timer: spawn_interval(0),
            rng: SmallRng::seed_from_u64(seed),
            round: 0,
        }
    }

    pub fn bird_y(&self) -> f64 {
        self.bird_y
    }

    pub fn bird_vy(&self) -> f64 {
        self.bird_vy
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn flap(&mut self) {
        if self.over {
            self.restart();
        } else {
            self.bird_vy = FLAP_VELOCITY;
        }
    }

    fn restart(&mut self) {
        self.bird_y = HEIGHT / 2.0;
        self.bird_vy = 0.0;
        self.pipes.clear();
        self.score = 0;
        self.over = false;
        self.since_frame = Duration::ZERO;
        self.spawn_timer = spawn_interval(0);
        self.round += 1;
    }

    fn bird_hits(&self, (x1, y1, x2, y2): (f64, f64, f64, f64)) -> bool {
        let (bx1, by1) = (BIRD_X - BIRD_RADIUS, self.bird_y - BIRD_RADIUS);
        let (bx2, by2) = (BIRD_X + BIRD_RADIUS, self.bird_y + BIRD_RADIUS);
        !(bx2 < x1 || bx1 > x2 || by2 < y1 || by1 > y2)
    }

    /// One physics frame: gravity, ceiling and ground, then pipes.
    fn frame(&mut self) {
        self.bird_vy += GRAVITY;
        self.bird_y += self.bird_vy;

        if self.bird_y < 0.0 {
            self.bird_y = 0.0;
            self.bird_vy = 0.0;
        }
        if self.bird_y + BIRD_RADIUS > GROUND_Y {
            self.bird_y = GROUND_Y - BIRD_RADIUS;
            self.over = true;
        }

        let speed = pipe_speed(self.score);
        let mut pipes = std::mem::take(&mut self.pipes);
        for pipe in &mut pipes {
            pipe.x -= speed;
            if pipe.rects().into_iter().any(|rect| self.bird_hits(rect)) {
                self.over = true;
            }
            if pipe.x + PIPE_WIDTH < BIRD_X && !pipe.passed {
                pipe.passed = true;
                self.score += 1;
                self.best = self.best.max(self.score);
            }
        }
        pipes.retain(|pipe| pipe.x + PIPE_WIDTH > 0.0);
        self.pipes = pipes;

        if self.over {
            log::debug!("crashed with score {}", self.score);
        }
    }

    /// Adds a pipe at the right edge unless the last one is still too close.
    ///
    /// Returns how long to wait before the next attempt.
    fn spawn_pipe(&mut self) -> Duration {
        if let Some(last) = self.pipes.last() {
            if WIDTH - last.x < min_pipe_distance(self.score) {
                return SPAWN_RETRY;
            }
        }
        let gap = pipe_gap(self.score);
        let gap_y = self
            .rng
            .random_range(GAP_TOP_MIN as i32..=(GAP_BOTTOM_MAX - gap) as i32);
        self.pipes.push(Pipe {
            x: WIDTH,
            gap_y: f64::from(gap_y),
            gap,
            passed: false,
        });
        spawn_interval(self.score)
    }
}

impl FrameGame for Flappy {
    type Input = Input;

    fn handle(&mut self, input: Input) -> Result<()> {
        match input {
            Input::Flap => self.flap(),
        }
        Ok(())
    }

    fn advance(&mut self, dt: Duration) {
        self.since_frame += dt;
        while self.since_frame >= FRAME && !self.over {
            self.since_frame -= FRAME;
            self.frame();
            if self.over {
                break;
            }
            self.spawn_timer = self.spawn_timer.saturating_sub(FRAME);
            if self.spawn_timer.is_zero() {
                self.spawn_timer = self.spawn_pipe();
            }
        }
        if self.over {
            self.since_frame = Duration::ZERO;
        }
    }

    fn is_finished(&self) -> bool {
        self.over
    }

    fn submission(&self) -> Option<Submission> {
        (self.score > 0).then(|| {
            Submission::new(GameId::FlappyBird, f64::from(self.score))
                .with("best_session", self.best)
        })
    }

    fn round(&self) -> u32 {
        self.round
    }
}
