//! Snake on a walled 25×25 grid that speeds up the longer a round lasts.

use ndarray::Array2;
use rand::prelude::*;
use std::collections::VecDeque;
use std::time::Duration;

use crate::*;

pub const WIDTH: i16 = 25;
pub const HEIGHT: i16 = 25;
pub const WALL_COUNT: usize = 40;
const WALL_ATTEMPTS: usize = WALL_COUNT * 5;
const MIN_FOOD: usize = 5;
const MAX_FOOD: usize = 8;
const BASE_INTERVAL_MS: u64 = 140;
const MIN_INTERVAL_MS: u64 = 60;

/// Grid cell as `(x, y)`, `y` growing downwards.
pub type Point = (i16, i16);

pub const CENTER: Point = (WIDTH / 2, HEIGHT / 2);

const START: [Point; 3] = [CENTER, (CENTER.0 - 1, CENTER.1), (CENTER.0 - 2, CENTER.1)];

fn in_bounds((x, y): Point) -> bool {
    (0..WIDTH).contains(&x) && (0..HEIGHT).contains(&y)
}

fn offset((x, y): Point, dir: Direction) -> Point {
    let (dx, dy) = dir.delta();
    (x + dx, y + dy)
}

/// Time between steps after `elapsed` of play: 1 ms faster per second, down to a floor.
pub fn step_interval(elapsed: Duration) -> Duration {
    let ms = BASE_INTERVAL_MS
        .saturating_sub(elapsed.as_secs())
        .max(MIN_INTERVAL_MS);
    Duration::from_millis(ms)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Turn(Direction),
    Restart,
}

pub struct Snake {
    body: VecDeque<Point>,
    heading: Direction,
    /// Direction of the last step taken; turns are checked against it.
    moved: Direction,
    walls: Vec<Point>,
    foods: Vec<Point>,
    alive: bool,
    score: u32,
    high_score: u32,
    elapsed: Duration,
    since_step: Duration,
    rng: SmallRng,
    round: u32,
}

impl Snake {
    pub fn new(seed: u64) -> Self {
        let mut game = Self::empty(seed);
        game.generate_walls();
        game.spawn_initial_foods();
        game
    }

    /// A round with fixed walls and food; later food still spawns at random.
    pub fn with_layout(walls: Vec<Point>, foods: Vec<Point>, seed: u64) -> Self {
        let mut game = Self::empty(seed);
        game.walls = walls;
        game.foods = foods;
        game
    }

    fn empty(seed: u64) -> Self {
        Self {
            body: START.into_iter().collect(),
            heading: Direction::Right,
            moved: Direction::Right,
            walls: Vec::new(),
            foods: Vec::new(),
            alive: true,
            score: 0,
            high_score: 0,
            elapsed: Duration::ZERO,
            since_step: Duration::ZERO,
            rng: SmallRng::seed_from_u64(seed),
            round: 0,
        }
    }

    pub fn body(&self) -> impl Iterator<Item = Point> + '_ {
        self.body.iter().copied()
    }

    pub fn head(&self) -> Point {
        self.body.front().copied().unwrap_or(CENTER)
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    pub fn walls(&self) -> &[Point] {
        &self.walls
    }

    pub fn foods(&self) -> &[Point] {
        &self.foods
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn elapsed_secs(&self) -> u32 {
        whole_secs(self.elapsed)
    }

    /// Shortest tick that makes the next step due, counting the speed-up at the next whole second.
    pub fn until_next_step(&self) -> Duration {
        let due = |elapsed| step_interval(elapsed).saturating_sub(self.since_step);
        let wait = due(self.elapsed);
        let next_second = Duration::from_secs(self.elapsed.as_secs() + 1) - self.elapsed;
        if wait < next_second {
            return wait;
        }
        wait.min(next_second.max(due(self.elapsed + next_second)))
    }

    /// Changes heading unless it would turn straight back into the neck.
    pub fn turn(&mut self, dir: Direction) -> Result<()> {
        if !self.alive {
            return Err(GameError::AlreadyEnded);
        }
        if dir != self.moved.opposite() {
            self.heading = dir;
        }
        Ok(())
    }

    /// Starts a new round with fresh walls and food, keeping the session high score.
    pub fn restart(&mut self) {
        self.body = START.into_iter().collect();
        self.heading = Direction::Right;
        self.moved = Direction::Right;
        self.alive = true;
        self.score = 0;
        self.elapsed = Duration::ZERO;
        self.since_step = Duration::ZERO;
        self.round += 1;
        self.generate_walls();
        self.spawn_initial_foods();
    }

    fn generate_walls(&mut self) {
        self.walls.clear();
        for _ in 0..WALL_ATTEMPTS {
            if self.walls.len() >= WALL_COUNT {
                break;
            }
            let cell = (
                self.rng.random_range(0..WIDTH),
                self.rng.random_range(0..HEIGHT),
            );
            let near_center = (cell.0 - CENTER.0).abs() <= 2 && (cell.1 - CENTER.1).abs() <= 2;
            if near_center || self.body.contains(&cell) || self.walls.contains(&cell) {
                continue;
            }
            self.walls.push(cell);
        }
        log::debug!("placed {} walls", self.walls.len());
    }

    /// Empty cells the head can reach through 4-neighbour moves, in BFS order.
    pub fn reachable_cells(&self) -> Vec<Point> {
        let mut blocked = Array2::from_elem((HEIGHT as usize, WIDTH as usize), false);
        for &(x, y) in self.walls.iter().chain(self.body.iter().skip(1)) {
            blocked[[y as usize, x as usize]] = true;
        }
        let head = self.head();
        if self.walls.contains(&head) {
            return Vec::new();
        }

        let mut visited = blocked;
        visited[[head.1 as usize, head.0 as usize]] = true;
        let mut queue = VecDeque::from([head]);
        let mut reachable = Vec::new();
        while let Some(cell) = queue.pop_front() {
            if cell != head {
                reachable.push(cell);
            }
            for dir in Direction::ALL {
                let next = offset(cell, dir);
                if !in_bounds(next) || visited[[next.1 as usize, next.0 as usize]] {
                    continue;
                }
                visited[[next.1 as usize, next.0 as usize]] = true;
                queue.push_back(next);
            }
        }
        reachable
    }

    fn spawn_initial_foods(&mut self) {
        let mut reachable = self.reachable_cells();
        reachable.shuffle(&mut self.rng);
        let desired = self.rng.random_range(MIN_FOOD..=MAX_FOOD);
        reachable.truncate(desired);
        self.foods = reachable;
    }

    fn spawn_food(&mut self) {
        let candidates: Vec<Point> = self
            .reachable_cells()
            .into_iter()
            .filter(|cell| !self.foods.contains(cell))
            .collect();
        if let Some(&cell) = candidates.choose(&mut self.rng) {
            self.foods.push(cell);
        }
    }

    /// Moves one cell along the heading, eating or dying as the target dictates.
    fn step(&mut self) {
        if !self.alive {
            return;
        }
        let next = offset(self.head(), self.heading);
        self.moved = self.heading;

        if !in_bounds(next) || self.body.contains(&next) || self.walls.contains(&next) {
            self.alive = false;
            log::debug!(
                "died at {:?} with score {} after {}s",
                next,
                self.score,
                self.elapsed_secs()
            );
            return;
        }

        self.body.push_front(next);
        if let Some(i) = self.foods.iter().position(|&food| food == next) {
            self.foods.swap_remove(i);
            self.score += 1;
            self.high_score = self.high_score.max(self.score);
            self.spawn_food();
        } else {
            self.body.pop_back();
        }
    }
}

impl FrameGame for Snake {
    type Input = Input;

    fn handle(&mut self, input: Input) -> Result<()> {
        match input {
            Input::Turn(dir) => self.turn(dir),
            Input::Restart => {
                self.restart();
                Ok(())
            }
        }
    }

    fn advance(&mut self, dt: Duration) {
        if !self.alive {
            return;
        }
        self.elapsed += dt;
        self.since_step += dt;
        loop {
            let interval = step_interval(self.elapsed);
            if !self.alive || self.since_step < interval {
                break;
            }
            self.since_step -= interval;
            self.step();
        }
    }

    fn is_finished(&self) -> bool {
        !self.alive
    }

    fn submission(&self) -> Option<Submission> {
        (self.score > 0).then(|| {
            Submission::new(GameId::Snake, f64::from(self.score))
                .with("time_s", self.elapsed_secs())
                .with("session_high", self.high_score)
        })
    }

    fn round(&self) -> u32 {
        self.round
    }
}
