//! 2048 on a 5×5 board.

use ndarray::{Array2, ArrayView1};
use rand::prelude::*;
use std::time::Duration;

use crate::*;

pub const SIZE: usize = 5;

/// Chance that a spawned tile is a 4 instead of a 2.
const FOUR_PROBABILITY: f64 = 0.1;

/// Slides the non-zero tiles of `line` to the front, merging equal neighbours once.
///
/// Returns the new line, padded with zeros, and the sum of the merged tiles.
pub fn compress_line(line: &[u32]) -> (Vec<u32>, u32) {
    let tiles: Vec<u32> = line.iter().copied().filter(|&v| v != 0).collect();
    let mut merged = Vec::with_capacity(line.len());
    let mut gained = 0;
    let mut i = 0;
    while i < tiles.len() {
        if i + 1 < tiles.len() && tiles[i] == tiles[i + 1] {
            let value = tiles[i] * 2;
            merged.push(value);
            gained += value;
            i += 2;
        } else {
            merged.push(tiles[i]);
            i += 1;
        }
    }
    merged.resize(line.len(), 0);
    (merged, gained)
}

/// No empty cell and no equal horizontal or vertical neighbours.
pub fn is_stuck(board: &Array2<u32>) -> bool {
    fn has_pair(lane: ArrayView1<'_, u32>) -> bool {
        lane.iter().zip(lane.iter().skip(1)).any(|(a, b)| a == b)
    }
    !board.iter().any(|&v| v == 0)
        && !board.rows().into_iter().any(has_pair)
        && !board.columns().into_iter().any(has_pair)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Move(Direction),
    /// Ends the round early, keeping the score.
    Finish,
    NewGame,
}

pub struct TwentyFortyEight {
    board: Array2<u32>,
    score: u32,
    best: u32,
    over: bool,
    rng: SmallRng,
    round: u32,
}

impl TwentyFortyEight {
    pub fn new(seed: u64) -> Self {
        let mut game = Self::with_board(Array2::zeros((SIZE, SIZE)), seed);
        game.spawn_tile();
        game.spawn_tile();
        game
    }

    /// Starts from a given board instead of two random tiles.
    pub fn with_board(board: Array2<u32>, seed: u64) -> Self {
        Self {
            board,
            score: 0,
            best: 0,
            over: false,
            rng: SmallRng::seed_from_u64(seed),
            round: 0,
        }
    }

    pub fn board(&self) -> &Array2<u32> {
        &self.board
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Best score of this session.
    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    fn spawn_tile(&mut self) {
        let empty: Vec<(usize, usize)> = self
            .board
            .indexed_iter()
            .filter(|&(_, &v)| v == 0)
            .map(|(index, _)| index)
            .collect();
        let Some(&index) = empty.choose(&mut self.rng) else {
            return;
        };
        self.board[index] = if self.rng.random_bool(FOUR_PROBABILITY) {
            4
        } else {
            2
        };
    }

    /// Slides every line toward `dir`. Returns whether any tile moved.
    pub fn slide(&mut self, dir: Direction) -> Result<bool> {
        if self.over {
            return Err(GameError::AlreadyEnded);
        }

        let reversed = matches!(dir, Direction::Right | Direction::Down);
        let lanes = match dir {
            Direction::Left | Direction::Right => self.board.rows_mut(),
            Direction::Up | Direction::Down => self.board.columns_mut(),
        };

        let mut moved = false;
        let mut gained = 0;
        for mut lane in lanes {
            let mut line: Vec<u32> = lane.iter().copied().collect();
            if reversed {
                line.reverse();
            }
            let (mut next, gain) = compress_line(&line);
            if reversed {
                next.reverse();
                line.reverse();
            }
            if next != line {
                moved = true;
            }
            gained += gain;
            for (cell, value) in lane.iter_mut().zip(next) {
                *cell = value;
            }
        }

        if !moved {
            return Ok(false);
        }
        self.score += gained;
        self.best = self.best.max(self.score);
        self.spawn_tile();
        if is_stuck(&self.board) {
            self.over = true;
            log::debug!("no moves left, score {}", self.score);
        }
        Ok(true)
    }

    pub fn finish(&mut self) {
        if !self.over {
            self.over = true;
            log::debug!("finished early with score {}", self.score);
        }
    }

    pub fn new_game(&mut self) {
        self.board.fill(0);
        self.score = 0;
        self.over = false;
        self.round += 1;
        self.spawn_tile();
        self.spawn_tile();
    }
}

impl FrameGame for TwentyFortyEight {
    type Input = Input;

    fn handle(&mut self, input: Input) -> Result<()> {
        match input {
            Input::Move(dir) => self.slide(dir).map(drop),
            Input::Finish => {
                self.finish();
                Ok(())
            }
            Input::NewGame => {
                self.new_game();
                Ok(())
            }
        }
    }

    /// Turn-based; time does not matter.
    fn advance(&mut self, _dt: Duration) {}

    fn is_finished(&self) -> bool {
        self.over
    }

    fn submission(&self) -> Option<Submission> {
        (self.score > 0).then(|| {
            Submission::new(GameId::TwentyFortyEight, f64::from(self.score))
                .with("best_session", self.best)
        })
    }

    fn round(&self) -> u32 {
        self.round
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn tiles(board: &Array2<u32>) -> usize {
        board.iter().filter(|&&v| v != 0).count()
    }

    #[test]
    fn lines_merge_each_tile_once() {
        assert_eq!(compress_line(&[2, 2, 2, 2, 0]), (vec![4, 4, 0, 0, 0], 8));
        assert_eq!(compress_line(&[4, 4, 8, 0, 0]), (vec![8, 8, 0, 0, 0], 8));
        assert_eq!(compress_line(&[2, 0, 2, 4, 0]), (vec![4, 4, 0, 0, 0], 4));
        assert_eq!(compress_line(&[2, 4, 8, 16, 32]), (vec![2, 4, 8, 16, 32], 0));
        assert_eq!(compress_line(&[0, 0, 0, 0, 0]), (vec![0; 5], 0));
    }

    #[test]
    fn new_game_has_two_small_tiles() {
        for seed in 0..20 {
            let game = TwentyFortyEight::new(seed);
            assert_eq!(tiles(game.board()), 2);
            assert!(game.board().iter().all(|&v| matches!(v, 0 | 2 | 4)));
        }
    }

    #[test]
    fn moving_right_merges_toward_the_edge_and_spawns() {
        let board = array![
            [2, 2, 2, 0, 0],
            [0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0],
        ];
        let mut game = TwentyFortyEight::with_board(board, 1);

        assert_eq!(game.slide(Direction::Right), Ok(true));

        assert_eq!(game.board()[[0, 4]], 4);
        assert_eq!(game.board()[[0, 3]], 2);
        assert_eq!(game.score(), 4);
        assert_eq!(tiles(game.board()), 3);
    }

    #[test]
    fn columns_slide_up() {
        let board = array![
            [2, 0, 0, 0, 0],
            [0, 0, 0, 0, 0],
            [2, 0, 0, 0, 0],
            [0, 0, 0, 0, 0],
            [4, 0, 0, 0, 0],
        ];
        let mut game = TwentyFortyEight::with_board(board, 1);
        game.slide(Direction::Up).unwrap();

        assert_eq!(game.board()[[0, 0]], 4);
        assert_eq!(game.board()[[1, 0]], 4);
        assert_eq!(game.score(), 4);
    }

    #[test]
    fn blocked_move_changes_nothing() {
        let board = array![
            [2, 4, 0, 0, 0],
            [0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0],
        ];
        let mut game = TwentyFortyEight::with_board(board.clone(), 1);

        assert_eq!(game.slide(Direction::Left), Ok(false));
        assert_eq!(game.board(), &board);
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn stuck_boards_are_detected() {
        let stuck = array![
            [2, 4, 2, 4, 2],
            [4, 2, 4, 2, 4],
            [2, 4, 2, 4, 2],
            [4, 2, 4, 2, 4],
            [2, 4, 2, 4, 2],
        ];
        assert!(is_stuck(&stuck));

        let mut pair = stuck.clone();
        pair[[4, 4]] = 4;
        assert!(!is_stuck(&pair));

        let mut hole = stuck;
        hole[[2, 2]] = 0;
        assert!(!is_stuck(&hole));
    }

    #[test]
    fn merged_tiles_wait_for_the_next_move() {
        let board = array![
            [2, 4, 2, 4, 2],
            [4, 2, 4, 2, 4],
            [2, 4, 2, 4, 2],
            [4, 2, 4, 2, 4],
            [8, 8, 16, 32, 64],
        ];
        let mut game = TwentyFortyEight::with_board(board, 3);
        game.slide(Direction::Left).unwrap();

        assert_eq!(game.score(), 16);
        let row: Vec<u32> = game.board().row(4).to_vec();
        assert_eq!(&row[..4], &[16, 16, 32, 64]);
        assert!(!game.is_over());
    }

    #[test]
    fn finishing_submits_once_and_new_game_keeps_best() {
        let board = array![
            [2, 2, 0, 0, 0],
            [0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0],
        ];
        let mut controller = Controller::new(TwentyFortyEight::with_board(board, 2));
        controller.push(Input::Move(Direction::Left));
        controller.push(Input::Finish);
        let errors = controller.tick(Duration::ZERO);
        assert!(errors.is_empty());

        let submission = controller.take_submission().unwrap();
        assert_eq!(submission.game, GameId::TwentyFortyEight);
        assert_eq!(submission.score, 4.0);
        assert_eq!(submission.extra["best_session"], 4);
        assert_eq!(controller.take_submission(), None);

        controller.push(Input::Move(Direction::Up));
        assert_eq!(controller.tick(Duration::ZERO), vec![GameError::AlreadyEnded]);

        controller.push(Input::NewGame);
        controller.tick(Duration::ZERO);
        let game = controller.game();
        assert_eq!(game.score(), 0);
        assert_eq!(game.best(), 4);
        assert_eq!(tiles(game.board()), 2);
    }

    #[test]
    fn finishing_without_points_submits_nothing() {
        let mut controller = Controller::new(TwentyFortyEight::new(4));
        controller.push(Input::Finish);
        controller.tick(Duration::ZERO);

        assert!(controller.game().is_over());
        assert_eq!(controller.take_submission(), None);
    }
}
