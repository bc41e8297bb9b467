use core::fmt;
use core::str::FromStr;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use super::*;

/// A way of picking the bot's next move.
pub trait Strategy {
    /// Picks a legal move for `me`, or `None` when the board is full.
    fn choose_move(&mut self, board: &Board, me: Mark) -> Option<Position>;
}

/// Any legal move, uniformly.
#[derive(Clone, Debug)]
pub struct RandomBot {
    rng: SmallRng,
}

impl RandomBot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Strategy for RandomBot {
    fn choose_move(&mut self, board: &Board, _me: Mark) -> Option<Position> {
        board.available_moves().choose(&mut self.rng)
    }
}

/// Wins when it can, blocks when it must, otherwise prefers the center.
#[derive(Clone, Debug)]
pub struct HeuristicBot {
    rng: SmallRng,
}

impl HeuristicBot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

/// First move completing a line for `mark`, if any.
fn winning_move(board: &Board, mark: Mark) -> Option<Position> {
    board.available_moves().find(|&pos| {
        let mut next = *board;
        next.set(pos, Some(mark));
        evaluate(&next) == Evaluation::Winner(mark)
    })
}

impl Strategy for HeuristicBot {
    fn choose_move(&mut self, board: &Board, me: Mark) -> Option<Position> {
        winning_move(board, me)
            .or_else(|| winning_move(board, me.opponent()))
            .or_else(|| board.get(CENTER).is_none().then_some(CENTER))
            .or_else(|| board.available_moves().choose(&mut self.rng))
    }
}

/// Exhaustive search; never loses.
#[derive(Copy, Clone, Debug, Default)]
pub struct MinimaxBot;

/// Value of `board` for `me` with `to_move` playing next: +1 win, -1 loss, 0 draw.
///
/// Both sides play perfectly. There is no depth discount, so all wins are worth the same.
pub fn minimax(board: &mut Board, me: Mark, to_move: Mark) -> i8 {
    match evaluate(board) {
        Evaluation::Winner(mark) if mark == me => return 1,
        Evaluation::Winner(_) => return -1,
        Evaluation::Draw => return 0,
        Evaluation::Ongoing => {}
    }

    let maximizing = to_move == me;
    let mut best = if maximizing { i8::MIN } else { i8::MAX };
    for pos in board.available_moves() {
        board.set(pos, Some(to_move));
        let score = minimax(board, me, to_move.opponent());
        board.set(pos, None);
        best = if maximizing {
            best.max(score)
        } else {
            best.min(score)
        };
    }
    best
}

impl Strategy for MinimaxBot {
    /// Keeps the first best move in row-major order.
    fn choose_move(&mut self, board: &Board, me: Mark) -> Option<Position> {
        let mut scratch = *board;
        let mut best: Option<(Position, i8)> = None;
        for pos in board.available_moves() {
            scratch.set(pos, Some(me));
            let score = minimax(&mut scratch, me, me.opponent());
            scratch.set(pos, None);
            log::trace!("minimax {:?} -> {}", pos, score);
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((pos, score));
            }
        }
        best.map(|(pos, _)| pos)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotDifficulty {
    #[default]
    Easy,
    Hard,
    Impossible,
}

impl BotDifficulty {
    pub const ALL: [BotDifficulty; 3] = [Self::Easy, Self::Hard, Self::Impossible];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Hard => "hard",
            Self::Impossible => "impossible",
        }
    }

    pub fn strategy(self, seed: u64) -> Box<dyn Strategy> {
        match self {
            Self::Easy => Box::new(RandomBot::new(seed)),
            Self::Hard => Box::new(HeuristicBot::new(seed)),
            Self::Impossible => Box::new(MinimaxBot),
        }
    }
}

impl fmt::Display for BotDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BotDifficulty {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Please type: easy, hard, or impossible (got {s:?})"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(s: &str) -> Board {
        s.parse().unwrap()
    }

    /// Plays every possible opponent line against `bot`, returning the worst result for the bot.
    fn worst_outcome(bot: &mut dyn Strategy, board: Board, bot_mark: Mark, to_move: Mark) -> i8 {
        match evaluate(&board) {
            Evaluation::Winner(mark) if mark == bot_mark => return 1,
            Evaluation::Winner(_) => return -1,
            Evaluation::Draw => return 0,
            Evaluation::Ongoing => {}
        }
        if to_move == bot_mark {
            let pos = bot.choose_move(&board, bot_mark).unwrap();
            let mut next = board;
            next.place(pos, bot_mark).unwrap();
            worst_outcome(bot, next, bot_mark, bot_mark.opponent())
        } else {
            board
                .available_moves()
                .map(|pos| {
                    let mut next = board;
                    next.place(pos, to_move).unwrap();
                    worst_outcome(bot, next, bot_mark, bot_mark)
                })
                .min()
                .unwrap()
        }
    }

    #[test]
    fn minimax_never_loses_from_an_empty_board() {
        let mut bot = MinimaxBot;
        assert!(worst_outcome(&mut bot, Board::EMPTY, Mark::O, Mark::X) >= 0);
        assert!(worst_outcome(&mut bot, Board::EMPTY, Mark::O, Mark::O) >= 0);
        assert!(worst_outcome(&mut bot, Board::EMPTY, Mark::X, Mark::X) >= 0);
    }

    #[test]
    fn empty_board_is_a_draw_with_perfect_play() {
        let mut b = Board::EMPTY;
        assert_eq!(minimax(&mut b, Mark::O, Mark::X), 0);
        assert_eq!(b, Board::EMPTY);
    }

    #[test]
    fn minimax_takes_the_win() {
        let b = board("OO. XX. X..");
        assert_eq!(MinimaxBot.choose_move(&b, Mark::O), Some((0, 2)));
    }

    #[test]
    fn minimax_blocks() {
        let b = board("XX. .O. ...");
        assert_eq!(MinimaxBot.choose_move(&b, Mark::O), Some((0, 2)));
    }

    #[test]
    fn heuristic_prefers_win_over_block() {
        let b = board("XX. OO. X..");
        let mut bot = HeuristicBot::new(1);
        assert_eq!(bot.choose_move(&b, Mark::O), Some((1, 2)));
    }

    #[test]
    fn heuristic_blocks_then_takes_center() {
        let mut bot = HeuristicBot::new(1);
        assert_eq!(bot.choose_move(&board("X.. X.. ..."), Mark::O), Some((2, 0)));
        assert_eq!(bot.choose_move(&board("X.. ... ..."), Mark::O), Some(CENTER));
    }

    #[test]
    fn random_bot_only_picks_empty_cells() {
        let b = board("XOX OX. O.X");
        let mut bot = RandomBot::new(3);
        for _ in 0..20 {
            let pos = bot.choose_move(&b, Mark::O).unwrap();
            assert_eq!(b.get(pos), None);
        }
    }

    #[test]
    fn full_board_has_no_move() {
        let b = board("XOX XOO OXX");
        for difficulty in BotDifficulty::ALL {
            assert_eq!(difficulty.strategy(0).choose_move(&b, Mark::O), None);
        }
    }
}
