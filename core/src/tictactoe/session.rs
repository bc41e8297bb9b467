use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::*;
use crate::{FrameGame, GameError, Result};

/// Delay before the bot answers a human move.
pub const BOT_REPLY_DELAY: Duration = Duration::from_millis(150);

/// Delay before the bot opens a round it starts.
pub const BOT_OPENING_DELAY: Duration = Duration::from_millis(300);

/// The human always plays X against the bot.
pub const HUMAN: Mark = Mark::X;
pub const BOT: Mark = Mark::O;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    VsBot {
        difficulty: BotDifficulty,
        human_starts: bool,
    },
    TwoPlayer {
        first: Mark,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Play(Position),
    Reset,
}

/// Results across rounds of one session.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub x_wins: u32,
    pub o_wins: u32,
    pub draws: u32,
}

impl Tally {
    fn record(&mut self, evaluation: Evaluation) {
        match evaluation {
            Evaluation::Winner(Mark::X) => self.x_wins += 1,
            Evaluation::Winner(Mark::O) => self.o_wins += 1,
            Evaluation::Draw => self.draws += 1,
            Evaluation::Ongoing => {}
        }
    }
}

pub struct TicTacToe {
    mode: Mode,
    board: Board,
    to_move: Mark,
    outcome: Evaluation,
    bot: Option<Box<dyn Strategy>>,
    bot_timer: Option<Duration>,
    tally: Tally,
    round: u32,
}

impl TicTacToe {
    pub fn new(mode: Mode, seed: u64) -> Self {
        let bot = match mode {
            Mode::VsBot { difficulty, .. } => Some(difficulty.strategy(seed)),
            Mode::TwoPlayer { .. } => None,
        };
        Self::with_bot(mode, bot)
    }

    /// Uses `bot` instead of the strategy the mode's difficulty would pick.
    pub fn with_bot(mode: Mode, bot: Option<Box<dyn Strategy>>) -> Self {
        let mut game = Self {
            mode,
            board: Board::EMPTY,
            to_move: HUMAN,
            outcome: Evaluation::Ongoing,
            bot,
            bot_timer: None,
            tally: Tally::default(),
            round: 0,
        };
        game.start_round();
        game
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> Mark {
        self.to_move
    }

    pub fn outcome(&self) -> Evaluation {
        self.outcome
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    /// Whether the bot is waiting to play.
    pub fn bot_pending(&self) -> bool {
        self.bot_timer.is_some()
    }

    fn vs_bot(&self) -> bool {
        matches!(self.mode, Mode::VsBot { .. })
    }

    /// Plays the current side's mark at `pos`.
    pub fn play(&mut self, pos: Position) -> Result<Evaluation> {
        if self.outcome.is_over() {
            return Err(GameError::AlreadyEnded);
        }
        if self.vs_bot() && self.to_move == BOT {
            return Err(GameError::OutOfTurn);
        }
        self.board.place(pos, self.to_move)?;
        log::debug!("{} played {:?}", self.to_move, pos);
        self.after_move();
        Ok(self.outcome)
    }

    /// Clears the board for a new round, keeping the tally.
    pub fn reset(&mut self) {
        self.round += 1;
        self.start_round();
    }

    fn start_round(&mut self) {
        self.board = Board::EMPTY;
        self.outcome = Evaluation::Ongoing;
        self.bot_timer = None;
        self.to_move = match self.mode {
            Mode::VsBot {
                human_starts: true, ..
            } => HUMAN,
            Mode::VsBot {
                human_starts: false,
                ..
            } => {
                self.bot_timer = Some(BOT_OPENING_DELAY);
                BOT
            }
            Mode::TwoPlayer { first } => first,
        };
    }

    fn after_move(&mut self) {
        self.outcome = evaluate(&self.board);
        if self.outcome.is_over() {
            self.tally.record(self.outcome);
            log::debug!("round over: {:?}", self.outcome);
            return;
        }
        self.to_move = self.to_move.opponent();
        if self.vs_bot() && self.to_move == BOT {
            self.bot_timer = Some(BOT_REPLY_DELAY);
        }
    }

    fn bot_move(&mut self) {
        let Some(bot) = self.bot.as_mut() else {
            return;
        };
        let Some(pos) = bot.choose_move(&self.board, BOT) else {
            return;
        };
        if let Err(err) = self.board.place(pos, BOT) {
            log::warn!("bot picked an illegal move {:?}: {}", pos, err);
            return;
        }
        log::debug!("bot played {:?}", pos);
        self.after_move();
    }

    /// Status line for the current round.
    pub fn status(&self) -> String {
        let vs_bot = self.vs_bot();
        match self.outcome {
            Evaluation::Draw => "It's a draw!".to_string(),
            Evaluation::Winner(mark) if vs_bot && mark == HUMAN => "You win!".to_string(),
            Evaluation::Winner(_) if vs_bot => "Bot wins!".to_string(),
            Evaluation::Winner(mark) => format!("Player {mark} wins!"),
            Evaluation::Ongoing if vs_bot && self.to_move == HUMAN => "Your turn (X)".to_string(),
            Evaluation::Ongoing if vs_bot => "Bot's turn (O)...".to_string(),
            Evaluation::Ongoing => format!("Player {}'s turn", self.to_move),
        }
    }

    /// Score line across rounds.
    pub fn tally_line(&self) -> String {
        let Tally {
            x_wins,
            o_wins,
            draws,
        } = self.tally;
        if self.vs_bot() {
            format!("You (X): {x_wins}   Bot (O): {o_wins}   Draws: {draws}")
        } else {
            format!("X wins: {x_wins}   O wins: {o_wins}   Draws: {draws}")
        }
    }
}

impl FrameGame for TicTacToe {
    type Input = Input;

    fn handle(&mut self, input: Input) -> Result<()> {
        match input {
            Input::Play(pos) => self.play(pos).map(drop),
            Input::Reset => {
                self.reset();
                Ok(())
            }
        }
    }

    fn advance(&mut self, dt: Duration) {
        if let Some(remaining) = self.bot_timer {
            if dt >= remaining {
                self.bot_timer = None;
                self.bot_move();
            } else {
                self.bot_timer = Some(remaining - dt);
            }
        }
    }

    fn is_finished(&self) -> bool {
        self.outcome.is_over()
    }

    fn round(&self) -> u32 {
        self.round
    }
}
