use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Too many mines")]
    TooManyMines,
    #[error("Mines were already placed")]
    MinesAlreadyPlaced,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
    #[error("Cell is already taken")]
    Occupied,
    #[error("Not your turn")]
    OutOfTurn,
    #[error("Input is locked until the cards flip back")]
    InputLocked,
    #[error("You haven't started typing yet")]
    NotStarted,
}

pub type Result<T> = core::result::Result<T, GameError>;
