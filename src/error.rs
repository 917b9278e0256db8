//! Errors surfaced at the game-driver boundary
//!
//! The search core has no error type of its own: invalid moves never reach
//! it, and a deadline overrun is handled inside `Searcher`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("({col}, {row}) is off the board, coordinates must be between 0 and {max}")]
    OutOfBounds { col: i32, row: i32, max: usize },
    #[error("({col}, {row}) is already occupied")]
    Occupied { col: u8, row: u8 },
    #[error("the game is over")]
    GameOver,
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("the AI is still thinking")]
    AiBusy,
    #[error("no move available")]
    NoMoveAvailable,
    #[error("board size {size} is out of range ({min}-{max})")]
    InvalidBoardSize { size: usize, min: usize, max: usize },
    #[error("time limit must be greater than zero")]
    InvalidTimeLimit,
    #[error("could not parse move {input:?}: {reason}")]
    Parse { input: String, reason: String },
    #[error("AI worker stopped without a result")]
    WorkerDisconnected,
}

pub type Result<T> = std::result::Result<T, GameError>;
