use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Coordinates are outside the grid")]
    OutOfBounds,
    #[error("Action is not legal for the current cell state")]
    InvalidCell,
    #[error("Not enough cells to place the requested mines and special cells")]
    InsufficientCells,
    #[error("Game is not in progress, no moves are accepted")]
    NotInProgress,
    #[error("It is not this player's turn")]
    WrongTurn,
    #[error("Difficulty profile or session settings are invalid")]
    InvalidProfile,
    #[error("A question must be answered or deferred first")]
    AwaitingAnswer,
    #[error("There is no question waiting for an answer")]
    NoPendingQuestion,
    #[error("Game has not reached a final state yet")]
    NotFinished,
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
}

pub type Result<T> = core::result::Result<T, GameError>;
