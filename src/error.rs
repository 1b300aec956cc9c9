use thiserror::Error;
use crate::board::{Color, Pos};

pub type Result<T, E = BoardError> = std::result::Result<T, E>;

/// Why `Board::make_move` refused a move.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MoveRejection {
    /// Nothing stands on the start square.
    EmptySquare,
    /// The destination is not among the piece's pseudo-legal moves.
    Unreachable,
    /// The move would leave the mover's own king attacked.
    IntoCheck,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("position ({row}, {col}) is outside the board")]
    OutOfBounds { row: i8, col: i8 },
    #[error("illegal move {start:?} -> {end:?}: {reason:?}")]
    IllegalMove { start: Pos, end: Pos, reason: MoveRejection },
    /// Only reachable through corrupted state, normal play always keeps both kings.
    #[error("no {0} king on the board")]
    MissingKing(Color),
}

impl BoardError {
    pub(crate) fn illegal(start: Pos, end: Pos, reason: MoveRejection) -> Self {
        BoardError::IllegalMove { start, end, reason }
    }
}
