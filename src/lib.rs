//! An 8×8 chess board: placement, move validation, and check, checkmate and
//! draw detection.

pub mod board;
pub mod error;
pub mod moves;

pub use crate::board::{Board, Color, GameStatus, Piece, PieceType, Pos};
pub use crate::error::{BoardError, Result};
