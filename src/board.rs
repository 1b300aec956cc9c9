use std::collections::HashSet;
use std::fmt;
use serde::Serializer;
use crate::board::Color::{Black, White};
use crate::error::{BoardError, MoveRejection, Result};
use crate::moves;

pub const WIDTH: usize = 8;
pub const HEIGHT: usize = 8;

/// `(row, col)`. Row 0 is black's back rank, row 7 is white's.
pub type Pos = (i8, i8);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PieceType {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Color {
    White, Black
}

impl Color {
    pub fn opposite(&self) -> Color {
        if self == &Color::White {
            Color::Black
        } else {
            Color::White
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            White => f.write_str("white"),
            Black => f.write_str("black"),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum GameStatus {
    InProgress,
    Win(Color),
    Draw
}

/// A piece record. `pos` is owned by the board: every board mutation keeps it
/// equal to the square that holds the piece.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceType,
    pub pos: Pos,
}

impl Piece {
    pub fn new(color: Color, kind: PieceType, pos: Pos) -> Self {
        Piece { color, kind, pos }
    }

    /// Pseudo-legal destinations, ignoring self-check.
    pub fn moves(&self, board: &Board) -> HashSet<Pos> {
        moves::moves(board, self.pos)
    }

    pub fn valid_moves(&self, board: &Board) -> Result<HashSet<Pos>> {
        moves::valid_moves(board, self.pos)
    }

    pub fn move_into_check(&self, board: &Board, dest: Pos) -> Result<bool> {
        moves::move_into_check(board, self.pos, dest)
    }

    pub fn icon(&self) -> char {
        let icon = match self.kind {
            PieceType::King => 'K',
            PieceType::Queen => 'Q',
            PieceType::Rook => 'R',
            PieceType::Bishop => 'B',
            PieceType::Knight => 'N',
            PieceType::Pawn => 'P',
        };
        if self.color == White { icon } else { icon.to_ascii_lowercase() }
    }
}

/// Handle of a piece in the board's arena. Stays valid until the piece is
/// captured or overwritten; a reused slot never resolves an old handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PieceId {
    index: usize,
    generation: u32,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    piece: Option<Piece>,
}

/// One square as seen by a rendering pass.
#[derive(Debug, PartialEq)]
pub struct Cell<'a, M> {
    pub pos: Pos,
    pub piece: Option<&'a Piece>,
    pub mark: Option<M>,
}

// Black's half of the starting array; setup mirrors every square onto white's half.
const STARTING_SQUARES: [(PieceType, &[Pos]); 6] = [
    (PieceType::Pawn, &[(1, 0), (1, 1), (1, 2), (1, 3), (1, 4), (1, 5), (1, 6), (1, 7)]),
    (PieceType::Knight, &[(0, 1), (0, 6)]),
    (PieceType::Bishop, &[(0, 2), (0, 5)]),
    (PieceType::Rook, &[(0, 0), (0, 7)]),
    (PieceType::Queen, &[(0, 3)]),
    (PieceType::King, &[(0, 4)]),
];

pub fn in_bounds(pos: Pos) -> bool {
    pos.0 >= 0 && pos.1 >= 0 && pos.0 < HEIGHT as i8 && pos.1 < WIDTH as i8
}

/// Every square in row-major order.
pub fn squares() -> impl Iterator<Item = Pos> {
    (0..HEIGHT as i8).flat_map(|row| (0..WIDTH as i8).map(move |col| (row, col)))
}

fn index(pos: Pos) -> Result<(usize, usize)> {
    if in_bounds(pos) {
        Ok((pos.0 as usize, pos.1 as usize))
    } else {
        Err(BoardError::OutOfBounds { row: pos.0, col: pos.1 })
    }
}

fn starting_color(row: usize) -> Color {
    if row < HEIGHT / 2 { Black } else { White }
}

fn rejected(start: Pos, end: Pos, reason: MoveRejection) -> Result<()> {
    log::debug!("Rejected move {:?} -> {:?}: {:?}", start, end, reason);
    Err(BoardError::illegal(start, end, reason))
}

#[derive(Debug, Clone)]
pub struct Board {
    squares: [[Option<PieceId>; WIDTH]; HEIGHT],
    pieces: Vec<Slot>,
}

// Two boards are equal when the same pieces stand on the same squares,
// whatever order they were placed in.
impl PartialEq for Board {
    fn eq(&self, other: &Board) -> bool {
        squares().all(|pos| self.at(pos) == other.at(pos))
    }
}

impl Eq for Board {}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl Board {
    pub fn empty() -> Self {
        Board {
            squares: [[None; WIDTH]; HEIGHT],
            pieces: Vec::new(),
        }
    }

    /// A board holding the standard starting array.
    pub fn new() -> Self {
        let mut board = Board::empty();
        board.setup();
        board
    }

    /// Replaces the whole grid with the standard starting array.
    pub fn setup(&mut self) {
        *self = Board::empty();
        for (kind, top_half) in STARTING_SQUARES {
            for &(row, col) in top_half {
                let (row, col) = (row as usize, col as usize);
                for row in [row, HEIGHT - 1 - row] {
                    let pos = (row as i8, col as i8);
                    self.put(row, col, Piece::new(starting_color(row), kind, pos));
                }
            }
        }
        log::debug!("Board set up with {} pieces", self.pieces.len());
    }

    fn put(&mut self, row: usize, col: usize, piece: Piece) -> Option<Piece> {
        let displaced = self.remove(row, col);
        let id = match self.pieces.iter().position(|slot| slot.piece.is_none()) {
            Some(index) => {
                let slot = &mut self.pieces[index];
                slot.generation += 1;
                slot.piece = Some(piece);
                PieceId { index, generation: slot.generation }
            }
            None => {
                self.pieces.push(Slot { generation: 0, piece: Some(piece) });
                PieceId { index: self.pieces.len() - 1, generation: 0 }
            }
        };
        self.squares[row][col] = Some(id);
        displaced
    }

    fn remove(&mut self, row: usize, col: usize) -> Option<Piece> {
        self.squares[row][col]
            .take()
            .and_then(|id| self.slot_mut(id))
            .and_then(|slot| slot.piece.take())
    }

    fn slot_mut(&mut self, id: PieceId) -> Option<&mut Slot> {
        self.pieces.get_mut(id.index).filter(|slot| slot.generation == id.generation)
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.piece.as_ref())
    }

    /// Number of arena slots, live or free.
    pub fn capacity(&self) -> usize {
        self.pieces.len()
    }

    pub fn piece_id(&self, pos: Pos) -> Result<Option<PieceId>> {
        let (row, col) = index(pos)?;
        Ok(self.squares[row][col])
    }

    pub fn get(&self, pos: Pos) -> Result<Option<&Piece>> {
        Ok(self.piece_id(pos)?.and_then(|id| self.piece(id)))
    }

    /// Writes `piece` at `pos`, stamping its `pos`. Whatever stood there is
    /// dropped from the board and returned.
    pub fn set(&mut self, pos: Pos, piece: Option<Piece>) -> Result<Option<Piece>> {
        let (row, col) = index(pos)?;
        match piece {
            None => Ok(self.remove(row, col)),
            Some(piece) => Ok(self.put(row, col, Piece { pos, ..piece })),
        }
    }

    pub fn is_empty(&self, pos: Pos) -> Result<bool> {
        Ok(self.get(pos)?.is_none())
    }

    /// Lookup for move generation: squares off the board read as empty.
    pub(crate) fn at(&self, pos: Pos) -> Option<&Piece> {
        self.get(pos).ok().flatten()
    }

    fn occupied(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.squares.iter()
            .flatten()
            .filter_map(move |id| id.and_then(|id| self.piece(id)))
    }

    pub fn all_pieces(&self, color: Color) -> Vec<&Piece> {
        self.occupied().filter(|piece| piece.color == color).collect()
    }

    pub fn king_position(&self, color: Color) -> Result<Pos> {
        match self.occupied().find(|p| p.kind == PieceType::King && p.color == color) {
            Some(king) => Ok(king.pos),
            None => {
                log::error!("Cannot find {} king, board state is corrupted", color);
                Err(BoardError::MissingKing(color))
            }
        }
    }

    /// Validates and applies a move. Nothing is mutated when it fails.
    pub fn make_move(&mut self, start: Pos, end: Pos) -> Result<()> {
        let piece = match self.get(start)? {
            None => return rejected(start, end, MoveRejection::EmptySquare),
            Some(piece) => *piece,
        };
        if !piece.moves(self).contains(&end) {
            return rejected(start, end, MoveRejection::Unreachable);
        }
        if piece.move_into_check(self, end)? {
            return rejected(start, end, MoveRejection::IntoCheck);
        }
        self.make_move_unchecked(start, end)
    }

    /// Moves the piece at `start` to `end` without any rule checks, capturing
    /// whatever stands on `end`.
    pub fn make_move_unchecked(&mut self, start: Pos, end: Pos) -> Result<()> {
        let (from_row, from_col) = index(start)?;
        let (to_row, to_col) = index(end)?;
        let id = match self.squares[from_row][from_col].take() {
            None => return Err(BoardError::illegal(start, end, MoveRejection::EmptySquare)),
            Some(id) => id,
        };
        if let Some(captured) = self.remove(to_row, to_col) {
            log::trace!("{:?} {:?} captured at {:?}", captured.color, captured.kind, end);
        }
        self.squares[to_row][to_col] = Some(id);
        if let Some(piece) = self.slot_mut(id).and_then(|slot| slot.piece.as_mut()) {
            piece.pos = end;
        }
        log::trace!("Moved {:?} -> {:?}", start, end);
        Ok(())
    }

    pub fn in_check(&self, color: Color) -> Result<bool> {
        let king = self.king_position(color)?;
        Ok(moves::attacked_squares(self, color.opposite()).contains(&king))
    }

    /// In check with no legal move for any piece. Stalemate is not mate.
    pub fn checkmate(&self, color: Color) -> Result<bool> {
        if !self.in_check(color)? {
            return Ok(false);
        }
        for piece in self.all_pieces(color) {
            if !piece.valid_moves(self)?.is_empty() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Either side is down to a single piece. Repetition, stalemate and the
    /// fifty-move rule are not detected.
    pub fn draw(&self) -> bool {
        self.all_pieces(White).len() == 1 || self.all_pieces(Black).len() == 1
    }

    pub fn game_status(&self) -> Result<GameStatus> {
        for color in [White, Black] {
            if self.checkmate(color)? {
                return Ok(GameStatus::Win(color.opposite()));
            }
        }
        if self.draw() {
            Ok(GameStatus::Draw)
        } else {
            Ok(GameStatus::InProgress)
        }
    }

    /// Independent scratch copy for speculative moves.
    pub fn duplicate(&self) -> Board {
        log::trace!("Duplicating board");
        self.clone()
    }

    /// Visits every square in row-major order, asking `highlight` for a mark.
    /// Marks are passed through untouched.
    pub fn render<M, F>(&self, highlight: Option<F>) -> Vec<Cell<'_, M>>
    where
        F: Fn(Pos) -> Option<M>,
    {
        squares()
            .map(|pos| Cell {
                pos,
                piece: self.at(pos),
                mark: highlight.as_ref().and_then(|mark| mark(pos)),
            })
            .collect()
    }

    /// Renders with the pseudo-legal destinations of the piece at `start` marked.
    pub fn highlight_moves(&self, start: Pos) -> Result<Vec<Cell<'_, ()>>> {
        let reachable = match self.get(start)? {
            None => HashSet::new(),
            Some(piece) => piece.moves(self),
        };
        Ok(self.render(Some(|pos: Pos| reachable.contains(&pos).then_some(()))))
    }
}

pub fn to_string(board: &Board) -> String {
    board.render(None::<fn(Pos) -> Option<()>>)
        .chunks(WIDTH)
        .map(|row| row.iter().map(|cell| cell.piece.map_or(' ', Piece::icon)).collect::<String>())
        .collect::<Vec<String>>()
        .join("\n")
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_string(self))
    }
}

impl serde::Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
        serializer.serialize_str(to_string(self).as_str())
    }
}
