use std::collections::HashSet;
use crate::board::{in_bounds, Board, Color, Piece, PieceType, Pos, HEIGHT};
use crate::board::Color::{Black, White};
use crate::error::Result;

const START_RANK_BLACK: i8 = 1;
const START_RANK_WHITE: i8 = HEIGHT as i8 - 2;

const STRAIGHT: [[i8; 2]; 4] = [[1, 0], [-1, 0], [0, 1], [0, -1]];
const DIAGONAL: [[i8; 2]; 4] = [[1, 1], [-1, 1], [-1, -1], [1, -1]];
const KING_STEPS: [[i8; 2]; 8] = [[1, 0], [-1, 0], [0, 1], [0, -1], [1, 1], [-1, 1], [-1, -1], [1, -1]];
const KNIGHT_JUMPS: [[i8; 2]; 8] = [[2, 1], [1, 2], [-1, 2], [-2, 1], [-2, -1], [-1, -2], [1, -2], [2, -1]];

fn step(pos: Pos, vec: &[i8; 2]) -> Pos {
    (pos.0 + vec[0], pos.1 + vec[1])
}

fn capturable(board: &Board, pos: Pos, color: Color) -> bool {
    board.at(pos).is_some_and(|other| other.color != color)
}

fn reachable(board: &Board, pos: Pos, color: Color) -> bool {
    in_bounds(pos) && board.at(pos).map_or(true, |other| other.color != color)
}

fn move_by_vector(board: &Board, piece: &Piece, vec: &[i8; 2]) -> Vec<Pos> {
    let mut result: Vec<Pos> = Vec::new();
    let mut next = step(piece.pos, vec);
    while in_bounds(next) {
        match board.at(next) {
            None => result.push(next),
            Some(other) => {
                if other.color != piece.color {
                    result.push(next);
                }
                break
            }
        }
        next = step(next, vec);
    }
    result
}

fn slide(board: &Board, piece: &Piece, vectors: &[[i8; 2]]) -> HashSet<Pos> {
    vectors.iter()
        .flat_map(|vec| move_by_vector(board, piece, vec))
        .collect()
}

fn jump(board: &Board, piece: &Piece, vectors: &[[i8; 2]]) -> HashSet<Pos> {
    vectors.iter()
        .map(|vec| step(piece.pos, vec))
        .filter(|&pos| reachable(board, pos, piece.color))
        .collect()
}

fn pawn_moves(board: &Board, piece: &Piece) -> HashSet<Pos> {
    let (forward, start_rank) = match piece.color {
        Black => (1, START_RANK_BLACK),
        White => (-1, START_RANK_WHITE),
    };
    let (row, col) = piece.pos;
    let mut result = HashSet::new();
    let move_one = (row + forward, col);
    if in_bounds(move_one) && board.at(move_one).is_none() {
        result.insert(move_one);
        let move_two = (row + 2 * forward, col);
        if row == start_rank && board.at(move_two).is_none() {
            result.insert(move_two);
        }
    }
    for side in [-1, 1] {
        let target = (row + forward, col + side);
        if capturable(board, target, piece.color) {
            result.insert(target);
        }
    }
    result
}

/// Pseudo-legal destinations of the piece at `pos`: reachable by its geometry,
/// never onto a friendly piece, ignoring self-check. Empty for an empty or
/// off-board square.
pub fn moves(board: &Board, pos: Pos) -> HashSet<Pos> {
    let piece = match board.at(pos) {
        None => return HashSet::new(),
        Some(piece) => piece,
    };
    match piece.kind {
        PieceType::King => jump(board, piece, &KING_STEPS),
        PieceType::Queen => &slide(board, piece, &STRAIGHT) | &slide(board, piece, &DIAGONAL),
        PieceType::Rook => slide(board, piece, &STRAIGHT),
        PieceType::Bishop => slide(board, piece, &DIAGONAL),
        PieceType::Knight => jump(board, piece, &KNIGHT_JUMPS),
        PieceType::Pawn => pawn_moves(board, piece),
    }
}

/// Union of the pseudo-legal destinations of every `color` piece.
pub fn attacked_squares(board: &Board, color: Color) -> HashSet<Pos> {
    board.all_pieces(color).iter()
        .flat_map(|piece| moves(board, piece.pos))
        .collect()
}

/// Plays `start -> dest` on a scratch copy and reports whether the mover's king
/// ends up attacked.
pub fn move_into_check(board: &Board, start: Pos, dest: Pos) -> Result<bool> {
    let color = match board.get(start)? {
        None => return Ok(false),
        Some(piece) => piece.color,
    };
    let mut scratch = board.duplicate();
    scratch.make_move_unchecked(start, dest)?;
    scratch.in_check(color)
}

pub fn valid_moves(board: &Board, pos: Pos) -> Result<HashSet<Pos>> {
    let mut result = HashSet::new();
    for dest in moves(board, pos) {
        if !move_into_check(board, pos, dest)? {
            result.insert(dest);
        }
    }
    Ok(result)
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;
    use crate::board::{Board, Color, Piece, PieceType, Pos};
    use crate::board::Color::{Black, White};
    use crate::error::BoardError;
    use crate::moves::{attacked_squares, move_into_check, moves, valid_moves};

    fn put(board: &mut Board, pos: Pos, color: Color, kind: PieceType) {
        board.set(pos, Some(Piece::new(color, kind, pos))).unwrap();
    }

    fn board_one_piece(row: i8, col: i8, color: Color, kind: PieceType) -> Board {
        let mut board = Board::empty();
        put(&mut board, (row, col), color, kind);
        board
    }

    #[test]
    fn test_empty_squares() {
        let board = board_one_piece(0, 0, White, PieceType::King);
        assert_eq!(moves(&board, (1, 1)), HashSet::new());
        assert_eq!(moves(&board, (8, 8)), HashSet::new());
    }

    #[test]
    fn test_king_moves() {
        let board = board_one_piece(0, 0, White, PieceType::King);
        assert_eq!(moves(&board, (0, 0)), HashSet::from([(0, 1), (1, 0), (1, 1)]));

        let board = board_one_piece(7, 7, White, PieceType::King);
        assert_eq!(moves(&board, (7, 7)), HashSet::from([(6, 6), (6, 7), (7, 6)]));

        let board = board_one_piece(3, 3, White, PieceType::King);
        assert_eq!(moves(&board, (3, 3)), HashSet::from([(2, 2), (2, 3), (2, 4), (3, 2), (3, 4), (4, 2), (4, 3), (4, 4)]));
    }

    #[test]
    fn test_rook_moves() {
        let board = board_one_piece(0, 0, White, PieceType::Rook);
        assert_eq!(moves(&board, (0, 0)), HashSet::from([
            (1, 0), (2, 0), (3, 0), (4, 0), (5, 0), (6, 0), (7, 0),
            (0, 1), (0, 2), (0, 3), (0, 4), (0, 5), (0, 6), (0, 7)
        ]));

        let board = Board::new();
        assert_eq!(moves(&board, (0, 0)), HashSet::new());

        let mut board = Board::new();
        board.set((1, 7), None).unwrap();
        assert_eq!(moves(&board, (0, 7)), HashSet::from([(1, 7), (2, 7), (3, 7), (4, 7), (5, 7), (6, 7)]));
    }

    #[test]
    fn test_bishop_moves() {
        let board = board_one_piece(0, 0, White, PieceType::Bishop);
        assert_eq!(moves(&board, (0, 0)), HashSet::from([(1, 1), (2, 2), (3, 3), (4, 4), (5, 5), (6, 6), (7, 7)]));

        let board = board_one_piece(3, 3, White, PieceType::Bishop);
        assert_eq!(moves(&board, (3, 3)), HashSet::from([
            (4, 4), (5, 5), (6, 6), (7, 7),
            (2, 4), (1, 5), (0, 6),
            (2, 2), (1, 1), (0, 0),
            (4, 2), (5, 1), (6, 0)
        ]));

        let board = board_one_piece(5, 1, White, PieceType::Bishop);
        assert_eq!(moves(&board, (5, 1)), HashSet::from([
            (6, 2), (7, 3),
            (4, 2), (3, 3), (2, 4), (1, 5), (0, 6),
            (4, 0),
            (6, 0)
        ]));

        let board = Board::new();
        assert_eq!(moves(&board, (0, 2)), HashSet::new());
    }

    #[test]
    fn test_queen_moves() {
        let board = board_one_piece(4, 2, White, PieceType::Queen);
        assert_eq!(moves(&board, (4, 2)), HashSet::from([
            (5, 2), (6, 2), (7, 2),
            (3, 2), (2, 2), (1, 2), (0, 2),
            (4, 3), (4, 4), (4, 5), (4, 6), (4, 7),
            (4, 1), (4, 0),
            (5, 3), (6, 4), (7, 5),
            (3, 3), (2, 4), (1, 5), (0, 6),
            (3, 1), (2, 0),
            (5, 1), (6, 0)
        ]));

        let board = Board::new();
        assert_eq!(moves(&board, (0, 3)), HashSet::new());

        let mut board = Board::new();
        board.set((1, 2), None).unwrap();
        board.set((1, 3), None).unwrap();
        board.set((1, 4), None).unwrap();
        put(&mut board, (4, 7), Black, PieceType::Pawn);
        put(&mut board, (3, 0), White, PieceType::Pawn);
        assert_eq!(moves(&board, (0, 3)), HashSet::from([
            (1, 3), (2, 3), (3, 3), (4, 3), (5, 3), (6, 3),
            (1, 4), (2, 5), (3, 6),
            (1, 2), (2, 1), (3, 0)
        ]));
    }

    #[test]
    fn test_knight_moves() {
        let board = Board::new();
        assert_eq!(moves(&board, (0, 1)), HashSet::from([(2, 0), (2, 2)]));

        let mut board = board_one_piece(7, 0, White, PieceType::Knight);
        put(&mut board, (5, 1), Black, PieceType::Queen);
        assert_eq!(moves(&board, (7, 0)), HashSet::from([(6, 2), (5, 1)]));

        let board = board_one_piece(5, 5, White, PieceType::Knight);
        assert_eq!(moves(&board, (5, 5)), HashSet::from([
            (7, 4), (7, 6), (4, 7), (6, 7),
            (3, 4), (3, 6), (4, 3), (6, 3)
        ]));
    }

    #[test]
    fn test_pawn_moves() {
        let board = Board::new();
        assert_eq!(moves(&board, (1, 0)), HashSet::from([(2, 0), (3, 0)]));
        assert_eq!(moves(&board, (6, 6)), HashSet::from([(5, 6), (4, 6)]));

        let board = board_one_piece(6, 1, Black, PieceType::Pawn);
        assert_eq!(moves(&board, (6, 1)), HashSet::from([(7, 1)]));

        let board = board_one_piece(6, 1, White, PieceType::Pawn);
        assert_eq!(moves(&board, (6, 1)), HashSet::from([(4, 1), (5, 1)]));

        let board = board_one_piece(0, 1, White, PieceType::Pawn);
        assert_eq!(moves(&board, (0, 1)), HashSet::new());

        let mut board = board_one_piece(3, 3, White, PieceType::Pawn);
        put(&mut board, (2, 2), Black, PieceType::Pawn);
        put(&mut board, (2, 3), Black, PieceType::Pawn);
        put(&mut board, (2, 4), Black, PieceType::Pawn);
        assert_eq!(moves(&board, (3, 3)), HashSet::from([(2, 2), (2, 4)]));

        let mut board = board_one_piece(1, 4, Black, PieceType::Pawn);
        put(&mut board, (3, 4), White, PieceType::Knight);
        assert_eq!(moves(&board, (1, 4)), HashSet::from([(2, 4)]));
        put(&mut board, (2, 4), White, PieceType::Knight);
        assert_eq!(moves(&board, (1, 4)), HashSet::new());
    }

    #[test]
    fn test_attacked_squares() {
        let mut board = board_one_piece(2, 1, Black, PieceType::Pawn);
        put(&mut board, (3, 0), White, PieceType::Pawn);
        put(&mut board, (3, 2), White, PieceType::Pawn);
        assert_eq!(attacked_squares(&board, Black), HashSet::from([(3, 0), (3, 1), (3, 2)]));
        assert_eq!(attacked_squares(&board, White), HashSet::from([(2, 0), (2, 1), (2, 2)]));
    }

    #[test]
    fn test_king_check() {
        let mut board = board_one_piece(4, 4, White, PieceType::King);
        put(&mut board, (0, 4), Black, PieceType::Queen);
        put(&mut board, (0, 0), Black, PieceType::Bishop);
        assert_eq!(valid_moves(&board, (4, 4)), Ok(HashSet::from([(3, 5), (4, 3), (4, 5), (5, 3)])));
    }

    #[test]
    fn test_king_cannot_move_to_attacked_square() {
        let mut board = board_one_piece(4, 4, White, PieceType::King);
        put(&mut board, (0, 3), Black, PieceType::Rook);
        put(&mut board, (7, 5), Black, PieceType::Rook);
        put(&mut board, (2, 4), Black, PieceType::King);
        assert_eq!(valid_moves(&board, (4, 4)), Ok(HashSet::from([(5, 4)])));

        let mut board = board_one_piece(4, 4, White, PieceType::King);
        put(&mut board, (5, 4), Black, PieceType::Queen);
        put(&mut board, (7, 3), Black, PieceType::Knight);
        put(&mut board, (3, 3), Black, PieceType::Knight);
        put(&mut board, (2, 2), Black, PieceType::Pawn);
        assert_eq!(valid_moves(&board, (4, 4)), Ok(HashSet::from([(3, 5)])));
    }

    #[test]
    fn test_move_into_check() {
        let mut board = board_one_piece(7, 4, White, PieceType::King);
        put(&mut board, (6, 4), White, PieceType::Rook);
        put(&mut board, (0, 4), Black, PieceType::Queen);
        assert_eq!(move_into_check(&board, (6, 4), (6, 0)), Ok(true));
        assert_eq!(move_into_check(&board, (6, 4), (3, 4)), Ok(false));
        assert_eq!(move_into_check(&board, (7, 4), (7, 3)), Ok(false));
        assert_eq!(move_into_check(&board, (5, 5), (4, 4)), Ok(false));
        assert_eq!(valid_moves(&board, (6, 4)), Ok(HashSet::from([(5, 4), (4, 4), (3, 4), (2, 4), (1, 4), (0, 4)])));
        assert!(board.get((6, 4)).unwrap().is_some());
    }

    #[test]
    fn test_valid_moves_without_king() {
        let board = board_one_piece(3, 3, White, PieceType::Rook);
        assert_eq!(valid_moves(&board, (3, 3)), Err(BoardError::MissingKing(White)));
    }
}
