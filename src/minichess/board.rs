use crate::minichess::notation::Square;
use crate::minichess::piece::{Color, Piece, PieceKind};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    Width(usize),
    Height(usize),
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Width(w) => write!(f, "width {}", w),
            Dimension::Height(h) => write!(f, "height {}", h),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum BoardError {
    #[error("Board with no rows given")]
    NoRows,
    #[error("Board of {dimension} exceeds the maximum of {max}")]
    TooLarge {
        dimension: Dimension,
        max: Dimension,
    },
    #[error("Board contains empty rows")]
    EmptyRows,
    #[error("Not all board rows have the same length")]
    MismatchedRowLengths,
    #[error("Unknown piece code '{0}'")]
    UnknownPiece(String),
    #[error("{0} has more than one King")]
    TooManyKings(Color),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coordinate {
    File,
    Rank,
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coordinate::File => write!(f, "File"),
            Coordinate::Rank => write!(f, "Rank"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoardPositionError {
    #[error("{0} of square {1} lies outside of board {2}")]
    OutOfBounds(Coordinate, Square, Dimension),
}

// A square known to lie on a particular board
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BoardPosition {
    file: usize,
    // 0 for the first rank
    rank_idx: usize,
}

impl BoardPosition {
    // Ensure that the given square meets the following criteria:
    // - file does not exceed the board width
    // - rank is at least 1 and does not exceed the board height
    pub fn new(board: &Board, square: Square) -> Result<Self, BoardPositionError> {
        if square.file >= board.width() {
            return Err(BoardPositionError::OutOfBounds(
                Coordinate::File,
                square,
                Dimension::Width(board.width()),
            ));
        }
        if square.rank == 0 || square.rank > board.height() {
            return Err(BoardPositionError::OutOfBounds(
                Coordinate::Rank,
                square,
                Dimension::Height(board.height()),
            ));
        }
        Ok(BoardPosition {
            file: square.file,
            rank_idx: square.rank - 1,
        })
    }

    pub fn file(&self) -> usize {
        self.file
    }

    pub fn rank_idx(&self) -> usize {
        self.rank_idx
    }

    pub fn square(&self) -> Square {
        Square::new(self.file, self.rank_idx + 1)
    }

    // Returns None when the shifted position falls off the board
    pub fn offset(&self, board: &Board, file_delta: i32, rank_delta: i32) -> Option<Self> {
        let file = usize::try_from(self.file as i64 + file_delta as i64).ok()?;
        let rank_idx = usize::try_from(self.rank_idx as i64 + rank_delta as i64).ok()?;
        if file >= board.width() || rank_idx >= board.height() {
            return None;
        }
        Some(BoardPosition { file, rank_idx })
    }
}

impl fmt::Display for BoardPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.square())
    }
}

pub const MAX_BOARD_WIDTH: usize = 26;
pub const MAX_BOARD_HEIGHT: usize = 26;

pub type BoardSpace = Option<Piece>;

// Rows are stored from the first rank upwards.
// This cannot be an array, because custom setups may use other sizes
#[derive(Clone, Debug, PartialEq)]
pub struct Board(Vec<Vec<BoardSpace>>);

impl Board {
    // Rows are given top to bottom, the way the board is printed.
    // Ensure that the given board meets the following criteria:
    // - all rows are the same length
    // - row length does not exceed the max board width
    // - column height does not exceed the max board height
    // - board contains at least one row
    // - rows contain at least one space
    // - neither side has more than one King
    pub fn new(rows: Vec<Vec<BoardSpace>>) -> Result<Self, BoardError> {
        if rows.is_empty() {
            return Err(BoardError::NoRows);
        }
        if rows.len() > MAX_BOARD_HEIGHT {
            return Err(BoardError::TooLarge {
                dimension: Dimension::Height(rows.len()),
                max: Dimension::Height(MAX_BOARD_HEIGHT),
            });
        }
        let row = &rows[0];
        if row.is_empty() {
            return Err(BoardError::EmptyRows);
        }
        let row_len = row.len();
        if row_len > MAX_BOARD_WIDTH {
            return Err(BoardError::TooLarge {
                dimension: Dimension::Width(row_len),
                max: Dimension::Width(MAX_BOARD_WIDTH),
            });
        }
        if rows.iter().any(|row| row.len() != row_len) {
            return Err(BoardError::MismatchedRowLengths);
        }
        let board = Board(rows.into_iter().rev().collect());
        for color in [Color::White, Color::Black] {
            let kings = board
                .pieces()
                .filter(|(_, p)| p.color == color && p.is_king())
                .count();
            if kings > 1 {
                return Err(BoardError::TooManyKings(color));
            }
        }
        Ok(board)
    }

    // Builds a board from rows of piece codes separated by whitespace,
    // top row first, with "." for an empty square:
    //
    //     Board::from_codes(&["bK . .", ". . .", ". . wK"])
    pub fn from_codes(rows: &[&str]) -> Result<Self, BoardError> {
        let spaces = rows
            .iter()
            .map(|row| {
                row.split_whitespace()
                    .map(|code| match code {
                        "." => Ok(None),
                        code => Piece::from_code(code)
                            .map(Some)
                            .ok_or_else(|| BoardError::UnknownPiece(code.to_string())),
                    })
                    .collect::<Result<Vec<BoardSpace>, BoardError>>()
            })
            .collect::<Result<Vec<Vec<BoardSpace>>, BoardError>>()?;
        Board::new(spaces)
    }

    pub fn height(&self) -> usize {
        self.0.len()
    }

    pub fn width(&self) -> usize {
        self.0[0].len()
    }

    pub fn piece_at(&self, square: Square) -> Result<Option<Piece>, BoardPositionError> {
        let bp = BoardPosition::new(self, square)?;
        Ok(self.get(bp))
    }

    pub fn get(&self, bp: BoardPosition) -> Option<Piece> {
        self.0[bp.rank_idx][bp.file]
    }

    // Returns the piece previously on the square, if any
    pub(crate) fn place_piece(&mut self, bp: BoardPosition, piece: Piece) -> Option<Piece> {
        self.0[bp.rank_idx][bp.file].replace(piece)
    }

    pub(crate) fn remove_piece(&mut self, bp: BoardPosition) -> Option<Piece> {
        self.0[bp.rank_idx][bp.file].take()
    }

    pub fn positions(&self) -> impl Iterator<Item = BoardPosition> + '_ {
        (0..self.height()).flat_map(move |rank_idx| {
            (0..self.width()).map(move |file| BoardPosition { file, rank_idx })
        })
    }

    pub fn pieces(&self) -> impl Iterator<Item = (BoardPosition, Piece)> + '_ {
        self.positions()
            .filter_map(move |bp| self.get(bp).map(|p| (bp, p)))
    }

    pub fn positions_of(&self, color: Color) -> Vec<BoardPosition> {
        self.pieces()
            .filter(|(_, p)| p.color == color)
            .map(|(bp, _)| bp)
            .collect()
    }

    pub fn king_position(&self, color: Color) -> Option<BoardPosition> {
        self.pieces()
            .find(|(_, p)| p.color == color && p.is_king())
            .map(|(bp, _)| bp)
    }

    pub fn count_pieces(&self) -> usize {
        self.pieces().count()
    }

    pub fn count_pieces_of(&self, color: Color) -> usize {
        self.pieces().filter(|(_, p)| p.color == color).count()
    }

    // The rank a pawn of the given color promotes on
    pub fn last_rank_idx(&self, color: Color) -> usize {
        match color {
            Color::White => self.height() - 1,
            Color::Black => 0,
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        use Color::*;
        use PieceKind::*;
        let p = |color, kind| Some(Piece::new(color, kind));
        let e = None;
        // First rank first
        Board(vec![
            vec![e, p(White, Knight), p(White, Bishop), p(White, Queen), p(White, King)],
            vec![e, p(White, Pawn), p(White, Pawn), e, e],
            vec![e, e, e, e, e],
            vec![e, e, p(Black, Pawn), p(Black, Pawn), e],
            vec![p(Black, King), p(Black, Queen), p(Black, Bishop), p(Black, Knight), e],
        ])
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (rank_idx, row) in self.0.iter().enumerate().rev() {
            let spaces = row
                .iter()
                .map(|s| match s {
                    Some(piece) => format!("{:>3}", piece.to_string()),
                    None => format!("{:>3}", "."),
                })
                .collect::<Vec<String>>()
                .join(" ");
            writeln!(f, "{}  {}", rank_idx + 1, spaces)?;
        }
        writeln!(f)?;
        let files = (0..self.width())
            .map(|file| ((b'A' + file as u8) as char).to_string())
            .collect::<Vec<String>>()
            .join("   ");
        write!(f, "     {}", files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(file: usize, rank: usize) -> Square {
        Square::new(file, rank)
    }

    #[test]
    fn test_construct_board() {
        let no_rows = Board::new(vec![]);
        assert_eq!(no_rows, Err(BoardError::NoRows));

        let empty_row = Board::new(vec![vec![]]);
        assert_eq!(empty_row, Err(BoardError::EmptyRows));

        let uneven_rows = Board::from_codes(&[".", ". ."]);
        assert_eq!(uneven_rows, Err(BoardError::MismatchedRowLengths));

        let too_wide_board = Board::new(vec![vec![None; MAX_BOARD_WIDTH + 1]]);
        assert!(matches!(too_wide_board, Err(BoardError::TooLarge { .. })));

        let too_tall_board = Board::new(vec![vec![None]; MAX_BOARD_HEIGHT + 1]);
        assert!(matches!(too_tall_board, Err(BoardError::TooLarge { .. })));

        let max_valid_board = Board::new(vec![vec![None; MAX_BOARD_WIDTH]; MAX_BOARD_HEIGHT]);
        assert!(max_valid_board.is_ok());

        let min_valid_board = Board::from_codes(&["."]);
        assert!(min_valid_board.is_ok());
    }

    #[test]
    fn test_construct_board_from_codes() {
        let unknown = Board::from_codes(&["wK xx"]);
        assert_eq!(unknown, Err(BoardError::UnknownPiece("xx".to_string())));

        let two_kings = Board::from_codes(&["bK bK", "wK ."]);
        assert_eq!(two_kings, Err(BoardError::TooManyKings(Color::Black)));

        let board = Board::from_codes(&["bK .", ". wK"]).unwrap();
        assert_eq!(
            board.piece_at(sq(0, 2)),
            Ok(Some(Piece::new(Color::Black, PieceKind::King)))
        );
        assert_eq!(
            board.piece_at(sq(1, 1)),
            Ok(Some(Piece::new(Color::White, PieceKind::King)))
        );
        assert_eq!(board.piece_at(sq(0, 1)), Ok(None));
    }

    #[test]
    fn test_starting_position() {
        let board = Board::default();
        assert_eq!(board.width(), 5);
        assert_eq!(board.height(), 5);
        assert_eq!(board.count_pieces(), 12);
        assert_eq!(board.count_pieces_of(Color::White), 6);
        assert_eq!(board.count_pieces_of(Color::Black), 6);
        assert_eq!(board.king_position(Color::White).map(|bp| bp.square()), Some(sq(4, 1)));
        assert_eq!(board.king_position(Color::Black).map(|bp| bp.square()), Some(sq(0, 5)));
        assert_eq!(
            board.piece_at(sq(1, 2)),
            Ok(Some(Piece::new(Color::White, PieceKind::Pawn)))
        );
        assert_eq!(
            Board::from_codes(&[
                "bK bQ bB bN .",
                ". . bp bp .",
                ". . . . .",
                ". wp wp . .",
                ". wN wB wQ wK",
            ]),
            Ok(board)
        );
    }

    #[test]
    fn test_piece_at_out_of_bounds() {
        let board = Board::default();
        assert_eq!(
            board.piece_at(sq(5, 1)),
            Err(BoardPositionError::OutOfBounds(
                Coordinate::File,
                sq(5, 1),
                Dimension::Width(5)
            ))
        );
        assert_eq!(
            board.piece_at(sq(0, 6)),
            Err(BoardPositionError::OutOfBounds(
                Coordinate::Rank,
                sq(0, 6),
                Dimension::Height(5)
            ))
        );
        assert!(board.piece_at(sq(0, 0)).is_err());
        assert!(board.piece_at(sq(25, 9)).is_err());
    }

    #[test]
    fn test_place_and_remove_piece() {
        let mut board = Board::from_codes(&[". .", ". ."]).unwrap();
        let bp = BoardPosition::new(&board, sq(1, 2)).unwrap();
        let queen = Piece::new(Color::White, PieceKind::Queen);
        assert_eq!(board.place_piece(bp, queen), None);
        assert_eq!(board.piece_at(sq(1, 2)), Ok(Some(queen)));
        assert_eq!(board.count_pieces(), 1);

        let knight = Piece::new(Color::Black, PieceKind::Knight);
        assert_eq!(board.place_piece(bp, knight), Some(queen));
        assert_eq!(board.remove_piece(bp), Some(knight));
        assert_eq!(board.remove_piece(bp), None);
        assert_eq!(board.count_pieces(), 0);
    }

    #[test]
    fn test_offset() {
        let board = Board::default();
        let corner = BoardPosition::new(&board, sq(0, 1)).unwrap();
        assert_eq!(corner.offset(&board, -1, 0), None);
        assert_eq!(corner.offset(&board, 0, -1), None);
        assert_eq!(corner.offset(&board, 4, 4).map(|bp| bp.square()), Some(sq(4, 5)));
        assert_eq!(corner.offset(&board, 5, 0), None);
    }

    #[test]
    fn test_display_board() {
        let board = Board::default();
        let expected = "\
5   bK  bQ  bB  bN   .
4    .   .  bp  bp   .
3    .   .   .   .   .
2    .  wp  wp   .   .
1    .  wN  wB  wQ  wK

     A   B   C   D   E";
        assert_eq!(board.to_string(), expected);
    }
}
