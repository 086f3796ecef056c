mod board;
mod game_state;
mod notation;
mod piece;
mod rules;

pub use board::{
    Board, BoardError, BoardPosition, BoardPositionError, BoardSpace, Coordinate, Dimension,
    MAX_BOARD_HEIGHT, MAX_BOARD_WIDTH,
};
pub use game_state::{GameResult, GameState, MoveError, Outcome, INACTIVITY_LIMIT};
pub use notation::{parse_move, Move, ParseError, Square};
pub use piece::{Color, Piece, PieceKind};
pub use rules::{
    AnyMove, BishopRules, KingRules, KnightRules, LegalityChecker, PawnRules, QueenRules,
    StandardRules,
};
