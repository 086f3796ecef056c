//! Movement rules for each kind of piece.
//!
//! A `LegalityChecker` is consulted after the basic checks (bounds, turn,
//! occupancy) have passed, so implementations may assume that `from` holds a
//! piece of the side to move and that `to` does not hold a friendly piece.

use crate::minichess::board::{Board, BoardPosition};
use crate::minichess::piece::PieceKind;

const DIAGONALS: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const ALL_DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];
const KNIGHT_JUMPS: [(i32, i32); 8] = [
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (-2, -1),
    (-2, 1),
    (2, -1),
    (2, 1),
];

pub trait LegalityChecker {
    fn is_legal(&self, board: &Board, from: BoardPosition, to: BoardPosition) -> bool;
}

// Accepts any move that passed the basic checks
#[derive(Debug, Default, Clone, Copy)]
pub struct AnyMove;

impl LegalityChecker for AnyMove {
    fn is_legal(&self, _board: &Board, _from: BoardPosition, _to: BoardPosition) -> bool {
        true
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct KingRules;

impl LegalityChecker for KingRules {
    fn is_legal(&self, board: &Board, from: BoardPosition, to: BoardPosition) -> bool {
        is_step(board, from, to, &ALL_DIRECTIONS)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct QueenRules;

impl LegalityChecker for QueenRules {
    fn is_legal(&self, board: &Board, from: BoardPosition, to: BoardPosition) -> bool {
        is_slide(board, from, to, &ALL_DIRECTIONS)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BishopRules;

impl LegalityChecker for BishopRules {
    fn is_legal(&self, board: &Board, from: BoardPosition, to: BoardPosition) -> bool {
        is_slide(board, from, to, &DIAGONALS)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct KnightRules;

impl LegalityChecker for KnightRules {
    fn is_legal(&self, board: &Board, from: BoardPosition, to: BoardPosition) -> bool {
        is_step(board, from, to, &KNIGHT_JUMPS)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PawnRules;

impl LegalityChecker for PawnRules {
    fn is_legal(&self, board: &Board, from: BoardPosition, to: BoardPosition) -> bool {
        let color = match board.get(from) {
            Some(piece) => piece.color,
            None => return false,
        };
        let forward = color.forward();
        if from.offset(board, 0, forward) == Some(to) {
            return board.get(to).is_none();
        }
        let is_diagonal = [-1, 1]
            .iter()
            .any(|&side| from.offset(board, side, forward) == Some(to));
        is_diagonal && board.get(to).map_or(false, |p| p.color != color)
    }
}

/// Standard mini-chess movement, dispatched on the kind of the moving piece.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardRules;

impl StandardRules {
    pub fn for_kind(kind: PieceKind) -> &'static dyn LegalityChecker {
        match kind {
            PieceKind::King => &KingRules,
            PieceKind::Queen => &QueenRules,
            PieceKind::Bishop => &BishopRules,
            PieceKind::Knight => &KnightRules,
            PieceKind::Pawn => &PawnRules,
        }
    }
}

impl LegalityChecker for StandardRules {
    fn is_legal(&self, board: &Board, from: BoardPosition, to: BoardPosition) -> bool {
        match board.get(from) {
            Some(piece) => StandardRules::for_kind(piece.kind).is_legal(board, from, to),
            None => false,
        }
    }
}

fn is_step(board: &Board, from: BoardPosition, to: BoardPosition, deltas: &[(i32, i32)]) -> bool {
    deltas
        .iter()
        .any(|&(df, dr)| from.offset(board, df, dr) == Some(to))
}

// Walk each direction until the edge of the board or the first occupied square
fn is_slide(
    board: &Board,
    from: BoardPosition,
    to: BoardPosition,
    directions: &[(i32, i32)],
) -> bool {
    directions.iter().any(|&(df, dr)| {
        let mut current = from;
        while let Some(next) = current.offset(board, df, dr) {
            if next == to {
                return true;
            }
            if board.get(next).is_some() {
                return false;
            }
            current = next;
        }
        false
    })
}
