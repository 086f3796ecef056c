use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn other(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    // Direction of travel along the rank axis, rank 1 being White's home rank
    pub fn forward(self) -> i32 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    fn prefix(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    King,
    Queen,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    fn symbol(self) -> char {
        match self {
            PieceKind::King => 'K',
            PieceKind::Queen => 'Q',
            PieceKind::Bishop => 'B',
            PieceKind::Knight => 'N',
            PieceKind::Pawn => 'p',
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PieceKind::King => "King",
            PieceKind::Queen => "Queen",
            PieceKind::Bishop => "Bishop",
            PieceKind::Knight => "Knight",
            PieceKind::Pawn => "Pawn",
        };
        write!(f, "{}", name)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Piece { color, kind }
    }

    // Parses the two character code used on the board, e.g. "wK" or "bp"
    pub fn from_code(code: &str) -> Option<Self> {
        let mut chars = code.chars();
        let color = match chars.next()? {
            'w' => Color::White,
            'b' => Color::Black,
            _ => return None,
        };
        let kind = match chars.next()? {
            'K' => PieceKind::King,
            'Q' => PieceKind::Queen,
            'B' => PieceKind::Bishop,
            'N' => PieceKind::Knight,
            'p' => PieceKind::Pawn,
            _ => return None,
        };
        if chars.next().is_some() {
            return None;
        }
        Some(Piece { color, kind })
    }

    pub fn is_king(&self) -> bool {
        self.kind == PieceKind::King
    }
}

// Renders as the two character code used on the board, e.g. "wK" or "bp"
impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.color.prefix(), self.kind.symbol())
    }
}
