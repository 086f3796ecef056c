use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Expected a move like 'B2 B3', found {0} square(s)")]
    WrongSquareCount(usize),
    #[error("Square '{0}' does not start with a file letter")]
    InvalidFile(String),
    #[error("Square '{0}' does not end with a rank number")]
    InvalidRank(String),
    #[error("Move '{0}' is not valid UTF-8 text")]
    NotText(String),
}

// A square as written by a player. It is not tied to any board, so it may
// lie outside of the board it is later applied to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Square {
    // 0 for file A
    pub file: usize,
    // 1 for the first rank, as written
    pub rank: usize,
}

impl Square {
    pub fn new(file: usize, rank: usize) -> Self {
        Square { file, rank }
    }

    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut chars = text.chars();
        let file = match chars.next() {
            Some(c) if c.is_ascii_alphabetic() => c.to_ascii_uppercase() as usize - 'A' as usize,
            _ => return Err(ParseError::InvalidFile(text.to_string())),
        };
        let rank_text = chars.as_str();
        if rank_text.is_empty() || !rank_text.chars().all(|c| c.is_ascii_digit()) {
            return Err(ParseError::InvalidRank(text.to_string()));
        }
        let rank = rank_text
            .parse::<usize>()
            .map_err(|_| ParseError::InvalidRank(text.to_string()))?;
        Ok(Square { file, rank })
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match u8::try_from(self.file) {
            Ok(file) if file < 26 => write!(f, "{}{}", (b'A' + file) as char, self.rank),
            _ => write!(f, "#{}{}", self.file, self.rank),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Move { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.from, self.to)
    }
}

/// Parses a move written as `<file><rank> <file><rank>`, e.g. `B2 B3`.
///
/// File letters are case-insensitive. Nothing is checked against a board here,
/// so `Z9 Z9` parses successfully.
pub fn parse_move(text: &str) -> Result<Move, ParseError> {
    let squares: Vec<&str> = text.split_whitespace().collect();
    match squares[..] {
        [from, to] => Ok(Move {
            from: Square::parse(from)?,
            to: Square::parse(to)?,
        }),
        _ => Err(ParseError::WrongSquareCount(squares.len())),
    }
}
