use crate::config::GameConfig;
use crate::minichess::board::{Board, BoardPosition, BoardPositionError};
use crate::minichess::notation::{parse_move, Move, ParseError, Square};
use crate::minichess::piece::{Color, Piece, PieceKind};
use crate::minichess::rules::LegalityChecker;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

// Consecutive turns without a capture after which the game is drawn
pub const INACTIVITY_LIMIT: u32 = 10;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MoveError {
    #[error("Could not read move: {0}")]
    Parse(#[from] ParseError),
    #[error("Move leaves the board: {0}")]
    OutOfBounds(#[from] BoardPositionError),
    #[error("There is no piece on {0}")]
    NoPieceAtSource(Square),
    #[error("The piece on {square} belongs to {owner}, but it is {side}'s turn")]
    WrongTurn {
        square: Square,
        owner: Color,
        side: Color,
    },
    #[error("Cannot capture your own {kind} on {square}")]
    FriendlyCapture { square: Square, kind: PieceKind },
    #[error("A {kind} cannot move {mv}")]
    IllegalMove { kind: PieceKind, mv: Move },
    #[error("The game is already over")]
    GameOver,
}

#[derive(Serialize, Copy, Clone, Debug, PartialEq)]
pub enum GameResult {
    Winner(Color),
    // No capture for INACTIVITY_LIMIT consecutive turns
    Draw,
    TurnLimitReached,
    Exited,
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Winner(color) => write!(f, "{} wins", color),
            GameResult::Draw => write!(f, "draw by inactivity"),
            GameResult::TurnLimitReached => write!(f, "turn limit reached"),
            GameResult::Exited => write!(f, "game exited"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Outcome {
    Continue,
    GameOver(GameResult),
}

#[derive(Clone, Debug)]
pub struct GameState {
    board: Board,
    side_to_move: Color,
    // Accepted half-moves so far
    turn: u32,
    turns_without_capture: u32,
    config: GameConfig,
    result: Option<GameResult>,
}

impl GameState {
    pub fn new(config: GameConfig) -> Self {
        GameState::with_board(Board::default(), config)
    }

    pub fn with_board(board: Board, config: GameConfig) -> Self {
        GameState {
            board,
            side_to_move: config.starting_side,
            turn: 0,
            turns_without_capture: 0,
            config,
            result: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn turns_without_capture(&self) -> u32 {
        self.turns_without_capture
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    pub fn apply_move<L: LegalityChecker>(
        &mut self,
        text: &str,
        rules: &L,
    ) -> Result<Outcome, MoveError> {
        let mv = parse_move(text)?;
        self.apply(mv, rules)
    }

    // validates:
    // - both squares are on the board
    // - the source holds a piece of the side to move
    // - the destination does not hold a friendly piece
    // - the movement rules allow the move
    // Nothing is mutated unless every check passes.
    pub fn apply<L: LegalityChecker>(&mut self, mv: Move, rules: &L) -> Result<Outcome, MoveError> {
        if self.result.is_some() {
            return Err(MoveError::GameOver);
        }
        let (from, to, piece) = self.validate(mv)?;
        if !rules.is_legal(&self.board, from, to) {
            return Err(MoveError::IllegalMove {
                kind: piece.kind,
                mv,
            });
        }

        let placed = promote(&self.board, piece, to);
        self.board.remove_piece(from);
        let captured = self.board.place_piece(to, placed);
        self.turn += 1;
        match captured {
            Some(_) => self.turns_without_capture = 0,
            None => self.turns_without_capture += 1,
        }
        info!(
            side = %self.side_to_move,
            mv = %mv,
            captured = %captured.map_or("none".to_string(), |p| p.to_string()),
            turn = self.turn,
            turns_without_capture = self.turns_without_capture,
            "move applied"
        );

        let outcome = match self.check_game_over(captured) {
            Some(result) => {
                self.result = Some(result);
                Outcome::GameOver(result)
            }
            None => Outcome::Continue,
        };
        self.side_to_move = self.side_to_move.other();
        Ok(outcome)
    }

    // A King capture takes precedence over the turn limit, which takes
    // precedence over the inactivity draw
    fn check_game_over(&self, captured: Option<Piece>) -> Option<GameResult> {
        if captured.map_or(false, |p| p.is_king()) {
            return Some(GameResult::Winner(self.side_to_move));
        }
        if self.turn >= self.config.max_turns {
            return Some(GameResult::TurnLimitReached);
        }
        if self.turns_without_capture >= INACTIVITY_LIMIT {
            return Some(GameResult::Draw);
        }
        None
    }

    fn validate(&self, mv: Move) -> Result<(BoardPosition, BoardPosition, Piece), MoveError> {
        let from = BoardPosition::new(&self.board, mv.from)?;
        let to = BoardPosition::new(&self.board, mv.to)?;
        let piece = self
            .board
            .get(from)
            .ok_or(MoveError::NoPieceAtSource(mv.from))?;
        if piece.color != self.side_to_move {
            return Err(MoveError::WrongTurn {
                square: mv.from,
                owner: piece.color,
                side: self.side_to_move,
            });
        }
        if let Some(target) = self.board.get(to) {
            if target.color == piece.color {
                return Err(MoveError::FriendlyCapture {
                    square: mv.to,
                    kind: target.kind,
                });
            }
        }
        Ok((from, to, piece))
    }

    /// All moves the side to move may make under the given rules.
    pub fn legal_moves<L: LegalityChecker>(&self, rules: &L) -> Vec<Move> {
        let moves: Vec<Move> = self
            .board
            .positions_of(self.side_to_move)
            .into_iter()
            .flat_map(|from| {
                self.board
                    .positions()
                    .filter(move |&to| {
                        self.board
                            .get(to)
                            .map_or(true, |p| p.color != self.side_to_move)
                            && rules.is_legal(&self.board, from, to)
                    })
                    .map(move |to| Move::new(from.square(), to.square()))
            })
            .collect();
        debug!(side = %self.side_to_move, count = moves.len(), "enumerated legal moves");
        moves
    }
}

// Pawns reaching the last rank become Queens
fn promote(board: &Board, piece: Piece, to: BoardPosition) -> Piece {
    if piece.kind == PieceKind::Pawn && to.rank_idx() == board.last_rank_idx(piece.color) {
        Piece::new(piece.color, PieceKind::Queen)
    } else {
        piece
    }
}
