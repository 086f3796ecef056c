use crate::config::GameConfig;
use crate::minichess::{
    Color, GameResult, GameState, LegalityChecker, MoveError, Outcome, ParseError,
    INACTIVITY_LIMIT,
};
use crate::trace::GameTrace;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Lost contact with the players: {0}")]
    Io(#[from] io::Error),
    #[error("Could not summarise the game: {0}")]
    Summary(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq)]
pub enum LoopState {
    AwaitingInput(Color),
    // Raw text entered by the side to move
    Applying(String),
    GameOver(GameResult),
}

#[derive(Serialize)]
struct GameSummary {
    game_id: Uuid,
    result: GameResult,
    turns: u32,
    turns_without_capture: u32,
    pieces_left: usize,
}

/// Alternates turns between the two sides until the game ends.
///
/// Both sides read moves from the same `input`. Everything shown to the
/// players goes to `output` and is copied into the trace.
pub struct GameLoop<L: LegalityChecker, R: BufRead, W: Write, T: Write> {
    game_state: GameState,
    rules: L,
    input: R,
    output: W,
    trace: GameTrace<T>,
    state: LoopState,
    game_id: Uuid,
}

impl<L: LegalityChecker, R: BufRead, W: Write, T: Write> GameLoop<L, R, W, T> {
    pub fn new(config: GameConfig, rules: L, input: R, output: W, trace: GameTrace<T>) -> Self {
        GameLoop::with_game_state(GameState::new(config), rules, input, output, trace)
    }

    pub fn with_game_state(
        game_state: GameState,
        rules: L,
        input: R,
        output: W,
        trace: GameTrace<T>,
    ) -> Self {
        let state = LoopState::AwaitingInput(game_state.side_to_move());
        GameLoop {
            game_state,
            rules,
            input,
            output,
            trace,
            state,
            game_id: Uuid::new_v4(),
        }
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    pub fn game_state(&self) -> &GameState {
        &self.game_state
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn trace(&self) -> &GameTrace<T> {
        &self.trace
    }

    pub fn run(&mut self) -> Result<GameResult, GameError> {
        let span = tracing::info_span!("game", game_id = %self.game_id);
        let _entered = span.enter();
        info!(config = ?self.game_state.config(), "game started");

        self.trace.record_parameters(self.game_state.config())?;
        for color in [Color::White, Color::Black] {
            if self.game_state.config().is_ai(color) {
                warn!(%color, "AI play requested but not available");
                self.say(&format!(
                    "AI play is not available yet, moves for {} are entered by hand.",
                    color
                ))?;
            }
        }
        self.say("Welcome to Mini Chess! Enter moves as 'B2 B3'. Type 'moves' to list legal moves or 'exit' to quit.")?;

        let result = loop {
            if let LoopState::GameOver(result) = self.state {
                break result;
            }
            self.step()?;
        };
        self.report(result)?;
        Ok(result)
    }

    // Performs a single state transition
    pub fn step(&mut self) -> Result<(), GameError> {
        let state = std::mem::replace(&mut self.state, LoopState::GameOver(GameResult::Exited));
        self.state = match state {
            LoopState::AwaitingInput(side) => self.await_input(side)?,
            LoopState::Applying(text) => self.apply(&text)?,
            over @ LoopState::GameOver(_) => over,
        };
        Ok(())
    }

    fn await_input(&mut self, side: Color) -> Result<LoopState, GameError> {
        self.say(&format!("\nTurn #{}", self.game_state.turn() + 1))?;
        let board = self.game_state.board().to_string();
        self.say(&board)?;

        write!(self.output, "{} to move: ", side)?;
        self.output.flush()?;
        let mut bytes = Vec::new();
        if self.input.read_until(b'\n', &mut bytes)? == 0 {
            info!(%side, "input closed");
            return Ok(LoopState::GameOver(GameResult::Exited));
        }
        let line = match String::from_utf8(bytes) {
            Ok(line) => line,
            Err(err) => {
                let text = String::from_utf8_lossy(err.as_bytes()).trim().to_string();
                self.trace.record(&format!("{} to move: {}", side, text))?;
                let err = MoveError::from(ParseError::NotText(text));
                warn!(%side, %err, "move rejected");
                self.say(&format!("Invalid move: {}. Try again.", err))?;
                return Ok(LoopState::AwaitingInput(side));
            }
        };
        let text = line.trim();
        self.trace.record(&format!("{} to move: {}", side, text))?;

        match text.to_ascii_lowercase().as_str() {
            "exit" => Ok(LoopState::GameOver(GameResult::Exited)),
            "moves" => {
                let moves = self.game_state.legal_moves(&self.rules);
                for mv in moves {
                    let kind = self
                        .game_state
                        .board()
                        .piece_at(mv.from)
                        .ok()
                        .flatten()
                        .map(|p| p.kind.to_string())
                        .unwrap_or_default();
                    self.say(&format!("{} {}", kind, mv))?;
                }
                Ok(LoopState::AwaitingInput(side))
            }
            _ => Ok(LoopState::Applying(text.to_string())),
        }
    }

    fn apply(&mut self, text: &str) -> Result<LoopState, GameError> {
        let side = self.game_state.side_to_move();
        match self.game_state.apply_move(text, &self.rules) {
            Ok(Outcome::Continue) => Ok(LoopState::AwaitingInput(self.game_state.side_to_move())),
            Ok(Outcome::GameOver(result)) => Ok(LoopState::GameOver(result)),
            Err(err) => {
                warn!(%side, input = text, %err, "move rejected");
                self.say(&format!("Invalid move: {}. Try again.", err))?;
                Ok(LoopState::AwaitingInput(side))
            }
        }
    }

    fn report(&mut self, result: GameResult) -> Result<(), GameError> {
        let board = self.game_state.board().to_string();
        self.say("")?;
        self.say(&board)?;
        let message = match result {
            GameResult::Winner(color) => {
                format!("\n{} WINS in {} turns!", color, self.game_state.turn())
            }
            GameResult::Draw => format!(
                "\nThere has been no captures in {} turns, DRAW",
                INACTIVITY_LIMIT
            ),
            GameResult::TurnLimitReached => "\nMaximum amount of turns reached, DRAW".to_string(),
            GameResult::Exited => "\nGame exited.".to_string(),
        };
        self.say(&message)?;
        self.trace.flush()?;

        let summary = GameSummary {
            game_id: self.game_id,
            result,
            turns: self.game_state.turn(),
            turns_without_capture: self.game_state.turns_without_capture(),
            pieces_left: self.game_state.board().count_pieces(),
        };
        let summary = serde_json::to_string(&summary)?;
        info!(%summary, "game over");
        Ok(())
    }

    fn say(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{}", text)?;
        self.trace.record(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minichess::{AnyMove, Board, StandardRules};
    use std::io::Cursor;

    type TestLoop<L> = GameLoop<L, Cursor<Vec<u8>>, Vec<u8>, Vec<u8>>;

    fn new_loop(config: GameConfig, input: &str) -> TestLoop<StandardRules> {
        GameLoop::new(
            config,
            StandardRules,
            Cursor::new(input.as_bytes().to_vec()),
            Vec::new(),
            GameTrace::new(Vec::new()),
        )
    }

    fn two_kings_loop(max_turns: u32, input: &str) -> TestLoop<StandardRules> {
        let board = Board::from_codes(&[
            "bK . . . .",
            ". . . . .",
            ". . . . .",
            ". . . . .",
            ". . . . wK",
        ])
        .unwrap();
        let config = GameConfig {
            max_turns,
            ..GameConfig::default()
        };
        GameLoop::with_game_state(
            GameState::with_board(board, config),
            StandardRules,
            Cursor::new(input.as_bytes().to_vec()),
            Vec::new(),
            GameTrace::new(Vec::new()),
        )
    }

    fn output_of<L: LegalityChecker>(game: &TestLoop<L>) -> String {
        String::from_utf8(game.output().clone()).unwrap()
    }

    #[test]
    fn test_state_transitions() {
        let mut game = new_loop(GameConfig::default(), "B2 B3\nB3 B4\n");
        assert_eq!(game.state(), &LoopState::AwaitingInput(Color::White));
        game.step().unwrap();
        assert_eq!(game.state(), &LoopState::Applying("B2 B3".to_string()));
        game.step().unwrap();
        assert_eq!(game.state(), &LoopState::AwaitingInput(Color::Black));

        // Rejected moves hand the turn back to the same side
        game.step().unwrap();
        assert_eq!(game.state(), &LoopState::Applying("B3 B4".to_string()));
        game.step().unwrap();
        assert_eq!(game.state(), &LoopState::AwaitingInput(Color::Black));
        assert_eq!(game.game_state().turn(), 1);

        // Input is exhausted
        game.step().unwrap();
        assert_eq!(game.state(), &LoopState::GameOver(GameResult::Exited));
    }

    #[test]
    fn test_inactivity_draw() {
        let input = "E1 E2\nA5 A4\nE2 E1\nA4 A5\nE1 E2\nA5 A4\nE2 E1\nA4 A5\nE1 E2\nA5 A4\nE2 E1\n";
        let mut game = two_kings_loop(20, input);
        assert_eq!(game.run().unwrap(), GameResult::Draw);
        assert_eq!(game.game_state().turn(), 10);
        assert!(output_of(&game).ends_with("There has been no captures in 10 turns, DRAW\n"));
    }

    #[test]
    fn test_turn_limit() {
        let mut game = two_kings_loop(4, "E1 E2\nA5 A4\nE2 E1\nA4 A5\nE1 E2\n");
        assert_eq!(game.run().unwrap(), GameResult::TurnLimitReached);
        assert_eq!(game.game_state().turn(), 4);
        assert!(output_of(&game).ends_with("Maximum amount of turns reached, DRAW\n"));
    }

    #[test]
    fn test_king_capture_ends_game_immediately() {
        let board = Board::from_codes(&[
            "bK . . . .",
            ". . . . .",
            ". . . . .",
            ". . . . .",
            ". . . bQ wK",
        ])
        .unwrap();
        let config = GameConfig {
            starting_side: Color::Black,
            ..GameConfig::default()
        };
        let input = "A5 A4\nE1 E2\nD1 E2\nA4 A3\nE2 E3\n";
        let mut game = GameLoop::with_game_state(
            GameState::with_board(board, config),
            StandardRules,
            Cursor::new(input.as_bytes().to_vec()),
            Vec::new(),
            GameTrace::new(Vec::new()),
        );
        assert_eq!(game.run().unwrap(), GameResult::Winner(Color::Black));
        assert_eq!(game.game_state().turn(), 3);
        assert!(output_of(&game).ends_with("Black WINS in 3 turns!\n"));
        assert!(!output_of(&game).contains("Turn #4"));
    }

    #[test]
    fn test_invalid_moves_are_reported() {
        let mut game = new_loop(GameConfig::default(), "Z9 Z9\nhello\nB2 B3\nexit\n");
        assert_eq!(game.run().unwrap(), GameResult::Exited);
        assert_eq!(game.game_state().turn(), 1);
        let output = output_of(&game);
        assert_eq!(output.matches("Invalid move").count(), 2);
        assert!(output.contains("lies outside of board width 5"));
        assert_eq!(output.matches("White to move: ").count(), 3);
        assert!(output.contains("Black to move: "));
        assert!(output.ends_with("Game exited.\n"));
    }

    #[test]
    fn test_undecodable_input_is_rejected() {
        let mut game: TestLoop<StandardRules> = GameLoop::new(
            GameConfig::default(),
            StandardRules,
            Cursor::new(b"\xff\xfe B3\nB2 B3\nexit\n".to_vec()),
            Vec::new(),
            GameTrace::new(Vec::new()),
        );
        assert_eq!(game.run().unwrap(), GameResult::Exited);
        assert_eq!(game.game_state().turn(), 1);
        let output = output_of(&game);
        assert_eq!(output.matches("Invalid move").count(), 1);
        assert!(output.contains("is not valid UTF-8 text. Try again."));
        assert_eq!(output.matches("White to move: ").count(), 2);
        assert!(output.contains("Black to move: "));
    }

    #[test]
    fn test_list_moves() {
        let mut game = two_kings_loop(20, "moves\nexit\n");
        game.run().unwrap();
        let output = output_of(&game);
        assert!(output.contains("King E1 E2\n"));
        assert!(output.contains("King E1 D2\n"));
        assert!(output.contains("King E1 D1\n"));
        assert_eq!(game.game_state().turn(), 0);
    }

    #[test]
    fn test_any_move_rules() {
        let mut game: TestLoop<AnyMove> = GameLoop::new(
            GameConfig::default(),
            AnyMove,
            Cursor::new(b"D1 D5\n".to_vec()),
            Vec::new(),
            GameTrace::new(Vec::new()),
        );
        assert_eq!(game.run().unwrap(), GameResult::Exited);
        assert_eq!(game.game_state().turn(), 1);
        assert_eq!(game.game_state().board().count_pieces(), 11);
    }

    #[test]
    fn test_trace_records_game() {
        let config = GameConfig {
            max_turns: 20,
            white_ai: true,
            ..GameConfig::default()
        };
        let mut game = new_loop(config, "B2 B3\nexit\n");
        game.run().unwrap();
        let trace = String::from_utf8(game.trace().get_ref().clone()).unwrap();
        assert!(trace.starts_with("Max turns: 20\nAI vs. Human\n"));
        assert!(trace.contains("AI play is not available yet"));
        assert!(trace.contains("Turn #1\n"));
        assert!(trace.contains("White to move: B2 B3\n"));
        assert!(trace.contains("Black to move: exit\n"));
        assert!(trace.ends_with("Game exited.\n"));
    }
}
