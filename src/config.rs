use crate::minichess::Color;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_MAX_TURNS: u32 = 100;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Max turns must be a whole number, got '{0}'")]
    InvalidMaxTurns(String),
    #[error("Max turns must be greater than zero")]
    NoTurns,
    #[error("Expected Y or N, got '{0}'")]
    InvalidAnswer(String),
    #[error("Input ended before the game was configured")]
    MissingInput,
    #[error("Could not read configuration: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid configuration file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings fixed for the whole game. Player 1 plays White, Player 2 Black.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GameConfig {
    pub max_turns: u32,
    // Accepted for compatibility with AI play; both sides are entered by hand
    #[serde(default)]
    pub white_ai: bool,
    #[serde(default)]
    pub black_ai: bool,
    #[serde(default = "default_starting_side")]
    pub starting_side: Color,
}

fn default_starting_side() -> Color {
    Color::White
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            max_turns: DEFAULT_MAX_TURNS,
            white_ai: false,
            black_ai: false,
            starting_side: default_starting_side(),
        }
    }
}

impl GameConfig {
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.max_turns == 0 {
            return Err(ConfigError::NoTurns);
        }
        Ok(self)
    }

    pub fn is_ai(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_ai,
            Color::Black => self.black_ai,
        }
    }

    /// Asks for each setting in turn, failing on the first invalid answer.
    pub fn from_prompts<R: BufRead, W: Write>(
        input: &mut R,
        output: &mut W,
    ) -> Result<Self, ConfigError> {
        let max_turns = parse_max_turns(&prompt(input, output, "Max turns: ")?)?;
        let white_ai = parse_yes_no(&prompt(input, output, "Player 1 AI Y/N: ")?)?;
        let black_ai = parse_yes_no(&prompt(input, output, "Player 2 AI Y/N: ")?)?;
        GameConfig {
            max_turns,
            white_ai,
            black_ai,
            ..GameConfig::default()
        }
        .validate()
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(text)?;
        config.validate()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        GameConfig::from_json(&text)
    }
}

fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> Result<String, ConfigError> {
    write!(output, "{}", question)?;
    output.flush()?;
    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        return Err(ConfigError::MissingInput);
    }
    Ok(answer.trim().to_string())
}

pub fn parse_max_turns(answer: &str) -> Result<u32, ConfigError> {
    let max_turns = answer
        .trim()
        .parse::<u32>()
        .map_err(|_| ConfigError::InvalidMaxTurns(answer.to_string()))?;
    if max_turns == 0 {
        return Err(ConfigError::NoTurns);
    }
    Ok(max_turns)
}

pub fn parse_yes_no(answer: &str) -> Result<bool, ConfigError> {
    match answer.trim() {
        "Y" | "y" => Ok(true),
        "N" | "n" => Ok(false),
        other => Err(ConfigError::InvalidAnswer(other.to_string())),
    }
}
