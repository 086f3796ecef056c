use crate::config::GameConfig;
use std::fs::File;
use std::io::{self, BufWriter, Write};

// Human-readable transcript of a game, mirroring what the players saw
pub struct GameTrace<W: Write> {
    out: W,
}

impl GameTrace<BufWriter<File>> {
    pub fn create(config: &GameConfig) -> io::Result<Self> {
        let file = File::create(trace_file_name(config))?;
        Ok(GameTrace::new(BufWriter::new(file)))
    }
}

impl<W: Write> GameTrace<W> {
    pub fn new(out: W) -> Self {
        GameTrace { out }
    }

    pub fn record_parameters(&mut self, config: &GameConfig) -> io::Result<()> {
        writeln!(self.out, "Max turns: {}", config.max_turns)?;
        writeln!(
            self.out,
            "{} vs. {}",
            player_kind(config.white_ai),
            player_kind(config.black_ai)
        )
    }

    pub fn record(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }
}

pub fn trace_file_name(config: &GameConfig) -> String {
    format!("gameTrace-{}.txt", config.max_turns)
}

fn player_kind(is_ai: bool) -> &'static str {
    if is_ai {
        "AI"
    } else {
        "Human"
    }
}
