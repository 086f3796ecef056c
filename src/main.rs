use minichess::config::{ConfigError, GameConfig};
use minichess::game::{GameError, GameLoop};
use minichess::trace::GameTrace;
use minichess::{GameResult, StandardRules};
use std::env;
use std::io;
use std::process;
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
enum AppError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("Could not create the game trace: {0}")]
    Trace(io::Error),
    #[error("{0}")]
    Game(#[from] GameError),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) => 2,
            AppError::Trace(_) | AppError::Game(_) => 1,
        }
    }
}

fn main() {
    let file_appender = tracing_appender::rolling::daily("./logs", "minichess.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_writer(non_blocking)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Logging is disabled: {}", err);
    }

    let code = match run() {
        Ok(GameResult::Exited) => 1,
        Ok(_) => 0,
        Err(err) => {
            error!(%err, "minichess stopped");
            eprintln!("{}", err);
            err.exit_code()
        }
    };
    // process::exit skips destructors, so flush the log writer first
    drop(guard);
    process::exit(code);
}

#[tracing::instrument]
fn run() -> Result<GameResult, AppError> {
    let mut input = io::stdin().lock();
    let mut output = io::stdout();
    let config = match env::args().nth(1) {
        Some(path) => {
            info!(%path, "loading configuration file");
            GameConfig::from_file(path)?
        }
        None => GameConfig::from_prompts(&mut input, &mut output)?,
    };
    info!(?config, "configuration accepted");

    let trace = GameTrace::create(&config).map_err(AppError::Trace)?;
    let mut game = GameLoop::new(config, StandardRules, input, output, trace);
    Ok(game.run()?)
}
