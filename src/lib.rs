pub mod config;
pub mod game;
pub mod minichess;
pub mod trace;

pub use crate::minichess::*;
