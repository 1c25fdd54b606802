//! Core data models for the duo tracker.

mod game;
mod player;
mod server;
mod stats;

pub use game::*;
pub use player::*;
pub use server::*;
pub use stats::*;
