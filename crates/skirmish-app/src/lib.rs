//! Skirmish application layer.
//!
//! Runs the simulation engine on a calc thread and hands finished frames to
//! the foreground through a two-slot exchange.

pub mod exchange;
pub mod game_loop;

pub use skirmish_core as core;
pub use skirmish_sim as sim;
