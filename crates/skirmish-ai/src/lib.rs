//! Pilot AI for SKIRMISH.
//!
//! Implements the per-ship decision state machine and personality-driven
//! behavior profiles. Pure functions over plain data; the sim crate gathers
//! the context and applies the resulting commands.

pub mod fsm;
pub mod profiles;

pub use skirmish_core as core;

#[cfg(test)]
mod tests;
