//! Core types and definitions for the SKIRMISH combat simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! resource channels, weapon and hull stat blocks, components, commands,
//! frames, events, and constants. It has no dependency on the ECS or any
//! runtime framework.

pub mod attributes;
pub mod commands;
pub mod components;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod resources;
pub mod state;
pub mod types;
pub mod weapon;

#[cfg(test)]
mod tests;
