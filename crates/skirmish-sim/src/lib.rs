//! Combat kernel for Skirmish.
//!
//! Owns the hecs ECS world, runs systems at a fixed tick rate,
//! and fills reusable `Frame`s for the presentation side.

pub mod armament;
pub mod asteroids;
pub mod damage;
pub mod diplomacy;
pub mod engine;
pub mod flotsam;
pub mod pilot;
pub mod projectile;
pub mod scenario;
pub mod scene;
pub mod ship;
pub mod spatial;
pub mod systems;
pub mod universe;
pub mod visual;
pub mod weather;
pub mod world_setup;

pub use engine::{SimConfig, SimulationEngine};
pub use skirmish_core as core;
