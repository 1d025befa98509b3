//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are pure functions over `&mut World` (or `&World` for read-only)
//! plus the scene records they touch. Cross-tick state lives in components
//! and in the engine-owned `Scene`.

pub mod advance;
pub mod arrival;
pub mod cleanup;
pub mod collision;
pub mod flotsam;
pub mod movement;
pub mod pilot;
pub mod point_defense;
pub mod scanning;
pub mod snapshot;
pub mod spawner;
pub mod stellar;
pub mod weather;
