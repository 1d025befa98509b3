//! Commands sent into the simulation.
//!
//! Player commands are queued and processed at the next tick boundary;
//! pilot commands are produced by the AI (or copied from player input for
//! the flagship) every tick.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::types::{ShipId, SystemId};

/// All possible player actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    /// Steer the flagship for the next ticks until changed.
    Steer { thrust: f64, turn: f64, fire: bool },
    /// Select the ship under a world-space click as the flagship's target.
    Click { point: DVec2 },
    /// Select a target directly.
    Target { ship: Option<ShipId> },
    /// Begin a hyperspace jump to a linked system.
    Jump { destination: SystemId },
    /// Toggle the cloaking device.
    Cloak { enabled: bool },
    /// Set time scale (1.0 = normal, 0.0 = paused).
    SetTimeScale { scale: f64 },
    Pause,
    Resume,
}

/// One tick of control input for a ship.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PilotCommand {
    /// -1 (reverse) ..= 1 (full forward).
    pub thrust: f64,
    /// -1 (counter-clockwise) ..= 1 (clockwise).
    pub turn: f64,
    /// Fire every ready primary weapon.
    pub fire: bool,
    /// World point turrets should track.
    pub aim: Option<DVec2>,
    /// Begin a hyperspace jump.
    pub jump: Option<SystemId>,
    pub cloak: bool,
}
