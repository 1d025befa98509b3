//! Events emitted by the simulation for AI, mission, UI, and audio consumers.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::ShipEventKind;
use crate::types::{GovernmentId, ShipId, SystemId};

/// A notification about something that happened to a ship this tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipEvent {
    pub kind: ShipEventKind,
    /// The ship that caused the event, if any.
    pub actor: Option<ShipId>,
    pub target: ShipId,
    pub tick: u64,
}

/// Sound cues for the external audio collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SoundCue {
    /// A ship began its hyperspace jump in the flagship's system.
    HyperspaceEntry { position: DVec2 },
    /// The flagship arrived in a new system.
    SystemArrival { system: SystemId },
    /// Something exploded.
    Explosion { position: DVec2 },
    /// A weapon fired in the flagship's system.
    WeaponFire { position: DVec2 },
    /// A planet launched its defense fleet.
    DefenseLaunch { government: GovernmentId },
}
