//! Per-tick output frame: the draw list and radar list handed to the
//! foreground thread, plus the events produced during the tick.
//!
//! Frames are reused: the calc thread clears and refills the buffer it owns.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::constants::{FRAME_DRAW_CAPACITY, FRAME_RADAR_CAPACITY};
use crate::enums::*;
use crate::events::{ShipEvent, SoundCue};
use crate::resources::ResourceLevels;
use crate::types::{ShipId, SimTime, SystemId};

/// One thing to draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawItem {
    pub kind: DrawKind,
    pub position: DVec2,
    pub velocity: DVec2,
    pub facing: f64,
    pub radius: f64,
}

/// One radar blip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadarBlip {
    pub position: DVec2,
    pub radius: f64,
    pub relation: RadarRelation,
}

/// Flagship status for the HUD.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlagshipView {
    pub id: Option<ShipId>,
    pub system: SystemId,
    pub position: DVec2,
    pub levels: ResourceLevels,
    pub target: Option<ShipId>,
    pub disabled: bool,
}

/// The complete output of one tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Frame {
    pub time: SimTime,
    pub phase: GamePhase,
    pub draw: Vec<DrawItem>,
    pub radar: Vec<RadarBlip>,
    pub events: Vec<ShipEvent>,
    pub cues: Vec<SoundCue>,
    pub flagship: FlagshipView,
}

impl Frame {
    pub fn with_capacity() -> Self {
        Self {
            draw: Vec::with_capacity(FRAME_DRAW_CAPACITY),
            radar: Vec::with_capacity(FRAME_RADAR_CAPACITY),
            ..Self::default()
        }
    }

    /// Empty the frame while keeping its allocations.
    pub fn clear(&mut self) {
        self.draw.clear();
        self.radar.clear();
        self.events.clear();
        self.cues.clear();
        self.flagship = FlagshipView::default();
    }
}
