//! ECS components for ship entities.
//!
//! Components are plain data structs. Game logic lives in the sim crate's
//! systems, not here.

use std::collections::BTreeMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::resources::ResourceLevels;
use crate::types::{GovernmentId, SystemId};

/// Kinematic state plus the collision mask radius.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub position: DVec2,
    pub velocity: DVec2,
    /// Radians, 0 = +y, clockwise.
    pub facing: f64,
    /// Radius of the circular collision mask.
    pub radius: f64,
}

impl Body {
    pub fn new(position: DVec2, radius: f64) -> Self {
        Self {
            position,
            radius,
            ..Self::default()
        }
    }

    /// Distance from `point` to the mask edge, 0 if inside.
    pub fn mask_distance(&self, point: DVec2) -> f64 {
        (self.position.distance(point) - self.radius).max(0.0)
    }
}

/// Live resource levels and status flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vitals {
    pub levels: ResourceLevels,
    pub disabled: bool,
    pub destroyed: bool,
    /// 0 = fully visible, 1 = fully cloaked.
    pub cloak: f64,
    /// Whether the pilot is trying to cloak.
    pub cloaking: bool,
    /// Overheated ships cannot fire until heat drops below capacity.
    pub overheated: bool,
    /// Ammunition by weapon name.
    pub ammo: BTreeMap<String, u32>,
}

/// Government membership.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allegiance {
    pub government: GovernmentId,
}

/// A hyperspace jump in progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Jump {
    pub destination: SystemId,
    pub remaining_ticks: u32,
}

/// Where a ship is and whether it can be targeted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Presence {
    pub system: SystemId,
    pub targetable: bool,
    pub jump: Option<Jump>,
}

/// Cargo hold.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cargo {
    pub capacity: u32,
    pub commodities: BTreeMap<String, u32>,
}

impl Cargo {
    pub fn used(&self) -> u32 {
        self.commodities.values().sum()
    }

    pub fn free(&self) -> u32 {
        self.capacity.saturating_sub(self.used())
    }

    /// Store up to `amount`, returning how much fit.
    pub fn add(&mut self, commodity: &str, amount: u32) -> u32 {
        let taken = amount.min(self.free());
        if taken > 0 {
            *self.commodities.entry(commodity.to_string()).or_insert(0) += taken;
        }
        taken
    }
}

/// Accumulated scan progress against the current target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanProgress {
    pub cargo: f64,
    pub outfits: f64,
    pub cargo_done: bool,
    pub outfits_done: bool,
}

/// Display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipName(pub String);

/// Marks the player's flagship.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Flagship;
