//! Hull and outfit attributes of a ship: capacities, regeneration,
//! protections, and the inputs the damage model reads.

use serde::{Deserialize, Serialize};

use crate::resources::ResourceLevels;

/// Everything about a ship that stays constant between outfit changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipAttributes {
    // --- Capacities ---
    pub hull: f64,
    pub shields: f64,
    pub energy_capacity: f64,
    pub fuel_capacity: f64,
    /// Heat at which the ship overheats and stops firing.
    pub heat_capacity: f64,
    /// Fraction of hull below which the ship is disabled.
    pub disabled_threshold: f64,
    pub mass: f64,
    pub cargo_space: u32,

    // --- Per-tick generation ---
    pub shield_generation: f64,
    pub hull_repair: f64,
    pub energy_generation: f64,
    pub fuel_generation: f64,
    /// Fraction of current heat shed each tick.
    pub heat_dissipation: f64,
    /// Energy consumed per unit of shield generated.
    pub shield_energy: f64,

    // --- Motion ---
    pub thrust: f64,
    pub turn: f64,
    pub drag: f64,

    // --- Protection ---
    /// Per-channel divisor term: damage is divided by `1 + protection`.
    pub protection: ResourceLevels,
    pub force_protection: f64,
    pub piercing_protection: f64,
    pub piercing_resistance: f64,
    pub high_shield_permeability: f64,
    pub low_shield_permeability: f64,
    pub cloaked_shield_permeability: f64,

    // --- Resistance ---
    /// Per-tick reduction of each DoT channel.
    pub resistance: ResourceLevels,
    /// Energy spent per point of DoT resisted.
    pub resistance_energy: f64,

    // --- Sensors and cloak ---
    pub cargo_scan_range: f64,
    pub cargo_scan_speed: f64,
    pub outfit_scan_range: f64,
    pub outfit_scan_speed: f64,
    /// Cloak change per tick while cloaking.
    pub cloak_rate: f64,
}

impl Default for ShipAttributes {
    fn default() -> Self {
        Self {
            hull: 1000.0,
            shields: 1000.0,
            energy_capacity: 1000.0,
            fuel_capacity: 400.0,
            heat_capacity: 1000.0,
            disabled_threshold: 0.15,
            mass: 100.0,
            cargo_space: 20,
            shield_generation: 1.0,
            hull_repair: 0.0,
            energy_generation: 2.0,
            fuel_generation: 0.0,
            heat_dissipation: 0.01,
            shield_energy: 1.0,
            thrust: 10.0,
            turn: 0.05,
            drag: 0.05,
            protection: ResourceLevels::default(),
            force_protection: 0.0,
            piercing_protection: 0.0,
            piercing_resistance: 0.0,
            high_shield_permeability: 0.0,
            low_shield_permeability: 0.0,
            cloaked_shield_permeability: 0.0,
            resistance: ResourceLevels::default(),
            resistance_energy: 0.0,
            cargo_scan_range: 0.0,
            cargo_scan_speed: 1.0,
            outfit_scan_range: 0.0,
            outfit_scan_speed: 1.0,
            cloak_rate: 0.0,
        }
    }
}

impl ShipAttributes {
    /// Hull level below which the ship is disabled.
    pub fn minimum_hull(&self) -> f64 {
        self.hull * self.disabled_threshold.clamp(0.0, 1.0)
    }

    /// Capacity of an instantaneous channel, 0 for DoT channels.
    pub fn capacity(&self, channel: crate::resources::Channel) -> f64 {
        use crate::resources::Channel;
        match channel {
            Channel::Hull => self.hull,
            Channel::Shields => self.shields,
            Channel::Energy => self.energy_capacity,
            Channel::Heat => self.heat_capacity,
            Channel::Fuel => self.fuel_capacity,
            _ => 0.0,
        }
    }

    /// Levels of a freshly launched ship: everything full, heat cold.
    pub fn full_levels(&self) -> ResourceLevels {
        ResourceLevels {
            hull: self.hull,
            shields: self.shields,
            energy: self.energy_capacity,
            fuel: self.fuel_capacity,
            ..ResourceLevels::default()
        }
    }
}
