//! Star systems and the galaxy collaborator.
//!
//! The kernel only needs a handful of things from the wider universe: the
//! layout of the system the flagship is in, where its links lead, and a
//! daily economy tick on arrival. `Universe` is that seam; `Galaxy` is the
//! serde-loaded implementation used by the headless binary and the tests.

use std::collections::BTreeMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use skirmish_core::attributes::ShipAttributes;
use skirmish_core::enums::Personality;
use skirmish_core::types::{GovernmentId, SystemId};

/// Weapons to install on a hull.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loadout {
    pub weapon: String,
    pub count: i32,
}

/// A ship design.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipSpec {
    pub name: String,
    pub attributes: ShipAttributes,
    pub radius: f64,
    pub guns: Vec<DVec2>,
    pub turrets: Vec<DVec2>,
    pub weapons: Vec<Loadout>,
    pub cargo: BTreeMap<String, u32>,
    pub ammo: BTreeMap<String, u32>,
}

/// A group of ships that appear together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetSpec {
    pub government: GovernmentId,
    pub personality: Personality,
    pub ships: Vec<ShipSpec>,
    /// Mean ticks between arrivals; 0 spawns only on system entry.
    pub period: u32,
}

/// A recurring area hazard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardSpec {
    /// Weapon whose damage block the hazard deals each pulse.
    pub weapon: String,
    /// Mean ticks between occurrences.
    pub period: u32,
    pub duration: u32,
    /// Ticks between damage pulses while active; 0 pulses every tick.
    pub pulse: u32,
    pub inner_radius: f64,
    pub outer_radius: f64,
    /// Hits every ship in the system regardless of radius.
    pub system_wide: bool,
    pub strength: f64,
}

/// A minable asteroid type and how many orbit in the system.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MinableSpec {
    pub commodity: String,
    pub count: u32,
    pub hull: f64,
    pub radius: f64,
    pub orbit_radius: f64,
    pub eccentricity: f64,
}

/// Asteroid field contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BeltSpec {
    pub asteroids: u32,
    pub asteroid_radius: f64,
    pub asteroid_speed: f64,
    pub minables: Vec<MinableSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Planet {
    pub name: String,
    pub position: DVec2,
    pub radius: f64,
    pub government: GovernmentId,
    /// Launched once when a hostile ship comes within defense range.
    pub defense: Option<FleetSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StarSystem {
    pub id: SystemId,
    pub name: String,
    pub links: Vec<SystemId>,
    pub planets: Vec<Planet>,
    pub fleets: Vec<FleetSpec>,
    pub hazards: Vec<HazardSpec>,
    pub belt: BeltSpec,
    /// Arrivals through a wormhole appear here instead of at the jump radius.
    pub wormhole: Option<DVec2>,
    /// Commodity supply, relaxed toward `baseline` once per day.
    pub supply: BTreeMap<String, f64>,
    pub baseline: BTreeMap<String, f64>,
}

/// What the kernel asks of the surrounding universe.
pub trait Universe: Send {
    fn system(&self, id: SystemId) -> Option<&StarSystem>;

    /// Advance markets by one day.
    fn step_economy(&mut self);

    fn day(&self) -> u64;

    /// First linked system, used by AI pilots looking for an exit.
    fn exit_from(&self, id: SystemId) -> Option<SystemId> {
        self.system(id).and_then(|s| s.links.first().copied())
    }
}

/// Serde-loaded galaxy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Galaxy {
    pub systems: Vec<StarSystem>,
    pub day: u64,
}

/// Fraction of the gap to baseline closed each day.
const SUPPLY_RELAXATION: f64 = 0.1;

impl Universe for Galaxy {
    fn system(&self, id: SystemId) -> Option<&StarSystem> {
        self.systems.iter().find(|s| s.id == id)
    }

    fn step_economy(&mut self) {
        self.day += 1;
        for system in &mut self.systems {
            for (commodity, baseline) in &system.baseline {
                let supply = system.supply.entry(commodity.clone()).or_insert(*baseline);
                *supply += (baseline - *supply) * SUPPLY_RELAXATION;
            }
        }
    }

    fn day(&self) -> u64 {
        self.day
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_galaxy_from_json() {
        let json = r#"{
            "systems": [
                {"id": 1, "name": "Sol", "links": [2],
                 "planets": [{"name": "Earth", "position": [0.0, 0.0], "radius": 100.0, "government": 0}],
                 "supply": {"Food": 0.0}, "baseline": {"Food": 100.0}},
                {"id": 2, "name": "Alpha", "links": [1], "wormhole": [500.0, 0.0]}
            ]
        }"#;
        let mut galaxy: Galaxy = serde_json::from_str(json).unwrap();
        assert_eq!(galaxy.system(SystemId(1)).unwrap().name, "Sol");
        assert_eq!(galaxy.exit_from(SystemId(1)), Some(SystemId(2)));
        assert_eq!(galaxy.system(SystemId(2)).unwrap().wormhole, Some(DVec2::new(500.0, 0.0)));
        assert!(galaxy.system(SystemId(9)).is_none());

        galaxy.step_economy();
        assert_eq!(galaxy.day(), 1);
        assert_eq!(galaxy.system(SystemId(1)).unwrap().supply["Food"], 10.0);
    }
}
