//! Scenario files: everything needed to start an engagement, in one JSON
//! document.
//!
//! A scenario bundles the `SimConfig`, the weapon catalog, the galaxy, the
//! initial hostilities, the player's flagship and any AI ships placed at
//! start. `build` validates the whole document before a single entity is
//! spawned.

use std::path::Path;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use skirmish_core::enums::Personality;
use skirmish_core::error::ConfigError;
use skirmish_core::types::{GovernmentId, SystemId};
use skirmish_core::weapon::{WeaponCatalog, WeaponDef};

use crate::engine::{SimConfig, SimulationEngine};
use crate::universe::{Galaxy, ShipSpec, Universe};
use crate::world_setup::Placement;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("ship \"{ship}\" starts in unknown system {system:?}")]
    UnknownSystem { ship: String, system: SystemId },

    #[error("scenario has no player flagship")]
    NoPlayer,
}

/// The player's starting ship.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStart {
    pub ship: ShipSpec,
    pub government: GovernmentId,
    pub system: SystemId,
    pub position: DVec2,
}

/// An AI ship present at start.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioShip {
    pub ship: ShipSpec,
    pub government: GovernmentId,
    pub personality: Personality,
    pub system: SystemId,
    pub position: DVec2,
    pub facing: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub config: SimConfig,
    pub weapons: Vec<WeaponDef>,
    pub galaxy: Galaxy,
    /// Government pairs that start hostile.
    pub hostilities: Vec<(GovernmentId, GovernmentId)>,
    pub player: Option<PlayerStart>,
    pub ships: Vec<ScenarioShip>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        serde_json::from_str(json).map_err(|e| ConfigError::from(e).into())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let json = std::fs::read_to_string(path).map_err(ConfigError::from)?;
        Self::from_json(&json)
    }

    /// Validate and build a ready-to-run engine.
    pub fn build(self) -> Result<SimulationEngine, ScenarioError> {
        self.config.validate()?;
        let catalog = WeaponCatalog::from_defs(self.weapons)?;
        if let Some(err) = catalog.mount_errors().into_iter().next() {
            return Err(err.into());
        }

        let player = self.player.ok_or(ScenarioError::NoPlayer)?;
        let designs = std::iter::once((&player.ship, player.system))
            .chain(self.ships.iter().map(|s| (&s.ship, s.system)));
        for (ship, system) in designs {
            if self.galaxy.system(system).is_none() {
                return Err(ScenarioError::UnknownSystem {
                    ship: ship.name.clone(),
                    system,
                });
            }
            if let Some(loadout) = ship.weapons.iter().find(|l| catalog.find(&l.weapon).is_none()) {
                return Err(ConfigError::UnknownWeaponName(loadout.weapon.clone()).into());
            }
        }

        let mut engine = SimulationEngine::new(self.config, catalog, Box::new(self.galaxy));
        for (a, b) in self.hostilities {
            engine.diplomacy_mut().set_hostile(a, b, true);
        }
        engine.spawn_flagship(&player.ship, player.government, player.system, player.position);
        for ship in &self.ships {
            engine.spawn_ship(
                &ship.ship,
                Placement {
                    government: ship.government,
                    personality: ship.personality,
                    system: ship.system,
                    position: ship.position,
                    facing: ship.facing,
                },
            );
        }
        tracing::debug!(ships = self.ships.len() + 1, "scenario built");
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = r#"{
        "config": {"seed": 7},
        "weapons": [
            {"name": "Blaster", "mounts": {"gun": true}, "velocity": 10.0, "lifetime": 30,
             "reload": 5.0, "damage": {"hull": 4.0}}
        ],
        "galaxy": {"systems": [{"id": 1, "name": "Sol"}]},
        "hostilities": [[0, 1]],
        "player": {
            "ship": {"name": "Falcon", "radius": 20.0, "attributes": {"hull": 100.0},
                     "guns": [[0.0, 10.0]], "weapons": [{"weapon": "Blaster", "count": 1}]},
            "government": 0, "system": 1, "position": [0.0, 0.0]
        },
        "ships": [
            {"ship": {"name": "Raider", "radius": 15.0, "attributes": {"hull": 50.0}},
             "government": 1, "system": 1, "position": [300.0, 0.0]}
        ]
    }"#;

    #[test]
    fn test_build_basic_scenario() {
        let engine = Scenario::from_json(BASIC).unwrap().build().unwrap();
        assert!(engine.flagship().is_some());
        assert_eq!(engine.current_system(), SystemId(1));
        assert_eq!(engine.world().len(), 2);
        assert!(engine.diplomacy().is_hostile(GovernmentId(0), GovernmentId(1)));
        assert_eq!(engine.catalog().len(), 1);
    }

    #[test]
    fn test_missing_mount_type_rejected() {
        let json = BASIC.replace(r#""mounts": {"gun": true}, "#, "");
        let err = Scenario::from_json(&json).unwrap().build().err().unwrap();
        assert!(matches!(err, ScenarioError::Config(ConfigError::MissingMountType(_))));
    }

    #[test]
    fn test_unknown_system_rejected() {
        let json = BASIC.replace(r#""system": 1, "position": [300.0"#, r#""system": 9, "position": [300.0"#);
        let err = Scenario::from_json(&json).unwrap().build().err().unwrap();
        assert!(matches!(err, ScenarioError::UnknownSystem { system: SystemId(9), .. }));
    }

    #[test]
    fn test_unknown_weapon_rejected() {
        let json = BASIC.replace(r#"{"weapon": "Blaster""#, r#"{"weapon": "Cannon""#);
        let err = Scenario::from_json(&json).unwrap().build().err().unwrap();
        assert!(matches!(err, ScenarioError::Config(ConfigError::UnknownWeaponName(_))));
    }

    #[test]
    fn test_degenerate_config_rejected() {
        let json = BASIC
            .replace(r#""config": {"seed": 7}"#, r#""config": {"seed": 7, "asteroid_wrap": 0.0}"#)
            .replace(r#""name": "Sol"}"#, r#""name": "Sol", "belt": {"asteroids": 3}}"#);
        let err = Scenario::from_json(&json).unwrap().build().err().unwrap();
        assert!(matches!(
            err,
            ScenarioError::Config(ConfigError::InvalidSetting { ref setting, .. }) if setting == "asteroid_wrap"
        ));

        let json = BASIC.replace(r#""config": {"seed": 7}"#, r#""config": {"ship_grid_cells": 0}"#);
        let err = Scenario::from_json(&json).unwrap().build().err().unwrap();
        assert!(matches!(
            err,
            ScenarioError::Config(ConfigError::InvalidSetting { ref setting, .. }) if setting == "ship_grid_cells"
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Scenario::from_json("{not json"),
            Err(ScenarioError::Config(ConfigError::Json(_)))
        ));
    }
}
