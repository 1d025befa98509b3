//! Entity spawn factories for ships.
//!
//! A ship entity carries the full component bundle: name, body, vitals,
//! attributes, allegiance, presence, cargo, scan progress, pilot and
//! armament. The flagship additionally carries the `Flagship` marker.

use glam::DVec2;
use hecs::{Entity, World};

use skirmish_core::components::*;
use skirmish_core::enums::Personality;
use skirmish_core::error::ConfigError;
use skirmish_core::types::{GovernmentId, ShipId, SystemId};
use skirmish_core::weapon::WeaponCatalog;

use crate::armament::{Armament, ArmamentError};
use crate::pilot::Pilot;
use crate::universe::ShipSpec;

/// Outbound identity of a ship entity.
pub fn ship_id(entity: Entity) -> ShipId {
    ShipId(entity.to_bits().get())
}

/// Inverse of [`ship_id`]. The entity may since have been despawned.
pub fn entity_of(id: ShipId) -> Option<Entity> {
    Entity::from_bits(id.0)
}

/// Where and for whom a ship is spawned.
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub government: GovernmentId,
    pub personality: Personality,
    pub system: SystemId,
    pub position: DVec2,
    pub facing: f64,
}

/// Build the armament a design calls for.
///
/// Weapons that fail to install are logged and left off; the hull still
/// flies.
pub fn build_armament(catalog: &WeaponCatalog, spec: &ShipSpec) -> Armament {
    let mut armament = Armament::new();
    for &offset in &spec.guns {
        armament.add_gun_port(offset);
    }
    for &offset in &spec.turrets {
        armament.add_turret(offset);
    }
    for loadout in &spec.weapons {
        if let Err(err) = install(&mut armament, catalog, &loadout.weapon, loadout.count) {
            tracing::warn!(ship = %spec.name, weapon = %loadout.weapon, "loadout skipped: {err}");
        }
    }
    armament
}

fn install(
    armament: &mut Armament,
    catalog: &WeaponCatalog,
    name: &str,
    count: i32,
) -> Result<i32, ArmamentError> {
    let id = catalog
        .find(name)
        .ok_or_else(|| ConfigError::UnknownWeaponName(name.to_string()))?;
    armament.add_weapon(catalog, id, count)
}

/// Spawn an AI-controlled ship.
pub fn spawn_ship(world: &mut World, catalog: &WeaponCatalog, spec: &ShipSpec, at: Placement) -> Entity {
    let mut cargo = Cargo {
        capacity: spec.attributes.cargo_space,
        ..Default::default()
    };
    for (commodity, &count) in &spec.cargo {
        cargo.add(commodity, count);
    }
    let body = Body {
        position: at.position,
        velocity: DVec2::ZERO,
        facing: at.facing,
        radius: spec.radius.max(1.0),
    };
    let vitals = Vitals {
        levels: spec.attributes.full_levels(),
        ammo: spec.ammo.clone(),
        ..Default::default()
    };
    let presence = Presence {
        system: at.system,
        targetable: true,
        jump: None,
    };

    world.spawn((
        ShipName(spec.name.clone()),
        body,
        vitals,
        spec.attributes.clone(),
        Allegiance {
            government: at.government,
        },
        presence,
        cargo,
        ScanProgress::default(),
        Pilot::new(at.personality),
        build_armament(catalog, spec),
    ))
}

/// Spawn the player's flagship.
pub fn spawn_flagship(world: &mut World, catalog: &WeaponCatalog, spec: &ShipSpec, at: Placement) -> Entity {
    let entity = spawn_ship(world, catalog, spec, at);
    // The entity was just spawned, so insertion cannot fail.
    let _ = world.insert_one(entity, Flagship);
    entity
}
