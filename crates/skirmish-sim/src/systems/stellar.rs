//! Passive stellar-object actions: planets launch their defense fleet the
//! first time a hostile ship comes within range.

use std::collections::BTreeSet;

use hecs::World;
use rand_chacha::ChaCha8Rng;

use skirmish_core::components::{Allegiance, Body, Presence, Vitals};
use skirmish_core::constants::PLANET_DEFENSE_RANGE;
use skirmish_core::events::SoundCue;
use skirmish_core::weapon::WeaponCatalog;

use crate::diplomacy::Diplomacy;
use crate::scene::Outbox;
use crate::systems::spawner;
use crate::universe::StarSystem;

/// Launch defense fleets for threatened planets. `defended` holds the
/// indices of planets that already launched in this visit.
pub fn run(
    world: &mut World,
    catalog: &WeaponCatalog,
    system: &StarSystem,
    diplomacy: &Diplomacy,
    defended: &mut BTreeSet<usize>,
    rng: &mut ChaCha8Rng,
    outbox: &mut Outbox,
) {
    let range_sq = PLANET_DEFENSE_RANGE * PLANET_DEFENSE_RANGE;
    let mut threatened = Vec::new();
    for (index, planet) in system.planets.iter().enumerate() {
        if planet.defense.is_none() || defended.contains(&index) {
            continue;
        }
        let hostile_nearby = world
            .query::<(&Body, &Vitals, &Allegiance, &Presence)>()
            .iter()
            .any(|(_, (body, vitals, allegiance, presence))| {
                presence.system == system.id
                    && presence.jump.is_none()
                    && !vitals.disabled
                    && !vitals.destroyed
                    && diplomacy.is_hostile(planet.government, allegiance.government)
                    && body.position.distance_squared(planet.position) <= range_sq
            });
        if hostile_nearby {
            threatened.push(index);
        }
    }

    for index in threatened {
        let planet = &system.planets[index];
        let Some(fleet) = &planet.defense else {
            continue;
        };
        defended.insert(index);
        let ships = spawner::spawn_fleet(
            world,
            catalog,
            fleet,
            system.id,
            planet.position,
            planet.radius.max(50.0),
            rng,
        );
        tracing::debug!(planet = %planet.name, ships = ships.len(), "defense fleet launched");
        outbox.cues.push(SoundCue::DefenseLaunch {
            government: fleet.government,
        });
    }
}
