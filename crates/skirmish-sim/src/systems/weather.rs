//! Weather damage: each pulsing hazard hits every ship in its ring, or in
//! the whole system.

use hecs::{Entity, World};

use skirmish_core::weapon::WeaponCatalog;

use crate::damage::DamageProfile;
use crate::diplomacy::Diplomacy;
use crate::scene::Outbox;
use crate::systems::collision::{self, Attacker, Indices};
use crate::weather::Weather;

pub fn run(
    world: &mut World,
    catalog: &WeaponCatalog,
    indices: &mut Indices,
    weather: &[Weather],
    diplomacy: &mut Diplomacy,
    outbox: &mut Outbox,
    tick: u64,
) {
    for hazard in weather.iter().filter(|w| w.pulses()) {
        let Some(def) = catalog.get(hazard.hazard) else {
            continue;
        };
        let profile = DamageProfile::hazard(def, hazard.origin, hazard.strength);
        let targets: Vec<Entity> = if hazard.system_wide {
            indices.ships.all().collect()
        } else {
            indices
                .ships
                .ring(hazard.origin, hazard.inner_radius, hazard.outer_radius)
        };
        for ship in targets {
            collision::damage_ship(
                world,
                ship,
                &profile,
                Attacker::default(),
                diplomacy,
                outbox,
                tick,
            );
        }
    }
}
