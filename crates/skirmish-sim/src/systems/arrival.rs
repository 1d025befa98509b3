//! System-entry bookkeeping for the flagship.

use std::collections::BTreeSet;

use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;

use skirmish_core::components::{Body, Presence};
use skirmish_core::events::SoundCue;
use skirmish_core::types::SystemId;
use skirmish_core::weapon::WeaponCatalog;

use crate::scene::{Outbox, Scene};
use crate::systems::spawner::{self, Schedule};
use crate::universe::{StarSystem, Universe};

/// Everything the arrival pass rewrites.
pub struct ArrivalState<'a> {
    pub scene: &'a mut Scene,
    pub schedule: &'a mut Schedule,
    pub defended: &'a mut BTreeSet<usize>,
    pub rng: &'a mut ChaCha8Rng,
    pub outbox: &'a mut Outbox,
}

/// The flagship just entered `system`.
pub fn run(
    world: &mut World,
    catalog: &WeaponCatalog,
    universe: &mut dyn Universe,
    flagship: Entity,
    system: SystemId,
    state: ArrivalState,
    tick: u64,
) {
    universe.step_economy();
    state.scene.clear();
    state.defended.clear();

    // Ships left behind in other systems are forgotten unless they are
    // already on their way here.
    let stale: Vec<Entity> = world
        .query::<&Presence>()
        .iter()
        .filter(|&(entity, presence)| {
            entity != flagship
                && presence.system != system
                && presence.jump.map_or(true, |j| j.destination != system)
        })
        .map(|(entity, _)| entity)
        .collect();
    for entity in stale {
        let _ = world.despawn(entity);
    }

    let Some(star) = universe.system(system) else {
        tracing::warn!(system = system.0, "flagship arrived in an unknown system");
        *state.schedule = Schedule::default();
        return;
    };

    if let Some(point) = star.wormhole {
        if let Ok(body) = world.query_one_mut::<&mut Body>(flagship) {
            body.position = point;
        }
    }

    prepare(world, catalog, star, state.scene, state.schedule, state.rng, tick);
    tracing::debug!(system = %star.name, day = universe.day(), "flagship arrived");
    state.outbox.cues.push(SoundCue::SystemArrival { system });
}

/// Lay out a system for the flagship: asteroid field, arrival schedule,
/// and the initial fleets and weather.
pub fn prepare(
    world: &mut World,
    catalog: &WeaponCatalog,
    star: &StarSystem,
    scene: &mut Scene,
    schedule: &mut Schedule,
    rng: &mut ChaCha8Rng,
    tick: u64,
) {
    scene.asteroids.regenerate(&star.belt, rng, tick);
    *schedule = Schedule::for_system(star, rng, tick);
    spawner::populate(world, catalog, star, &mut scene.pending, rng);
}
