//! Anti-missile and tractor-beam mounts.
//!
//! These fire independently of stream gating, in their own pass after the
//! ship index is rebuilt and before projectile collisions resolve.

use glam::DVec2;
use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use skirmish_core::components::{Allegiance, Body, Cargo, Presence, Vitals};
use skirmish_core::enums::VisualKind;
use skirmish_core::types::SystemId;
use skirmish_core::weapon::WeaponCatalog;

use crate::armament::Armament;
use crate::diplomacy::Diplomacy;
use crate::scene::Scene;
use crate::visual::Visual;

pub fn run(
    world: &mut World,
    catalog: &WeaponCatalog,
    scene: &mut Scene,
    diplomacy: &Diplomacy,
    system: SystemId,
    rng: &mut ChaCha8Rng,
) {
    let Scene {
        projectiles,
        flotsam,
        pending,
        ..
    } = scene;

    for (entity, (body, vitals, armament, allegiance, presence, cargo)) in world.query_mut::<(
        &Body,
        &Vitals,
        &mut Armament,
        &Allegiance,
        &Presence,
        &Cargo,
    )>() {
        if presence.system != system || presence.jump.is_some() || vitals.disabled || vitals.destroyed {
            continue;
        }
        for index in 0..armament.len() {
            let Some(def) = armament
                .get(index)
                .and_then(|h| h.weapon())
                .and_then(|id| catalog.get(id))
            else {
                continue;
            };
            let mount = armament.mount_position(index, body.position, body.facing);

            if def.anti_missile > 0.0 {
                // Nearest hostile missile in reach.
                let missile = projectiles
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| !p.dead && p.source != Some(entity))
                    .filter(|(_, p)| {
                        p.government
                            .map_or(true, |g| diplomacy.is_hostile(g, allegiance.government))
                    })
                    .filter_map(|(i, p)| {
                        let strength = catalog.get(p.weapon)?.missile_strength;
                        (strength > 0.0).then_some((i, strength, mount.distance_squared(p.position)))
                    })
                    .min_by(|a, b| a.2.total_cmp(&b.2));
                let Some((target, strength, _)) = missile else {
                    continue;
                };
                let position = projectiles[target].position;
                if armament.fire_anti_missile(index, catalog, mount, position) {
                    let roll = rng.gen_range(0.0..def.anti_missile);
                    if roll > rng.gen_range(0.0..strength) {
                        projectiles[target].dead = true;
                        pending
                            .visuals
                            .push(Visual::new(VisualKind::Explosion, position, DVec2::ZERO));
                    } else {
                        pending
                            .visuals
                            .push(Visual::new(VisualKind::Spark, position, DVec2::ZERO));
                    }
                }
            } else if def.tractor_beam > 0.0 {
                if cargo.free() == 0 {
                    continue;
                }
                let nearest = flotsam
                    .iter()
                    .enumerate()
                    .filter(|(_, f)| !f.is_dead() && f.collectable_by(entity))
                    .map(|(i, f)| (i, mount.distance_squared(f.position)))
                    .min_by(|a, b| a.1.total_cmp(&b.1));
                let Some((target, _)) = nearest else {
                    continue;
                };
                if let Some(pull) =
                    armament.fire_tractor_beam(index, catalog, mount, flotsam[target].position)
                {
                    flotsam[target].add_pull(pull, body.velocity);
                }
            }
        }
    }
}
