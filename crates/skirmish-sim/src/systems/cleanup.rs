//! Cleanup system: destroyed ships explode and are despawned, expired
//! records are dropped.

use std::f64::consts::TAU;

use glam::DVec2;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use skirmish_core::attributes::ShipAttributes;
use skirmish_core::components::{Body, Cargo, Presence, Vitals};
use skirmish_core::constants::SHIP_EXPLOSION_COUNT;
use skirmish_core::enums::{ShipEventKind, VisualKind};
use skirmish_core::events::{ShipEvent, SoundCue};
use skirmish_core::types::{unit, SystemId};

use crate::flotsam::Flotsam;
use crate::scene::{Outbox, Scene};
use crate::ship;
use crate::visual::Visual;
use crate::world_setup::ship_id;

/// Remove destroyed ships and dead records.
/// Uses a pre-allocated buffer to avoid per-tick allocation.
pub fn run(
    world: &mut World,
    scene: &mut Scene,
    system: SystemId,
    rng: &mut ChaCha8Rng,
    despawn_buffer: &mut Vec<Entity>,
    outbox: &mut Outbox,
    tick: u64,
) {
    despawn_buffer.clear();

    // Catch hull loss that happened outside a hit.
    for (entity, (vitals, attrs)) in world.query_mut::<(&mut Vitals, &ShipAttributes)>() {
        if ship::update_status(vitals, attrs).destroyed {
            outbox.events.push(ShipEvent {
                kind: ShipEventKind::Destroy,
                actor: None,
                target: ship_id(entity),
                tick,
            });
        }
        if vitals.destroyed {
            despawn_buffer.push(entity);
        }
    }

    for &entity in despawn_buffer.iter() {
        let Ok((body, presence, cargo)) = world.query_one_mut::<(&Body, &Presence, &Cargo)>(entity) else {
            continue;
        };
        if presence.system != system || presence.jump.is_some() {
            continue;
        }
        tracing::debug!(ship = ship_id(entity).0, "destroyed");
        explode(body, cargo, scene, rng);
        outbox.cues.push(SoundCue::Explosion {
            position: body.position,
        });
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }

    scene.prune();
}

/// Explosion visuals plus the ship's cargo spilled as flotsam.
fn explode(body: &Body, cargo: &Cargo, scene: &mut Scene, rng: &mut ChaCha8Rng) {
    for _ in 0..SHIP_EXPLOSION_COUNT {
        let offset = unit(rng.gen_range(0.0..TAU)) * rng.gen_range(0.0..body.radius.max(1.0));
        let drift = unit(rng.gen_range(0.0..TAU)) * rng.gen_range(0.0..1.0);
        scene.pending.visuals.push(Visual::new(
            VisualKind::Explosion,
            body.position + offset,
            body.velocity + drift,
        ));
    }
    scene
        .pending
        .visuals
        .push(Visual::new(VisualKind::Debris, body.position, body.velocity));

    for (commodity, &count) in &cargo.commodities {
        if count == 0 {
            continue;
        }
        let scatter = unit(rng.gen_range(0.0..TAU)) * rng.gen_range(0.5..2.0);
        scene.pending.flotsam.push(Flotsam::new(
            commodity,
            count,
            body.position,
            body.velocity + scatter,
            None,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_explosion_spills_cargo() {
        let mut scene = Scene::new(4096.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let body = Body::new(DVec2::new(10.0, 10.0), 20.0);
        let mut cargo = Cargo {
            capacity: 50,
            ..Default::default()
        };
        cargo.add("Food", 5);
        cargo.add("Metal", 3);
        explode(&body, &cargo, &mut scene, &mut rng);
        assert_eq!(scene.pending.flotsam.len(), 2);
        assert_eq!(scene.pending.visuals.len(), SHIP_EXPLOSION_COUNT + 1);
        let total: u32 = scene.pending.flotsam.iter().map(|f| f.count).sum();
        assert_eq!(total, 8);
    }
}
