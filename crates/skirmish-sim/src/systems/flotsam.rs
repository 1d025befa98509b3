//! Flotsam collection and tractor pull.

use hecs::World;

use skirmish_core::components::{Cargo, Vitals};
use skirmish_core::constants::FLOTSAM_PICKUP_RANGE;

use crate::flotsam::Flotsam;
use crate::systems::collision::Indices;

/// Let ships in reach scoop up flotsam. Anything left uncollected moves
/// with the tractor pulls gathered this tick.
pub fn run(world: &mut World, indices: &mut Indices, flotsam: &mut [Flotsam]) {
    for item in flotsam.iter_mut() {
        if item.is_dead() {
            continue;
        }
        for ship in indices.ships.circle(item.position, FLOTSAM_PICKUP_RANGE) {
            if !item.collectable_by(ship) {
                continue;
            }
            let Ok((cargo, vitals)) = world.query_one_mut::<(&mut Cargo, &Vitals)>(ship) else {
                continue;
            };
            if vitals.disabled || vitals.destroyed {
                continue;
            }
            let taken = cargo.add(&item.commodity, item.count);
            item.count -= taken;
            if item.count == 0 {
                item.collected = true;
                break;
            }
        }
        if !item.collected {
            item.apply_pulls();
        }
    }
}
