//! Advance every non-ship record one step.

use hecs::World;

use skirmish_core::components::{Body, Presence};
use skirmish_core::types::SystemId;
use skirmish_core::weapon::WeaponCatalog;

use crate::scene::Scene;

/// Step asteroids, flotsam, projectiles, weather and visuals.
///
/// Projectiles created last tick make their first move here.
pub fn run(world: &World, catalog: &WeaponCatalog, scene: &mut Scene, system: SystemId, tick: u64) {
    scene.asteroids.step(tick);

    for flotsam in &mut scene.flotsam {
        flotsam.advance();
    }

    for projectile in &mut scene.projectiles {
        let Some(def) = catalog.get(projectile.weapon) else {
            projectile.dead = true;
            continue;
        };
        let target_position = projectile.target.and_then(|target| {
            let presence = world.get::<&Presence>(target).ok()?;
            if presence.system != system || !presence.targetable {
                return None;
            }
            world.get::<&Body>(target).ok().map(|body| body.position)
        });
        projectile.advance(def, target_position);
    }

    for weather in &mut scene.weather {
        weather.advance();
    }

    for visual in &mut scene.visuals {
        visual.advance();
    }
}
