//! Snapshot system: fills the outbound `Frame` from the world and scene.
//!
//! This system is read-only with respect to simulation state. It reuses
//! the frame's allocations.

use glam::DVec2;
use hecs::{Entity, World};

use skirmish_core::components::*;
use skirmish_core::enums::*;
use skirmish_core::state::*;
use skirmish_core::types::{wrapped_delta, SimTime, SystemId};

use crate::diplomacy::Diplomacy;
use crate::pilot::Pilot;
use crate::scene::{Outbox, Scene};
use crate::universe::StarSystem;
use crate::world_setup::ship_id;

/// Borrowed view of everything a frame is built from.
pub struct FrameSource<'a> {
    pub world: &'a World,
    pub scene: &'a Scene,
    pub system: Option<&'a StarSystem>,
    pub diplomacy: &'a Diplomacy,
    pub flagship: Option<Entity>,
    pub current_system: SystemId,
    pub time: SimTime,
    pub phase: GamePhase,
}

/// Clear `frame` and fill it with this tick's output, draining `outbox`.
pub fn build_frame(source: &FrameSource, outbox: &mut Outbox, frame: &mut Frame) {
    frame.clear();
    frame.time = source.time;
    frame.phase = source.phase;
    frame.events.append(&mut outbox.events);
    frame.cues.append(&mut outbox.cues);
    frame.flagship = build_flagship(source);

    let anchor = frame.flagship.position;
    build_ships(source, frame);
    build_scene(source.scene, anchor, frame);
    if let Some(system) = source.system {
        for planet in &system.planets {
            frame.draw.push(DrawItem {
                kind: DrawKind::Planet,
                position: planet.position,
                velocity: DVec2::ZERO,
                facing: 0.0,
                radius: planet.radius,
            });
            frame.radar.push(RadarBlip {
                position: planet.position,
                radius: planet.radius,
                relation: RadarRelation::Special,
            });
        }
    }
}

fn build_flagship(source: &FrameSource) -> FlagshipView {
    let fallback = FlagshipView {
        system: source.current_system,
        ..Default::default()
    };
    let Some(entity) = source.flagship else {
        return fallback;
    };
    let Ok(mut query) = source
        .world
        .query_one::<(&Body, &Vitals, &Presence, &Pilot)>(entity)
    else {
        return fallback;
    };
    let Some((body, vitals, presence, pilot)) = query.get() else {
        return fallback;
    };
    FlagshipView {
        id: Some(ship_id(entity)),
        system: presence.system,
        position: body.position,
        levels: vitals.levels,
        target: pilot
            .target
            .filter(|&t| source.world.contains(t))
            .map(ship_id),
        disabled: vitals.disabled,
    }
}

fn relation(source: &FrameSource, entity: Entity, government: Allegiance, vitals: &Vitals) -> RadarRelation {
    if Some(entity) == source.flagship {
        return RadarRelation::Player;
    }
    if vitals.disabled {
        return RadarRelation::Inactive;
    }
    let player = source.diplomacy.player;
    if government.government == player {
        RadarRelation::Friendly
    } else if source.diplomacy.is_hostile(player, government.government) {
        RadarRelation::Hostile
    } else {
        RadarRelation::Neutral
    }
}

fn build_ships(source: &FrameSource, frame: &mut Frame) {
    for (entity, (body, vitals, allegiance, presence)) in source
        .world
        .query::<(&Body, &Vitals, &Allegiance, &Presence)>()
        .iter()
    {
        if presence.system != source.current_system || presence.jump.is_some() || vitals.destroyed {
            continue;
        }
        frame.draw.push(DrawItem {
            kind: DrawKind::Ship,
            position: body.position,
            velocity: body.velocity,
            facing: body.facing,
            radius: body.radius,
        });
        if presence.targetable || Some(entity) == source.flagship {
            frame.radar.push(RadarBlip {
                position: body.position,
                radius: body.radius,
                relation: relation(source, entity, *allegiance, vitals),
            });
        }
    }
}

fn build_scene(scene: &Scene, anchor: DVec2, frame: &mut Frame) {
    let wrap = scene.asteroids.wrap();
    for asteroid in &scene.asteroids.asteroids {
        // Drawn at the copy nearest the flagship.
        let position = anchor + wrapped_delta(anchor, asteroid.position, wrap);
        frame.draw.push(DrawItem {
            kind: DrawKind::Asteroid,
            position,
            velocity: asteroid.velocity,
            facing: asteroid.facing,
            radius: asteroid.radius,
        });
    }
    for minable in scene.asteroids.minables.iter().filter(|m| !m.dead) {
        frame.draw.push(DrawItem {
            kind: DrawKind::Minable,
            position: minable.position,
            velocity: minable.velocity,
            facing: 0.0,
            radius: minable.radius,
        });
    }
    for projectile in scene.projectiles.iter().filter(|p| !p.dead) {
        frame.draw.push(DrawItem {
            kind: DrawKind::Projectile,
            position: projectile.position,
            velocity: projectile.velocity,
            facing: projectile.facing,
            radius: 1.0,
        });
    }
    // Pending records render this tick even though they have not moved yet.
    for flotsam in scene.flotsam.iter().chain(&scene.pending.flotsam) {
        if flotsam.is_dead() {
            continue;
        }
        frame.draw.push(DrawItem {
            kind: DrawKind::Flotsam,
            position: flotsam.position,
            velocity: flotsam.velocity,
            facing: flotsam.facing,
            radius: 5.0,
        });
    }
    for visual in scene.visuals.iter().chain(&scene.pending.visuals) {
        frame.draw.push(DrawItem {
            kind: DrawKind::Visual(visual.kind),
            position: visual.position,
            velocity: visual.velocity,
            facing: 0.0,
            radius: 0.0,
        });
    }
}
