//! Ship movement: per-tick upkeep, steering, hyperspace, and firing.
//!
//! The flagship moves first so that every other ship sees the system it
//! ends the step in. Each ship then runs, in order: armament aging,
//! regeneration and status, steering and thrust, drag, hyperspace
//! countdown, and (inside the flagship's system) weapon fire.

use std::f64::consts::TAU;

use glam::DVec2;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use skirmish_core::attributes::ShipAttributes;
use skirmish_core::components::*;
use skirmish_core::constants::*;
use skirmish_core::enums::{MountType, ShipEventKind};
use skirmish_core::events::{ShipEvent, SoundCue};
use skirmish_core::types::{angle_delta, angle_of, unit, GovernmentId, ShipId, SystemId};
use skirmish_core::weapon::WeaponCatalog;

use crate::armament::{AimCommand, Armament, FireOutcome};
use crate::pilot::Pilot;
use crate::projectile::Projectile;
use crate::scene::{Outbox, Pending};
use crate::ship;
use crate::universe::Universe;
use crate::world_setup::ship_id;

/// Read-only inputs shared by every ship's move.
pub struct MoveContext<'a> {
    pub catalog: &'a WeaponCatalog,
    pub universe: &'a dyn Universe,
    pub tick: u64,
}

/// Mutable outputs shared by every ship's move.
pub struct MoveOutput<'a> {
    pub rng: &'a mut ChaCha8Rng,
    pub pending: &'a mut Pending,
    pub outbox: &'a mut Outbox,
}

/// Move every ship. Returns the flagship's system after its move.
pub fn run(
    world: &mut World,
    flagship: Option<Entity>,
    fallback_system: SystemId,
    ctx: &MoveContext,
    out: &mut MoveOutput,
) -> SystemId {
    let mut order: Vec<Entity> = world
        .query::<(&Body, &Pilot)>()
        .iter()
        .map(|(entity, _)| entity)
        .filter(|&entity| Some(entity) != flagship)
        .collect();

    let mut flagship_system = fallback_system;
    if let Some(entity) = flagship {
        // The flagship's own firing is judged against the system it starts in.
        if let Ok(presence) = world.get::<&Presence>(entity) {
            flagship_system = presence.system;
        }
        move_ship(world, entity, flagship_system, None, ctx, out);
        if let Ok(presence) = world.get::<&Presence>(entity) {
            flagship_system = presence.system;
        }
    }

    let observer = flagship.map(ship_id);
    for entity in order.drain(..) {
        move_ship(world, entity, flagship_system, observer, ctx, out);
    }
    flagship_system
}

fn move_ship(
    world: &mut World,
    entity: Entity,
    flagship_system: SystemId,
    observer: Option<ShipId>,
    ctx: &MoveContext,
    out: &mut MoveOutput,
) {
    let Ok((body, vitals, attrs, armament, presence, allegiance, pilot)) = world
        .query_one_mut::<(
            &mut Body,
            &mut Vitals,
            &ShipAttributes,
            &mut Armament,
            &mut Presence,
            &Allegiance,
            &Pilot,
        )>(entity)
    else {
        return;
    };
    if vitals.destroyed {
        return;
    }
    let id = ship_id(entity);
    let command = pilot.command;
    let was_targetable = presence.targetable;

    armament.step();

    ship::regenerate(vitals, attrs);
    let change = ship::update_status(vitals, attrs);
    for (happened, kind) in [
        (change.disabled, ShipEventKind::Disable),
        (change.destroyed, ShipEventKind::Destroy),
    ] {
        if happened {
            out.outbox.events.push(ShipEvent {
                kind,
                actor: None,
                target: id,
                tick: ctx.tick,
            });
        }
    }
    if vitals.destroyed {
        return;
    }

    let slow = ship::slowness_divisor(&vitals.levels);
    let controllable = !vitals.disabled && presence.jump.is_none();
    vitals.cloaking = command.cloak && !vitals.disabled;

    if controllable {
        body.facing = (body.facing + command.turn.clamp(-1.0, 1.0) * attrs.turn / slow).rem_euclid(TAU);
        body.velocity += unit(body.facing) * command.thrust.clamp(-1.0, 1.0) * attrs.thrust / slow;
        if let Some(destination) = command.jump {
            start_jump(body, vitals, presence, destination, flagship_system, ctx, out);
        }
    }

    let mut arrived = None;
    if let Some(jump) = presence.jump.as_mut() {
        body.velocity += unit(body.facing) * HYPERSPACE_ACCELERATION;
        jump.remaining_ticks = jump.remaining_ticks.saturating_sub(1);
        if jump.remaining_ticks == 0 {
            arrived = Some(jump.destination);
        }
    } else {
        body.velocity *= 1.0 - attrs.drag.clamp(0.0, 1.0);
    }
    body.position += body.velocity;
    if let Some(destination) = arrived {
        arrive(body, presence, destination, ctx.universe, out.rng);
        tracing::debug!(ship = id.0, system = destination.0, "arrived from hyperspace");
    }

    presence.targetable = presence.jump.is_none() && vitals.cloak < CLOAK_UNTARGETABLE;
    if !was_targetable
        && presence.targetable
        && presence.system == flagship_system
        && observer.is_some_and(|o| o != id)
    {
        out.outbox.events.push(ShipEvent {
            kind: ShipEventKind::Encounter,
            actor: observer,
            target: id,
            tick: ctx.tick,
        });
    }

    let can_shoot = !vitals.disabled && presence.jump.is_none() && presence.system == flagship_system;
    if can_shoot {
        let shooter = Shooter {
            entity,
            government: allegiance.government,
            target: pilot.target,
        };
        aim_turrets(armament, body, command.aim);
        if command.fire {
            fire_weapons(shooter, body, vitals, attrs, armament, ctx, out);
        }
    }
}

fn start_jump(
    body: &Body,
    vitals: &mut Vitals,
    presence: &mut Presence,
    destination: SystemId,
    flagship_system: SystemId,
    ctx: &MoveContext,
    out: &mut MoveOutput,
) {
    let linked = ctx
        .universe
        .system(presence.system)
        .is_some_and(|s| s.links.contains(&destination));
    if !linked || vitals.levels.fuel < JUMP_FUEL {
        return;
    }
    vitals.levels.fuel -= JUMP_FUEL;
    presence.jump = Some(Jump {
        destination,
        remaining_ticks: HYPERSPACE_TICKS,
    });
    if presence.system == flagship_system {
        out.outbox.cues.push(SoundCue::HyperspaceEntry {
            position: body.position,
        });
    }
}

/// Drop out of hyperspace at the destination's edge, or its wormhole.
fn arrive(body: &mut Body, presence: &mut Presence, destination: SystemId, universe: &dyn Universe, rng: &mut ChaCha8Rng) {
    let wormhole = universe.system(destination).and_then(|s| s.wormhole);
    body.position = match wormhole {
        Some(point) => point,
        None => unit(rng.gen_range(0.0..TAU)) * HYPERSPACE_ARRIVAL_DISTANCE,
    };
    body.facing = angle_of(-body.position);
    body.velocity = unit(body.facing) * body.velocity.length().min(10.0);
    presence.system = destination;
    presence.jump = None;
}

fn aim_turrets(armament: &mut Armament, body: &Body, aim: Option<DVec2>) {
    let Some(point) = aim else {
        return;
    };
    let commands: Vec<AimCommand> = armament
        .hardpoints()
        .iter()
        .enumerate()
        .filter(|(_, h)| h.mount_type() == MountType::Turret && h.weapon().is_some())
        .map(|(index, _)| {
            let mount = armament.mount_position(index, body.position, body.facing);
            AimCommand {
                index,
                angle: angle_delta(body.facing, angle_of(point - mount)),
            }
        })
        .collect();
    armament.aim(&commands);
}

#[derive(Clone, Copy)]
struct Shooter {
    entity: Entity,
    government: GovernmentId,
    target: Option<Entity>,
}

/// Fire every ready primary mount the ship can pay for.
fn fire_weapons(
    shooter: Shooter,
    body: &Body,
    vitals: &mut Vitals,
    attrs: &ShipAttributes,
    armament: &mut Armament,
    ctx: &MoveContext,
    out: &mut MoveOutput,
) {
    let jam_chance = ship::jam_chance(&vitals.levels);
    for index in 0..armament.len() {
        let Some(hardpoint) = armament.get(index) else {
            continue;
        };
        let Some(weapon) = hardpoint.weapon() else {
            continue;
        };
        let Some(def) = ctx.catalog.get(weapon) else {
            continue;
        };
        if def.is_special() || !hardpoint.is_ready() || !ship::can_fire(vitals, attrs, def) {
            continue;
        }
        let angle = body.facing + hardpoint.kind.angle();
        let jammed = jam_chance > 0.0 && out.rng.gen_bool(jam_chance);
        match armament.fire(index, ctx.catalog, jammed) {
            FireOutcome::Refused => {}
            FireOutcome::Jammed => ship::pay(vitals, def),
            FireOutcome::Fired => {
                ship::pay(vitals, def);
                let origin = armament.mount_position(index, body.position, body.facing);
                out.pending.projectiles.push(Projectile::launch(
                    weapon,
                    def,
                    origin,
                    angle,
                    body.velocity,
                    Some(shooter.entity),
                    Some(shooter.government),
                    shooter.target,
                ));
                out.outbox.cues.push(SoundCue::WeaponFire { position: origin });
            }
        }
    }
}
