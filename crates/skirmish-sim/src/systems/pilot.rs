//! Pilot system: gathers each AI ship's situation, runs the decision FSM,
//! and stores the resulting command on the ship's `Pilot`. The flagship
//! takes the player's input instead.

use glam::DVec2;
use hecs::{Entity, World};

use skirmish_ai::fsm::{self, Contact, PilotAction, PilotContext, PilotUpdate};
use skirmish_core::attributes::ShipAttributes;
use skirmish_core::commands::PilotCommand;
use skirmish_core::components::*;
use skirmish_core::enums::ShipEventKind;
use skirmish_core::events::ShipEvent;
use skirmish_core::types::{GovernmentId, SystemId};
use skirmish_core::weapon::WeaponCatalog;

use crate::armament::Armament;
use crate::diplomacy::Diplomacy;
use crate::pilot::Pilot;
use crate::scene::Outbox;
use crate::ship;
use crate::universe::Universe;
use crate::world_setup::{entity_of, ship_id};

/// What every pilot can see of one ship.
#[derive(Debug, Clone, Copy)]
struct Sighting {
    entity: Entity,
    position: DVec2,
    velocity: DVec2,
    government: GovernmentId,
    system: SystemId,
    disabled: bool,
    targetable: bool,
}

impl Sighting {
    fn contact(&self, hostile: bool) -> Contact {
        Contact {
            id: ship_id(self.entity),
            position: self.position,
            velocity: self.velocity,
            disabled: self.disabled,
            hostile,
        }
    }
}

/// Decide every ship's command for this tick.
pub fn run(
    world: &mut World,
    catalog: &WeaponCatalog,
    universe: &dyn Universe,
    diplomacy: &Diplomacy,
    player: &PilotCommand,
    outbox: &mut Outbox,
    tick: u64,
) {
    let sightings: Vec<Sighting> = world
        .query::<(&Body, &Vitals, &Allegiance, &Presence)>()
        .iter()
        .filter(|(_, (_, vitals, _, _))| !vitals.destroyed)
        .map(|(entity, (body, vitals, allegiance, presence))| Sighting {
            entity,
            position: body.position,
            velocity: body.velocity,
            government: allegiance.government,
            system: presence.system,
            disabled: vitals.disabled,
            targetable: presence.targetable && presence.jump.is_none(),
        })
        .collect();

    // Collect updates, then apply.
    let mut updates: Vec<(Entity, PilotUpdate)> = Vec::new();
    let mut flagship_update: Option<(Entity, PilotCommand)> = None;

    for (entity, (pilot, body, vitals, attrs, armament, allegiance, presence, flagship)) in world
        .query::<(
            &Pilot,
            &Body,
            &Vitals,
            &ShipAttributes,
            &Armament,
            &Allegiance,
            &Presence,
            Option<&Flagship>,
        )>()
        .iter()
    {
        if vitals.destroyed {
            continue;
        }
        if flagship.is_some() {
            let mut command = *player;
            command.aim = pilot
                .target
                .and_then(|t| sightings.iter().find(|s| s.entity == t))
                .map(|s| s.position);
            flagship_update = Some((entity, command));
            continue;
        }

        let mut enemy: Option<(f64, Contact)> = None;
        let mut disabled_contact: Option<(f64, Contact)> = None;
        for other in &sightings {
            if other.entity == entity || other.system != presence.system || !other.targetable {
                continue;
            }
            let distance = body.position.distance_squared(other.position);
            let hostile = diplomacy.is_hostile(allegiance.government, other.government);
            if other.disabled {
                let ally = other.government == allegiance.government;
                if (hostile || ally) && disabled_contact.map_or(true, |(d, _)| distance < d) {
                    disabled_contact = Some((distance, other.contact(hostile)));
                }
            } else if hostile && enemy.map_or(true, |(d, _)| distance < d) {
                enemy = Some((distance, other.contact(true)));
            }
        }

        let ctx = PilotContext {
            personality: pilot.personality,
            phase: pilot.phase,
            disabled: vitals.disabled,
            position: body.position,
            velocity: body.velocity,
            facing: body.facing,
            turn_rate: attrs.turn / ship::slowness_divisor(&vitals.levels),
            hull_fraction: if attrs.hull > 0.0 {
                vitals.levels.hull / attrs.hull
            } else {
                0.0
            },
            weapon_range: armament.max_range(catalog),
            enemy: enemy.map(|(_, c)| c),
            disabled_contact: disabled_contact.map(|(_, c)| c),
            exit: universe.exit_from(presence.system),
            jumping: presence.jump.is_some(),
            ticks_in_phase: pilot.ticks_in_phase,
        };
        updates.push((entity, fsm::evaluate(&ctx)));
    }

    if let Some((entity, command)) = flagship_update {
        if let Ok(pilot) = world.query_one_mut::<&mut Pilot>(entity) {
            pilot.command = command;
        }
    }

    let mut actions: Vec<(Entity, PilotAction)> = Vec::new();
    for (entity, update) in updates {
        let Ok((pilot, scan)) = world.query_one_mut::<(&mut Pilot, &mut ScanProgress)>(entity) else {
            continue;
        };
        if update.phase_changed {
            pilot.phase = update.new_phase;
            pilot.ticks_in_phase = 0;
        } else {
            pilot.ticks_in_phase = pilot.ticks_in_phase.saturating_add(1);
        }
        pilot.command = update.command;
        let target = update.target.and_then(entity_of);
        if target != pilot.target {
            pilot.target = target;
            *scan = ScanProgress::default();
        }
        if let Some(action) = update.action {
            actions.push((entity, action));
        }
    }

    for (actor, action) in actions {
        match action {
            PilotAction::Board(id) => {
                if let Some(target) = entity_of(id) {
                    board(world, actor, target, outbox, tick);
                }
            }
            PilotAction::Assist(id) => {
                if let Some(target) = entity_of(id) {
                    assist(world, actor, target, outbox, tick);
                }
            }
        }
    }
}

fn still_disabled(world: &World, target: Entity) -> bool {
    world
        .get::<&Vitals>(target)
        .map(|v| v.disabled && !v.destroyed)
        .unwrap_or(false)
}

/// Plunder as much of a disabled ship's cargo as the boarder can hold.
fn board(world: &mut World, actor: Entity, target: Entity, outbox: &mut Outbox, tick: u64) {
    if !still_disabled(world, target) {
        return;
    }
    let mut room = world.get::<&Cargo>(actor).map(|c| c.free()).unwrap_or(0);
    let mut taken: Vec<(String, u32)> = Vec::new();
    if let Ok(cargo) = world.query_one_mut::<&mut Cargo>(target) {
        for (commodity, count) in cargo.commodities.iter_mut() {
            let amount = (*count).min(room);
            if amount > 0 {
                *count -= amount;
                room -= amount;
                taken.push((commodity.clone(), amount));
            }
        }
        cargo.commodities.retain(|_, count| *count > 0);
    }
    if let Ok(cargo) = world.query_one_mut::<&mut Cargo>(actor) {
        for (commodity, amount) in &taken {
            cargo.add(commodity, *amount);
        }
    }
    outbox.events.push(ShipEvent {
        kind: ShipEventKind::Board,
        actor: Some(ship_id(actor)),
        target: ship_id(target),
        tick,
    });
}

/// Patch up a disabled friendly ship.
fn assist(world: &mut World, actor: Entity, target: Entity, outbox: &mut Outbox, tick: u64) {
    if !still_disabled(world, target) {
        return;
    }
    if let Ok((vitals, attrs)) = world.query_one_mut::<(&mut Vitals, &ShipAttributes)>(target) {
        ship::assist(vitals, attrs);
    }
    outbox.events.push(ShipEvent {
        kind: ShipEventKind::Assist,
        actor: Some(ship_id(actor)),
        target: ship_id(target),
        tick,
    });
}
