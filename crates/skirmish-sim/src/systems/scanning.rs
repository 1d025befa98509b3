//! Cargo and outfit scanners.
//!
//! Runs after all movement so range checks use final positions.

use std::collections::HashMap;

use glam::DVec2;
use hecs::{Entity, World};

use skirmish_core::attributes::ShipAttributes;
use skirmish_core::components::{Body, Presence, ScanProgress, Vitals};
use skirmish_core::constants::{CLOAK_UNTARGETABLE, SCAN_COMPLETE};
use skirmish_core::enums::{ScanKind, ShipEventKind};
use skirmish_core::events::ShipEvent;
use skirmish_core::types::SystemId;

use crate::pilot::Pilot;
use crate::scene::Outbox;
use crate::world_setup::ship_id;

pub fn run(world: &mut World, system: SystemId, outbox: &mut Outbox, tick: u64) {
    let positions: HashMap<Entity, DVec2> = world
        .query::<(&Body, &Presence, &Vitals)>()
        .iter()
        .filter(|(_, (_, presence, vitals))| {
            presence.system == system && presence.jump.is_none() && vitals.cloak < CLOAK_UNTARGETABLE
        })
        .map(|(entity, (body, _, _))| (entity, body.position))
        .collect();

    for (entity, (pilot, body, attrs, vitals, progress)) in world.query_mut::<(
        &Pilot,
        &Body,
        &ShipAttributes,
        &Vitals,
        &mut ScanProgress,
    )>() {
        if vitals.disabled || !positions.contains_key(&entity) {
            continue;
        }
        let Some(target) = pilot.target else {
            continue;
        };
        let Some(&target_position) = positions.get(&target) else {
            continue;
        };
        let distance = body.position.distance(target_position);

        let scans = [
            (
                ScanKind::Cargo,
                attrs.cargo_scan_range,
                attrs.cargo_scan_speed,
                &mut progress.cargo,
                &mut progress.cargo_done,
            ),
            (
                ScanKind::Outfits,
                attrs.outfit_scan_range,
                attrs.outfit_scan_speed,
                &mut progress.outfits,
                &mut progress.outfits_done,
            ),
        ];
        for (kind, range, speed, level, done) in scans {
            if *done || range <= 0.0 || speed <= 0.0 || distance > range {
                continue;
            }
            *level += speed;
            if *level >= SCAN_COMPLETE {
                *done = true;
                outbox.events.push(ShipEvent {
                    kind: ShipEventKind::Scan(kind),
                    actor: Some(ship_id(entity)),
                    target: ship_id(target),
                    tick,
                });
            }
        }
    }
}
