//! Fleet and weather spawning: repopulation on system entry and scheduled
//! arrivals while the flagship stays.

use std::f64::consts::TAU;

use glam::DVec2;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use skirmish_core::constants::HYPERSPACE_ARRIVAL_DISTANCE;
use skirmish_core::enums::ShipEventKind;
use skirmish_core::events::ShipEvent;
use skirmish_core::types::{angle_of, unit, ShipId, SystemId};
use skirmish_core::weapon::WeaponCatalog;

use crate::scene::{Outbox, Pending};
use crate::universe::{FleetSpec, HazardSpec, StarSystem};
use crate::weather::Weather;
use crate::world_setup::{self, ship_id, Placement};

/// When one fleet or hazard of the current system next appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleEntry {
    /// Index into the system's fleet or hazard list.
    pub index: usize,
    pub next_at_tick: u64,
}

/// Arrival schedule for the system the flagship is in.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    pub system: SystemId,
    pub fleets: Vec<ScheduleEntry>,
    pub hazards: Vec<ScheduleEntry>,
}

impl Schedule {
    /// Fresh schedule for a newly entered system.
    pub fn for_system(system: &StarSystem, rng: &mut ChaCha8Rng, tick: u64) -> Self {
        let fleets = system
            .fleets
            .iter()
            .enumerate()
            .filter(|(_, f)| f.period > 0)
            .map(|(index, f)| ScheduleEntry {
                index,
                next_at_tick: tick + next_interval(f.period, rng),
            })
            .collect();
        let hazards = system
            .hazards
            .iter()
            .enumerate()
            .filter(|(_, h)| h.period > 0)
            .map(|(index, h)| ScheduleEntry {
                index,
                next_at_tick: tick + next_interval(h.period, rng),
            })
            .collect();
        Self {
            system: system.id,
            fleets,
            hazards,
        }
    }
}

/// Ticks until the next occurrence of something with mean `period`.
fn next_interval(period: u32, rng: &mut ChaCha8Rng) -> u64 {
    let period = period.max(1) as f64;
    (period * rng.gen_range(0.5..1.5)).round().max(1.0) as u64
}

/// Spawn every ship of a fleet scattered around `center`.
pub fn spawn_fleet(
    world: &mut World,
    catalog: &WeaponCatalog,
    fleet: &FleetSpec,
    system: SystemId,
    center: DVec2,
    spread: f64,
    rng: &mut ChaCha8Rng,
) -> Vec<Entity> {
    fleet
        .ships
        .iter()
        .map(|spec| {
            let offset = unit(rng.gen_range(0.0..TAU)) * rng.gen_range(0.0..spread.max(1.0));
            let position = center + offset;
            let placement = Placement {
                government: fleet.government,
                personality: fleet.personality,
                system,
                position,
                facing: angle_of(-position),
            };
            world_setup::spawn_ship(world, catalog, spec, placement)
        })
        .collect()
}

/// A fleet arriving from hyperspace at the edge of the system.
fn spawn_arrival(
    world: &mut World,
    catalog: &WeaponCatalog,
    fleet: &FleetSpec,
    system: SystemId,
    rng: &mut ChaCha8Rng,
) -> Vec<Entity> {
    let center = unit(rng.gen_range(0.0..TAU)) * HYPERSPACE_ARRIVAL_DISTANCE;
    spawn_fleet(world, catalog, fleet, system, center, 200.0, rng)
}

/// One occurrence of a hazard, or `None` if its weapon is unknown.
pub fn spawn_hazard(hazard: &HazardSpec, catalog: &WeaponCatalog, rng: &mut ChaCha8Rng) -> Option<Weather> {
    let Some(weapon) = catalog.find(&hazard.weapon) else {
        tracing::warn!(weapon = %hazard.weapon, "hazard refers to an unknown weapon");
        return None;
    };
    let origin = if hazard.system_wide {
        DVec2::ZERO
    } else {
        unit(rng.gen_range(0.0..TAU)) * rng.gen_range(0.0..HYPERSPACE_ARRIVAL_DISTANCE * 0.5)
    };
    Some(Weather {
        hazard: weapon,
        origin,
        inner_radius: hazard.inner_radius,
        outer_radius: hazard.outer_radius,
        system_wide: hazard.system_wide,
        pulse: hazard.pulse,
        strength: if hazard.strength > 0.0 { hazard.strength } else { 1.0 },
        lifetime: hazard.duration.max(1),
        age: 0,
    })
}

/// Populate a newly entered system: every fleet once, and each hazard
/// with the chance that it would be active at a random moment.
pub fn populate(
    world: &mut World,
    catalog: &WeaponCatalog,
    system: &StarSystem,
    pending: &mut Pending,
    rng: &mut ChaCha8Rng,
) {
    for fleet in &system.fleets {
        let center = unit(rng.gen_range(0.0..TAU)) * rng.gen_range(0.0..HYPERSPACE_ARRIVAL_DISTANCE);
        spawn_fleet(world, catalog, fleet, system.id, center, 200.0, rng);
    }
    for hazard in &system.hazards {
        let active = hazard.period == 0
            || rng.gen_bool((hazard.duration as f64 / hazard.period as f64).clamp(0.0, 1.0));
        if active {
            pending.weather.extend(spawn_hazard(hazard, catalog, rng));
        }
    }
}

/// Spawn whatever is due this tick.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    catalog: &WeaponCatalog,
    system: &StarSystem,
    schedule: &mut Schedule,
    pending: &mut Pending,
    rng: &mut ChaCha8Rng,
    flagship: Option<ShipId>,
    outbox: &mut Outbox,
    tick: u64,
) {
    if schedule.system != system.id {
        return;
    }
    for entry in &mut schedule.fleets {
        if tick < entry.next_at_tick {
            continue;
        }
        let Some(fleet) = system.fleets.get(entry.index) else {
            continue;
        };
        for ship in spawn_arrival(world, catalog, fleet, system.id, rng) {
            outbox.events.push(ShipEvent {
                kind: ShipEventKind::Encounter,
                actor: flagship,
                target: ship_id(ship),
                tick,
            });
        }
        entry.next_at_tick = tick + next_interval(fleet.period, rng);
    }
    for entry in &mut schedule.hazards {
        if tick < entry.next_at_tick {
            continue;
        }
        let Some(hazard) = system.hazards.get(entry.index) else {
            continue;
        };
        pending.weather.extend(spawn_hazard(hazard, catalog, rng));
        entry.next_at_tick = tick + next_interval(hazard.period, rng);
    }
}
