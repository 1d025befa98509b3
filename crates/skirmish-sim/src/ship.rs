//! Per-ship resource bookkeeping: regeneration, damage over time, firing
//! costs, and the disabled / destroyed thresholds.

use skirmish_core::attributes::ShipAttributes;
use skirmish_core::components::Vitals;
use skirmish_core::constants::*;
use skirmish_core::resources::{Channel, ResourceLevels};
use skirmish_core::weapon::{FiringCost, WeaponDef};

/// Status transitions produced by one update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusChange {
    pub disabled: bool,
    pub destroyed: bool,
}

/// Apply one tick of damage over time, resistance, regeneration and cloak.
pub fn regenerate(vitals: &mut Vitals, attrs: &ShipAttributes) {
    let levels = &mut vitals.levels;

    // Ongoing effects act before they decay.
    levels.hull -= levels.corrosion * CORROSION_HULL_RATE;
    levels.shields -= levels.discharge * DISCHARGE_SHIELD_RATE;
    levels.energy -= levels.ionization * IONIZATION_ENERGY_RATE;
    levels.heat += levels.burning * BURNING_HEAT_RATE;
    levels.fuel -= levels.leakage * LEAKAGE_FUEL_RATE;
    levels.floor_at_zero();

    resist(levels, attrs);

    if !vitals.disabled {
        levels.hull = (levels.hull + attrs.hull_repair).min(attrs.hull);
        let missing = (attrs.shields - levels.shields).max(0.0);
        let mut generated = attrs.shield_generation.min(missing);
        if attrs.shield_energy > 0.0 {
            generated = generated.min(levels.energy / attrs.shield_energy);
        }
        if generated > 0.0 {
            levels.shields += generated;
            levels.energy -= generated * attrs.shield_energy;
        }
    }
    levels.energy = (levels.energy + attrs.energy_generation).min(attrs.energy_capacity);
    levels.fuel = (levels.fuel + attrs.fuel_generation).min(attrs.fuel_capacity);

    levels.heat *= BASE_HEAT_RETENTION;
    levels.heat -= levels.heat * attrs.heat_dissipation.clamp(0.0, 1.0);
    levels.floor_at_zero();
    vitals.overheated = levels.heat > attrs.heat_capacity;

    if vitals.cloaking && attrs.cloak_rate > 0.0 && !vitals.disabled {
        vitals.cloak = (vitals.cloak + attrs.cloak_rate).min(1.0);
    } else {
        vitals.cloak = (vitals.cloak - attrs.cloak_rate.max(0.01)).max(0.0);
    }
}

/// Decay every DoT channel, spending energy on resistance when available.
fn resist(levels: &mut ResourceLevels, attrs: &ShipAttributes) {
    for channel in Channel::DOT {
        let level = levels.get(channel);
        if level <= 0.0 {
            continue;
        }
        let resisted = attrs.resistance.get(channel).max(0.0).min(level);
        let cost = resisted * attrs.resistance_energy;
        let after = if resisted > 0.0 && levels.energy >= cost {
            levels.energy -= cost;
            level - resisted
        } else {
            level
        };
        let decayed = (after * DOT_DECAY).max(0.0);
        levels.set(channel, if decayed < DOT_EPSILON { 0.0 } else { decayed });
    }
}

/// Thrust and turn are divided by this while slowed.
pub fn slowness_divisor(levels: &ResourceLevels) -> f64 {
    1.0 + levels.slowness.max(0.0) * SLOWNESS_FACTOR
}

/// Chance that a fire attempt jams.
pub fn jam_chance(levels: &ResourceLevels) -> f64 {
    (levels.scrambling.max(0.0) * SCRAMBLE_JAM_CHANCE).min(1.0)
}

/// Whether the ship can pay for one shot. Checked before any mutation.
pub fn can_fire(vitals: &Vitals, attrs: &ShipAttributes, weapon: &WeaponDef) -> bool {
    if vitals.disabled || vitals.destroyed || vitals.overheated {
        return false;
    }
    let cost = &weapon.cost;
    let levels = &vitals.levels;
    if levels.energy < cost.energy
        || levels.fuel < cost.fuel
        || levels.shields < cost.shields
        || levels.hull - cost.hull < attrs.minimum_hull()
    {
        return false;
    }
    cost.ammo == 0 || vitals.ammo.get(&weapon.name).copied().unwrap_or(0) >= cost.ammo
}

/// Deduct the cost of one shot. Call only after `can_fire`.
pub fn pay(vitals: &mut Vitals, weapon: &WeaponDef) {
    let FiringCost {
        energy,
        heat,
        fuel,
        hull,
        shields,
        ammo,
    } = weapon.cost;
    let levels = &mut vitals.levels;
    levels.energy -= energy;
    levels.heat += heat;
    levels.fuel -= fuel;
    levels.hull -= hull;
    levels.shields -= shields;
    if ammo > 0 {
        if let Some(count) = vitals.ammo.get_mut(&weapon.name) {
            *count = count.saturating_sub(ammo);
        }
    }
}

/// Re-derive the disabled and destroyed flags, reporting new transitions.
pub fn update_status(vitals: &mut Vitals, attrs: &ShipAttributes) -> StatusChange {
    let mut change = StatusChange::default();
    if vitals.destroyed {
        return change;
    }
    if vitals.levels.hull < 0.0 {
        vitals.destroyed = true;
        change.destroyed = true;
    }
    let disabled = vitals.levels.hull < attrs.minimum_hull();
    if disabled && !vitals.disabled {
        change.disabled = true;
        vitals.cloaking = false;
    }
    vitals.disabled = disabled;
    change
}

/// Patch a disabled ship up to just above its disabled threshold.
pub fn assist(vitals: &mut Vitals, attrs: &ShipAttributes) {
    let minimum = attrs.minimum_hull();
    if vitals.levels.hull < minimum {
        vitals.levels.hull = (minimum + attrs.hull * 0.05).min(attrs.hull);
    }
    vitals.levels.fuel = vitals.levels.fuel.max(attrs.fuel_capacity.min(100.0));
    vitals.disabled = false;
}
