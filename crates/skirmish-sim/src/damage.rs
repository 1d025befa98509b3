//! Damage resolution.
//!
//! A `DamageProfile` captures one weapon hit (or hazard pulse) and turns a
//! target's protections and current levels into a per-channel delta plus an
//! impulse. Calculation is pure; `DamageDealt::apply` is the only mutation.

use glam::DVec2;
use skirmish_core::attributes::ShipAttributes;
use skirmish_core::constants::{BLAST_TRIGGER_FACTOR, DISRUPTION_BLEED_FACTOR};
use skirmish_core::resources::{Channel, ResourceLevels};
use skirmish_core::weapon::WeaponDef;

/// Fraction of each channel blocked `(while shielded, while unshielded)`.
///
/// Shields themselves are handled separately through the bleed fraction.
fn blocking(channel: Channel) -> (f64, f64) {
    match channel {
        Channel::Hull => (1.0, 0.0),
        Channel::Shields => (0.0, 0.0),
        Channel::Energy | Channel::Heat | Channel::Fuel => (0.5, 0.0),
        Channel::Corrosion | Channel::Leakage => (1.0, 0.0),
        Channel::Burning | Channel::Ionization | Channel::Scrambling | Channel::Slowness => (0.5, 0.0),
        Channel::Discharge | Channel::Disruption => (0.0, 0.5),
    }
}

/// What the damage model needs to know about the body being hit.
pub struct DamageTarget<'a> {
    pub levels: &'a ResourceLevels,
    pub attributes: &'a ShipAttributes,
    pub position: DVec2,
    pub radius: f64,
    pub cloak: f64,
    pub disabled: bool,
}

/// Result of one damage calculation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DamageDealt {
    /// Amount taken from hull, shields, energy and fuel, added to heat and
    /// every DoT channel.
    pub levels: ResourceLevels,
    pub impulse: DVec2,
    /// Share of shield-blockable damage that shields absorbed.
    pub shield_fraction: f64,
}

impl DamageDealt {
    pub fn is_empty(&self) -> bool {
        self.levels.is_zero() && self.impulse == DVec2::ZERO
    }

    /// Mutate a target's levels and velocity.
    pub fn apply(&self, levels: &mut ResourceLevels, velocity: &mut DVec2, mass: f64) {
        let d = &self.levels;
        levels.hull -= d.hull;
        levels.shields -= d.shields;
        levels.energy -= d.energy;
        levels.fuel -= d.fuel;
        levels.heat += d.heat;
        for channel in Channel::DOT {
            *levels.get_mut(channel) += d.get(channel);
        }
        levels.floor_at_zero();
        if self.impulse != DVec2::ZERO {
            *velocity += self.impulse / mass.max(1.0);
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Blast {
    k: f64,
    rq: f64,
}

/// One weapon impact (or hazard pulse) ready to be resolved against targets.
#[derive(Debug, Clone, Copy)]
pub struct DamageProfile<'w> {
    weapon: &'w WeaponDef,
    origin: DVec2,
    scaling: f64,
    blast: Option<Blast>,
    per_target_dropoff: bool,
}

impl<'w> DamageProfile<'w> {
    /// A profile with a fixed scaling factor.
    pub fn new(weapon: &'w WeaponDef, origin: DVec2, scaling: f64) -> Self {
        let blast = (weapon.blast_radius > 0.0).then(|| {
            let ratio = weapon.trigger_radius / weapon.blast_radius.max(1.0);
            let k = if ratio == 0.0 {
                1.0
            } else {
                1.0 + BLAST_TRIGGER_FACTOR * ratio * ratio
            };
            Blast {
                k,
                rq: 1.0 / (weapon.blast_radius * weapon.blast_radius),
            }
        });
        Self {
            weapon,
            origin,
            scaling,
            blast,
            per_target_dropoff: false,
        }
    }

    /// A projectile impact; dropoff is evaluated once at the distance flown.
    pub fn projectile(weapon: &'w WeaponDef, origin: DVec2, distance_traveled: f64) -> Self {
        let dropoff = weapon
            .dropoff
            .map_or(1.0, |curve| curve.evaluate(distance_traveled));
        Self::new(weapon, origin, dropoff)
    }

    /// A hazard pulse; dropoff is evaluated per target from `origin`.
    pub fn hazard(weapon: &'w WeaponDef, origin: DVec2, scaling: f64) -> Self {
        let mut profile = Self::new(weapon, origin, scaling);
        profile.per_target_dropoff = weapon.dropoff.is_some();
        profile
    }

    pub fn weapon(&self) -> &'w WeaponDef {
        self.weapon
    }

    pub fn origin(&self) -> DVec2 {
        self.origin
    }

    pub fn is_blast(&self) -> bool {
        self.blast.is_some()
    }

    /// Overall damage multiplier for a body at `position` with mask `radius`.
    pub fn scale_for(&self, position: DVec2, radius: f64) -> f64 {
        let mut scale = self.scaling;
        let distance = position.distance(self.origin);
        if let Some(blast) = self.blast {
            let d = (distance - radius).max(0.0);
            let r = d * d * blast.rq;
            scale *= blast.k / ((1.0 + r * r) * (1.0 + r * r));
        }
        if self.per_target_dropoff {
            if let Some(curve) = self.weapon.dropoff {
                scale *= curve.evaluate(distance);
            }
        }
        scale
    }

    /// Hull damage against a body without shields or protections.
    pub fn hull_damage_at(&self, position: DVec2, radius: f64) -> f64 {
        (self.weapon.damage.hull * self.scale_for(position, radius)).max(0.0)
    }

    /// Fraction of shield-blockable damage the target's shields absorb.
    fn bleed_fraction(&self, target: &DamageTarget) -> f64 {
        if target.levels.shields <= 0.0 {
            return 0.0;
        }
        let attrs = target.attributes;
        let piercing = (self.weapon.piercing / (1.0 + attrs.piercing_protection)
            - attrs.piercing_resistance)
            .clamp(0.0, 1.0);
        let shield_level = if attrs.shields > 0.0 {
            (target.levels.shields / attrs.shields).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let permeability = attrs.low_shield_permeability
            + (attrs.high_shield_permeability - attrs.low_shield_permeability) * shield_level
            + attrs.cloaked_shield_permeability * target.cloak;
        let fraction = (1.0 - (piercing + permeability).min(1.0))
            / (1.0 + target.levels.disruption * DISRUPTION_BLEED_FACTOR);
        fraction.max(0.0)
    }

    fn raw(&self, channel: Channel, attrs: &ShipAttributes) -> f64 {
        let flat = self.weapon.damage.get(channel);
        if channel.is_dot() {
            return flat;
        }
        flat + self.weapon.relative_damage.get(channel) * attrs.capacity(channel)
    }

    /// Resolve this hit against one target.
    pub fn calculate(&self, target: &DamageTarget) -> DamageDealt {
        let scale = self.scale_for(target.position, target.radius);
        if scale <= 0.0 || !scale.is_finite() {
            return DamageDealt::default();
        }
        let attrs = target.attributes;
        let protection = |c: Channel| 1.0 + attrs.protection.get(c).max(0.0);

        let mut dealt = DamageDealt::default();

        let mut fraction = self.bleed_fraction(target);
        let shield_damage = self.raw(Channel::Shields, attrs) * scale / protection(Channel::Shields);
        let mut shields = shield_damage * fraction;
        if shield_damage > 0.0 && shields > target.levels.shields {
            fraction = target.levels.shields / shield_damage;
            shields = target.levels.shields;
        }
        dealt.levels.shields = shields.max(0.0);
        dealt.shield_fraction = fraction;

        for channel in Channel::ALL {
            if channel == Channel::Shields {
                continue;
            }
            let raw = self.raw(channel, attrs);
            if raw == 0.0 {
                continue;
            }
            let (shielded, unshielded) = blocking(channel);
            let passed = 1.0 - shielded * fraction - unshielded * (1.0 - fraction);
            dealt
                .levels
                .set(channel, raw * scale * passed / protection(channel));
        }

        let hull = dealt.levels.hull;
        if hull > 0.0 || self.weapon.disabled_damage.is_some() {
            let (shielded, unshielded) = blocking(Channel::Hull);
            let passed = 1.0 - shielded * fraction - unshielded * (1.0 - fraction);
            let disabled_raw = self.weapon.disabled_damage.unwrap_or(self.weapon.damage.hull)
                + self.weapon.relative_damage.hull * attrs.hull;
            let disabled = disabled_raw * scale * passed / protection(Channel::Hull);
            let minimum = attrs.minimum_hull();
            dealt.levels.hull = if target.disabled || target.levels.hull < minimum {
                disabled
            } else {
                let remaining = target.levels.hull - minimum;
                if hull > remaining && hull > 0.0 {
                    remaining + (1.0 - remaining / hull) * disabled
                } else {
                    hull
                }
            };
        }

        if self.weapon.hit_force != 0.0 {
            let offset = target.position - self.origin;
            let distance = offset.length();
            if distance > 0.0 {
                let magnitude = self.weapon.hit_force * scale / (1.0 + attrs.force_protection.max(0.0));
                dealt.impulse = offset / distance * magnitude;
            }
        }

        dealt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use skirmish_core::weapon::DropoffCurve;

    fn weapon(hull: f64, shields: f64) -> WeaponDef {
        WeaponDef {
            name: "Test".into(),
            damage: ResourceLevels {
                hull,
                shields,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn attrs(hull: f64, shields: f64) -> ShipAttributes {
        ShipAttributes {
            hull,
            shields,
            ..Default::default()
        }
    }

    fn resolve(w: &WeaponDef, a: &ShipAttributes, levels: &ResourceLevels) -> DamageDealt {
        let profile = DamageProfile::new(w, DVec2::ZERO, 1.0);
        profile.calculate(&DamageTarget {
            levels,
            attributes: a,
            position: DVec2::new(0.0, 10.0),
            radius: 5.0,
            cloak: 0.0,
            disabled: false,
        })
    }

    #[test]
    fn test_unshielded_hull_hit() {
        let w = weapon(10.0, 0.0);
        let a = attrs(50.0, 0.0);
        let mut levels = ResourceLevels {
            hull: 50.0,
            ..Default::default()
        };
        let dealt = resolve(&w, &a, &levels);
        assert_eq!(dealt.levels.hull, 10.0);
        let mut velocity = DVec2::ZERO;
        dealt.apply(&mut levels, &mut velocity, a.mass);
        assert_eq!(levels.hull, 40.0);
        assert_eq!(velocity, DVec2::ZERO);
    }

    #[test]
    fn test_full_shields_block_hull() {
        let w = weapon(10.0, 10.0);
        let a = attrs(100.0, 100.0);
        let levels = a.full_levels();
        let dealt = resolve(&w, &a, &levels);
        assert_eq!(dealt.shield_fraction, 1.0);
        assert_eq!(dealt.levels.shields, 10.0);
        assert_eq!(dealt.levels.hull, 0.0);
    }

    #[test]
    fn test_shield_clamp_bleeds_into_hull() {
        let w = weapon(20.0, 20.0);
        let a = attrs(100.0, 100.0);
        let mut levels = a.full_levels();
        levels.shields = 5.0;
        let dealt = resolve(&w, &a, &levels);
        assert_eq!(dealt.levels.shields, 5.0);
        assert!((dealt.shield_fraction - 0.25).abs() < 1e-12);
        // Three quarters of the hull damage gets through.
        assert!((dealt.levels.hull - 15.0).abs() < 1e-12);

        let mut velocity = DVec2::ZERO;
        dealt.apply(&mut levels, &mut velocity, a.mass);
        assert_eq!(levels.shields, 0.0);
    }

    #[test]
    fn test_piercing_and_permeability_reduce_fraction() {
        let mut w = weapon(10.0, 10.0);
        w.piercing = 0.3;
        let mut a = attrs(100.0, 100.0);
        a.low_shield_permeability = 0.2;
        a.high_shield_permeability = 0.2;
        let levels = a.full_levels();
        let dealt = resolve(&w, &a, &levels);
        assert!((dealt.shield_fraction - 0.5).abs() < 1e-12);
        assert!((dealt.levels.hull - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_disruption_raises_bleed() {
        let w = weapon(10.0, 10.0);
        let a = attrs(100.0, 100.0);
        let mut levels = a.full_levels();
        levels.disruption = 100.0;
        let dealt = resolve(&w, &a, &levels);
        assert!((dealt.shield_fraction - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_policy_table_while_unshielded() {
        let w = WeaponDef {
            damage: ResourceLevels {
                energy: 10.0,
                corrosion: 4.0,
                discharge: 8.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let a = attrs(100.0, 0.0);
        let levels = a.full_levels();
        let dealt = resolve(&w, &a, &levels);
        assert_eq!(dealt.levels.energy, 10.0);
        assert_eq!(dealt.levels.corrosion, 4.0);
        // Discharge is halved when there are no shields to hit.
        assert_eq!(dealt.levels.discharge, 4.0);
    }

    #[test]
    fn test_policy_table_while_shielded() {
        let w = WeaponDef {
            damage: ResourceLevels {
                energy: 10.0,
                corrosion: 4.0,
                discharge: 8.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let a = attrs(100.0, 100.0);
        let levels = a.full_levels();
        let dealt = resolve(&w, &a, &levels);
        assert_eq!(dealt.levels.energy, 5.0);
        assert_eq!(dealt.levels.corrosion, 0.0);
        assert_eq!(dealt.levels.discharge, 8.0);
    }

    #[test]
    fn test_protection_divides() {
        let w = weapon(10.0, 0.0);
        let mut a = attrs(100.0, 0.0);
        a.protection.hull = 1.0;
        let dealt = resolve(&w, &a, &a.full_levels());
        assert_eq!(dealt.levels.hull, 5.0);
    }

    #[test]
    fn test_two_piece_hull_rule() {
        let mut w = weapon(20.0, 0.0);
        w.disabled_damage = Some(10.0);
        let mut a = attrs(100.0, 0.0);
        a.disabled_threshold = 0.5;
        let mut levels = a.full_levels();
        levels.hull = 60.0;
        // 10 points of hull above the threshold: half the hit is spent there,
        // the other half is rescaled to disabled damage.
        let dealt = resolve(&w, &a, &levels);
        assert!((dealt.levels.hull - 15.0).abs() < 1e-12);

        levels.hull = 40.0;
        let dealt = resolve(&w, &a, &levels);
        assert_eq!(dealt.levels.hull, 10.0);
    }

    #[test]
    fn test_relative_damage_uses_capacity() {
        let w = WeaponDef {
            relative_damage: ResourceLevels {
                hull: 0.1,
                ..Default::default()
            },
            ..Default::default()
        };
        let a = attrs(300.0, 0.0);
        let dealt = resolve(&w, &a, &a.full_levels());
        assert!((dealt.levels.hull - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_hit_force_impulse() {
        let mut w = weapon(0.0, 0.0);
        w.hit_force = 100.0;
        let mut a = attrs(100.0, 0.0);
        a.force_protection = 1.0;
        a.mass = 10.0;
        let mut levels = a.full_levels();
        let dealt = resolve(&w, &a, &levels);
        assert_eq!(dealt.impulse, DVec2::new(0.0, 50.0));
        let mut velocity = DVec2::ZERO;
        dealt.apply(&mut levels, &mut velocity, a.mass);
        assert_eq!(velocity, DVec2::new(0.0, 5.0));
    }

    #[test]
    fn test_hit_force_zero_distance() {
        let mut w = weapon(0.0, 0.0);
        w.hit_force = 100.0;
        let a = attrs(100.0, 0.0);
        let levels = a.full_levels();
        let profile = DamageProfile::new(&w, DVec2::ZERO, 1.0);
        let dealt = profile.calculate(&DamageTarget {
            levels: &levels,
            attributes: &a,
            position: DVec2::ZERO,
            radius: 5.0,
            cloak: 0.0,
            disabled: false,
        });
        assert_eq!(dealt.impulse, DVec2::ZERO);
        assert!(dealt.impulse.is_finite());
    }

    #[test]
    fn test_trigger_radius_boosts_blast_center() {
        let mut w = weapon(10.0, 0.0);
        w.blast_radius = 100.0;
        w.trigger_radius = 50.0;
        let profile = DamageProfile::new(&w, DVec2::ZERO, 1.0);
        assert!((profile.scale_for(DVec2::ZERO, 0.0) - 1.0625).abs() < 1e-12);
    }

    #[test]
    fn test_projectile_dropoff_at_distance_flown() {
        let mut w = weapon(10.0, 0.0);
        w.dropoff = Some(DropoffCurve {
            start: 0.0,
            end: 100.0,
            floor: 0.2,
        });
        let profile = DamageProfile::projectile(&w, DVec2::ZERO, 50.0);
        assert!((profile.scale_for(DVec2::new(0.0, 1.0), 0.0) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_hazard_dropoff_per_target() {
        let mut w = weapon(10.0, 0.0);
        w.dropoff = Some(DropoffCurve {
            start: 0.0,
            end: 100.0,
            floor: 0.0,
        });
        let profile = DamageProfile::hazard(&w, DVec2::ZERO, 1.0);
        assert_eq!(profile.scale_for(DVec2::new(0.0, 25.0), 5.0), 0.75);
        assert_eq!(profile.scale_for(DVec2::new(0.0, 200.0), 5.0), 0.0);
    }

    proptest! {
        #[test]
        fn blast_falloff_is_one_at_center_and_non_increasing(
            blast_radius in 1.0f64..500.0,
            mask in 0.0f64..50.0,
            a in 0.0f64..2000.0,
            b in 0.0f64..2000.0,
        ) {
            let mut w = weapon(10.0, 0.0);
            w.blast_radius = blast_radius;
            let profile = DamageProfile::new(&w, DVec2::ZERO, 1.0);
            prop_assert_eq!(profile.scale_for(DVec2::ZERO, mask), 1.0);
            let (near, far) = if a <= b { (a, b) } else { (b, a) };
            let s_near = profile.scale_for(DVec2::new(near, 0.0), mask);
            let s_far = profile.scale_for(DVec2::new(far, 0.0), mask);
            prop_assert!(s_far <= s_near);
        }

        #[test]
        fn shields_never_driven_negative(
            shields in 0.0f64..100.0,
            shield_damage in 0.0f64..500.0,
            piercing in 0.0f64..1.0,
        ) {
            let mut w = weapon(5.0, shield_damage);
            w.piercing = piercing;
            let a = attrs(100.0, 100.0);
            let mut levels = a.full_levels();
            levels.shields = shields;
            let dealt = resolve(&w, &a, &levels);
            prop_assert!(dealt.levels.shields <= shields + 1e-9);
            prop_assert!(dealt.shield_fraction >= 0.0 && dealt.shield_fraction <= 1.0);
        }
    }
}
