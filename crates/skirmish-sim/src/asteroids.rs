//! Asteroid field: drifting rocks in a toroidal tile, plus minables on
//! closed-form elliptical orbits.

use std::f64::consts::TAU;

use glam::DVec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use skirmish_core::constants::MINABLE_ORE_YIELD;
use skirmish_core::types::{unit, wrap_position};

use crate::universe::BeltSpec;

#[derive(Debug, Clone, Copy)]
pub struct Asteroid {
    pub position: DVec2,
    pub velocity: DVec2,
    pub facing: f64,
    pub spin: f64,
    pub radius: f64,
}

/// Ellipse with one focus at `center`, traversed at a constant angular rate.
#[derive(Debug, Clone, Copy)]
pub struct Orbit {
    pub center: DVec2,
    pub semi_major: f64,
    pub eccentricity: f64,
    /// Radians per tick.
    pub rate: f64,
    pub phase: f64,
}

impl Orbit {
    pub fn position(&self, tick: u64) -> DVec2 {
        let theta = self.phase + self.rate * tick as f64;
        let e = self.eccentricity.clamp(0.0, 0.95);
        let r = self.semi_major * (1.0 - e * e) / (1.0 + e * theta.cos());
        self.center + unit(theta) * r
    }
}

#[derive(Debug, Clone)]
pub struct Minable {
    pub commodity: String,
    pub position: DVec2,
    pub velocity: DVec2,
    pub radius: f64,
    pub hull: f64,
    pub orbit: Orbit,
    pub dead: bool,
}

/// Ore released by a destroyed minable.
#[derive(Debug, Clone, PartialEq)]
pub struct OreDrop {
    pub commodity: String,
    pub count: u32,
    pub position: DVec2,
    pub velocity: DVec2,
}

#[derive(Debug, Clone)]
pub struct AsteroidField {
    pub asteroids: Vec<Asteroid>,
    pub minables: Vec<Minable>,
    wrap: f64,
}

impl AsteroidField {
    pub fn new(wrap: f64) -> Self {
        Self {
            asteroids: Vec::new(),
            minables: Vec::new(),
            wrap,
        }
    }

    pub fn wrap(&self) -> f64 {
        self.wrap
    }

    pub fn clear(&mut self) {
        self.asteroids.clear();
        self.minables.clear();
    }

    /// Replace the field with a fresh one for a newly entered system.
    pub fn regenerate(&mut self, belt: &BeltSpec, rng: &mut ChaCha8Rng, tick: u64) {
        self.clear();
        let asteroids = if self.wrap.is_finite() && self.wrap > 0.0 {
            belt.asteroids
        } else {
            tracing::warn!(wrap = self.wrap, "asteroid field has no area; skipping asteroids");
            0
        };
        for _ in 0..asteroids {
            let position = DVec2::new(rng.gen_range(0.0..self.wrap), rng.gen_range(0.0..self.wrap));
            let heading = rng.gen_range(0.0..TAU);
            let speed = belt.asteroid_speed * rng.gen_range(0.5..1.5);
            self.asteroids.push(Asteroid {
                position,
                velocity: unit(heading) * speed,
                facing: rng.gen_range(0.0..TAU),
                spin: rng.gen_range(-0.02..0.02),
                radius: belt.asteroid_radius * rng.gen_range(0.6..1.4),
            });
        }
        for spec in &belt.minables {
            for _ in 0..spec.count {
                let semi_major = spec.orbit_radius * rng.gen_range(0.8..1.2);
                // Angular rate falls off like a Keplerian orbit.
                let rate = 40.0 / semi_major.max(1.0).powf(1.5);
                let orbit = Orbit {
                    center: DVec2::ZERO,
                    semi_major,
                    eccentricity: spec.eccentricity,
                    rate,
                    phase: rng.gen_range(0.0..TAU),
                };
                self.minables.push(Minable {
                    commodity: spec.commodity.clone(),
                    position: orbit.position(tick),
                    velocity: orbit.position(tick + 1) - orbit.position(tick),
                    radius: spec.radius,
                    hull: spec.hull,
                    orbit,
                    dead: false,
                });
            }
        }
    }

    pub fn step(&mut self, tick: u64) {
        for asteroid in &mut self.asteroids {
            asteroid.position = wrap_position(asteroid.position + asteroid.velocity, self.wrap);
            asteroid.facing += asteroid.spin;
        }
        for minable in &mut self.minables {
            let next = minable.orbit.position(tick + 1);
            minable.position = minable.orbit.position(tick);
            minable.velocity = next - minable.position;
        }
    }

    /// Damage a minable, returning its ore when the hit breaks it.
    pub fn damage_minable(&mut self, index: usize, amount: f64) -> Option<OreDrop> {
        let minable = self.minables.get_mut(index)?;
        if minable.dead || amount <= 0.0 {
            return None;
        }
        minable.hull -= amount;
        if minable.hull > 0.0 {
            return None;
        }
        minable.dead = true;
        Some(OreDrop {
            commodity: minable.commodity.clone(),
            count: MINABLE_ORE_YIELD,
            position: minable.position,
            velocity: minable.velocity,
        })
    }

    /// Drop broken minables.
    pub fn prune(&mut self) {
        self.minables.retain(|m| !m.dead);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::universe::MinableSpec;
    use rand::SeedableRng;

    fn belt() -> BeltSpec {
        BeltSpec {
            asteroids: 10,
            asteroid_radius: 20.0,
            asteroid_speed: 1.0,
            minables: vec![MinableSpec {
                commodity: "Iron".into(),
                count: 2,
                hull: 30.0,
                radius: 15.0,
                orbit_radius: 1000.0,
                eccentricity: 0.2,
            }],
        }
    }

    #[test]
    fn test_asteroids_stay_inside_wrap() {
        let mut field = AsteroidField::new(4096.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        field.regenerate(&belt(), &mut rng, 0);
        assert_eq!(field.asteroids.len(), 10);
        assert_eq!(field.minables.len(), 2);
        for tick in 0..5000 {
            field.step(tick);
        }
        for a in &field.asteroids {
            assert!(a.position.x >= 0.0 && a.position.x < 4096.0);
            assert!(a.position.y >= 0.0 && a.position.y < 4096.0);
        }
    }

    #[test]
    fn test_zero_wrap_skips_asteroids() {
        let mut field = AsteroidField::new(0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        field.regenerate(&belt(), &mut rng, 0);
        assert!(field.asteroids.is_empty());
        assert_eq!(field.minables.len(), 2);
    }

    #[test]
    fn test_orbit_is_closed_form() {
        let orbit = Orbit {
            center: DVec2::ZERO,
            semi_major: 100.0,
            eccentricity: 0.0,
            rate: 0.01,
            phase: 0.0,
        };
        assert!((orbit.position(0) - DVec2::new(0.0, 100.0)).length() < 1e-9);
        let period = (TAU / 0.01).round() as u64;
        assert!((orbit.position(1234) - orbit.position(1234 + period)).length() < 1.0);
        assert!((orbit.position(777).length() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_breaking_minable_drops_ore() {
        let mut field = AsteroidField::new(4096.0);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        field.regenerate(&belt(), &mut rng, 0);
        assert!(field.damage_minable(0, 10.0).is_none());
        let drop = field.damage_minable(0, 25.0).unwrap();
        assert_eq!(drop.commodity, "Iron");
        assert_eq!(drop.count, MINABLE_ORE_YIELD);
        assert!(field.damage_minable(0, 25.0).is_none());
        field.prune();
        assert_eq!(field.minables.len(), 1);
    }
}
