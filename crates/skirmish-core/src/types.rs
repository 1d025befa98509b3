//! Fundamental identifiers, geometric helpers, and simulation time.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Stable handle into a [`crate::weapon::WeaponCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WeaponId(pub u32);

/// A government (faction). Hostility lives in `Diplomacy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct GovernmentId(pub u32);

/// A star system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct SystemId(pub u32);

/// Opaque ship identity handed to outbound consumers (AI, missions, UI).
///
/// The sim derives it from the ECS entity bits, so a stale id never
/// resolves to a different ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShipId(pub u64);

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Seconds per tick at the default tick rate.
    pub fn dt(&self) -> f64 {
        1.0 / crate::constants::TICK_RATE as f64
    }

    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed_secs += self.dt();
    }
}

/// Unit vector for a facing angle in radians (0 = +y, clockwise).
pub fn unit(angle: f64) -> DVec2 {
    DVec2::new(angle.sin(), angle.cos())
}

/// Facing angle of a vector, inverse of [`unit`]. Zero vectors face 0.
pub fn angle_of(v: DVec2) -> f64 {
    if v == DVec2::ZERO {
        return 0.0;
    }
    v.x.atan2(v.y)
}

/// Rotate a ship-local offset into world orientation.
pub fn rotate(offset: DVec2, facing: f64) -> DVec2 {
    let (s, c) = facing.sin_cos();
    DVec2::new(offset.x * c + offset.y * s, -offset.x * s + offset.y * c)
}

/// Signed shortest difference `to - from`, in (-PI, PI].
pub fn angle_delta(from: f64, to: f64) -> f64 {
    let tau = std::f64::consts::TAU;
    let d = (to - from).rem_euclid(tau);
    if d > std::f64::consts::PI {
        d - tau
    } else {
        d
    }
}

/// Map a position into the `[0, period)` square of a toroidal space.
pub fn wrap_position(p: DVec2, period: f64) -> DVec2 {
    DVec2::new(p.x.rem_euclid(period), p.y.rem_euclid(period))
}

/// Shortest displacement from `from` to `to` in a toroidal space.
pub fn wrapped_delta(from: DVec2, to: DVec2, period: f64) -> DVec2 {
    let half = period * 0.5;
    let mut d = to - from;
    d.x = (d.x + half).rem_euclid(period) - half;
    d.y = (d.y + half).rem_euclid(period) - half;
    d
}
