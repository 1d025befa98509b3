//! Projectiles in flight.
//!
//! Projectiles are plain records in a `Vec`, not ECS entities: they live for
//! a handful of ticks, never outlive the system they were fired in, and are
//! only ever touched by the calc thread.

use glam::DVec2;
use hecs::Entity;
use skirmish_core::constants::HOMING_TURN_RATE;
use skirmish_core::types::{angle_delta, angle_of, unit, GovernmentId, WeaponId};
use skirmish_core::weapon::WeaponDef;

#[derive(Debug, Clone)]
pub struct Projectile {
    pub weapon: WeaponId,
    pub position: DVec2,
    /// Position before the latest move; collisions sweep from here.
    pub previous: DVec2,
    pub velocity: DVec2,
    pub facing: f64,
    pub source: Option<Entity>,
    pub government: Option<GovernmentId>,
    /// Locked target; a stale entity means no target.
    pub target: Option<Entity>,
    pub lifetime: u32,
    pub distance_traveled: f64,
    /// Bodies this projectile may still damage.
    pub hits_remaining: u32,
    /// Created this tick; does not move or collide until the next.
    pub fresh: bool,
    /// Lifetime ran out on the latest move. The final segment still
    /// collides this tick; the record is dropped at cleanup.
    pub expired: bool,
    pub dead: bool,
}

impl Projectile {
    /// A projectile leaving a mount at `angle` (world frame).
    #[allow(clippy::too_many_arguments)]
    pub fn launch(
        weapon: WeaponId,
        def: &WeaponDef,
        position: DVec2,
        angle: f64,
        inherited: DVec2,
        source: Option<Entity>,
        government: Option<GovernmentId>,
        target: Option<Entity>,
    ) -> Self {
        Self {
            weapon,
            position,
            previous: position,
            velocity: inherited + unit(angle) * def.velocity,
            facing: angle,
            source,
            government,
            target,
            lifetime: def.lifetime.max(1),
            distance_traveled: 0.0,
            hits_remaining: def.hits(),
            fresh: true,
            expired: false,
            dead: false,
        }
    }

    /// One tick of flight. `target_position` is the live target, if any.
    pub fn advance(&mut self, def: &WeaponDef, target_position: Option<DVec2>) {
        if self.dead || self.expired {
            return;
        }
        self.fresh = false;
        if def.homing > 0.0 {
            if let Some(target) = target_position {
                let speed = self.velocity.length();
                let wanted = angle_of(target - self.position);
                let max_turn = def.homing * HOMING_TURN_RATE;
                self.facing += angle_delta(self.facing, wanted).clamp(-max_turn, max_turn);
                self.velocity = unit(self.facing) * speed;
            }
        }
        self.previous = self.position;
        self.position += self.velocity;
        self.distance_traveled += self.velocity.length();
        self.lifetime = self.lifetime.saturating_sub(1);
        if self.lifetime == 0 {
            self.expired = true;
        }
    }

    /// Record one hit; returns whether the projectile is spent.
    pub fn spend_hit(&mut self) -> bool {
        self.hits_remaining = self.hits_remaining.saturating_sub(1);
        if self.hits_remaining == 0 {
            self.dead = true;
        }
        self.dead
    }
}
