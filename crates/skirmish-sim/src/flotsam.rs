//! Cargo drifting in space, collectable by ships with free hold space.

use glam::DVec2;
use hecs::Entity;
use skirmish_core::constants::{FLOTSAM_DRAG, FLOTSAM_LIFETIME, FLOTSAM_SOURCE_IMMUNITY};

#[derive(Debug, Clone)]
pub struct Flotsam {
    pub commodity: String,
    pub count: u32,
    pub position: DVec2,
    pub velocity: DVec2,
    pub spin: f64,
    pub facing: f64,
    pub lifetime: u32,
    /// The ship that dumped it, immune to collecting it for a while.
    pub source: Option<Entity>,
    pub immunity: u32,
    /// Tractor pulls gathered this tick.
    pub pull: DVec2,
    pub puller_velocity: DVec2,
    pub pullers: u32,
    pub collected: bool,
}

impl Flotsam {
    pub fn new(commodity: &str, count: u32, position: DVec2, velocity: DVec2, source: Option<Entity>) -> Self {
        Self {
            commodity: commodity.to_string(),
            count,
            position,
            velocity,
            spin: 0.0,
            facing: 0.0,
            lifetime: FLOTSAM_LIFETIME,
            source,
            immunity: if source.is_some() { FLOTSAM_SOURCE_IMMUNITY } else { 0 },
            pull: DVec2::ZERO,
            puller_velocity: DVec2::ZERO,
            pullers: 0,
            collected: false,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.collected || self.lifetime == 0 || self.count == 0
    }

    pub fn advance(&mut self) {
        self.position += self.velocity;
        self.velocity *= FLOTSAM_DRAG;
        self.facing += self.spin;
        self.lifetime = self.lifetime.saturating_sub(1);
        self.immunity = self.immunity.saturating_sub(1);
        self.pull = DVec2::ZERO;
        self.puller_velocity = DVec2::ZERO;
        self.pullers = 0;
    }

    /// Whether `ship` may pick this up now.
    pub fn collectable_by(&self, ship: Entity) -> bool {
        !(self.immunity > 0 && self.source == Some(ship))
    }

    pub fn add_pull(&mut self, pull: DVec2, puller_velocity: DVec2) {
        self.pull += pull;
        self.puller_velocity += puller_velocity;
        self.pullers += 1;
    }

    /// Tractored flotsam moves with the sum of pulls plus the pullers' mean velocity.
    pub fn apply_pulls(&mut self) {
        if self.pullers > 0 {
            self.velocity = self.pull + self.puller_velocity / self.pullers as f64;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tractor_velocity_formula() {
        let mut f = Flotsam::new("Ore", 3, DVec2::ZERO, DVec2::new(5.0, 5.0), None);
        f.add_pull(DVec2::new(1.0, 0.0), DVec2::new(2.0, 0.0));
        f.add_pull(DVec2::new(0.0, 2.0), DVec2::new(0.0, 4.0));
        f.apply_pulls();
        assert_eq!(f.velocity, DVec2::new(2.0, 4.0));
    }

    #[test]
    fn test_untractored_keeps_velocity() {
        let mut f = Flotsam::new("Ore", 3, DVec2::ZERO, DVec2::new(5.0, 0.0), None);
        f.apply_pulls();
        assert_eq!(f.velocity, DVec2::new(5.0, 0.0));
        f.advance();
        assert_eq!(f.position, DVec2::new(5.0, 0.0));
        assert_eq!(f.lifetime, FLOTSAM_LIFETIME - 1);
    }

    #[test]
    fn test_source_immunity_expires() {
        let mut world = hecs::World::new();
        let ship = world.spawn((0u8,));
        let other = world.spawn((1u8,));
        let mut f = Flotsam::new("Food", 1, DVec2::ZERO, DVec2::ZERO, Some(ship));
        assert!(!f.collectable_by(ship));
        assert!(f.collectable_by(other));
        for _ in 0..FLOTSAM_SOURCE_IMMUNITY {
            f.advance();
        }
        assert!(f.collectable_by(ship));
    }
}
