//! Short-lived visual effects: explosions, sparks, debris.

use glam::DVec2;
use skirmish_core::constants::{EXPLOSION_LIFETIME, SPARK_LIFETIME};
use skirmish_core::enums::VisualKind;

#[derive(Debug, Clone, Copy)]
pub struct Visual {
    pub kind: VisualKind,
    pub position: DVec2,
    pub velocity: DVec2,
    pub lifetime: u32,
}

impl Visual {
    pub fn new(kind: VisualKind, position: DVec2, velocity: DVec2) -> Self {
        let lifetime = match kind {
            VisualKind::Explosion => EXPLOSION_LIFETIME,
            VisualKind::Spark => SPARK_LIFETIME,
            VisualKind::Debris => EXPLOSION_LIFETIME * 2,
        };
        Self {
            kind,
            position,
            velocity,
            lifetime,
        }
    }

    pub fn advance(&mut self) {
        self.position += self.velocity;
        self.lifetime = self.lifetime.saturating_sub(1);
    }

    pub fn is_dead(&self) -> bool {
        self.lifetime == 0
    }
}
