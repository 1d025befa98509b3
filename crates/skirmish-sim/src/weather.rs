//! Area hazards ("weather") that pulse damage over a ring or a whole system.

use glam::DVec2;
use skirmish_core::types::WeaponId;

#[derive(Debug, Clone)]
pub struct Weather {
    pub hazard: WeaponId,
    pub origin: DVec2,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub system_wide: bool,
    /// Ticks between pulses; 0 pulses every tick.
    pub pulse: u32,
    pub strength: f64,
    pub lifetime: u32,
    pub age: u32,
}

impl Weather {
    pub fn advance(&mut self) {
        self.age += 1;
        self.lifetime = self.lifetime.saturating_sub(1);
    }

    pub fn is_dead(&self) -> bool {
        self.lifetime == 0
    }

    /// Whether this tick deals damage.
    pub fn pulses(&self) -> bool {
        !self.is_dead() && (self.pulse == 0 || self.age % self.pulse == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulse_schedule() {
        let mut w = Weather {
            hazard: WeaponId(0),
            origin: DVec2::ZERO,
            inner_radius: 0.0,
            outer_radius: 100.0,
            system_wide: false,
            pulse: 3,
            strength: 1.0,
            lifetime: 7,
            age: 0,
        };
        let mut pulses = Vec::new();
        for _ in 0..8 {
            w.advance();
            pulses.push(w.pulses());
        }
        assert_eq!(pulses, vec![false, false, true, false, false, true, false, false]);
        assert!(w.is_dead());
    }
}
