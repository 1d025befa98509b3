//! Everything that exists only in the flagship's system: projectiles,
//! flotsam, weather, visuals and the asteroid field, plus the buffer of
//! records created mid-tick.

use skirmish_core::events::{ShipEvent, SoundCue};

use crate::asteroids::AsteroidField;
use crate::flotsam::Flotsam;
use crate::projectile::Projectile;
use crate::visual::Visual;
use crate::weather::Weather;

/// Records created during a tick, spliced into the live lists at a fixed
/// point so they neither move nor collide on the tick that made them.
#[derive(Debug, Default)]
pub struct Pending {
    pub projectiles: Vec<Projectile>,
    pub flotsam: Vec<Flotsam>,
    pub weather: Vec<Weather>,
    pub visuals: Vec<Visual>,
}

impl Pending {
    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
            && self.flotsam.is_empty()
            && self.weather.is_empty()
            && self.visuals.is_empty()
    }

    pub fn clear(&mut self) {
        self.projectiles.clear();
        self.flotsam.clear();
        self.weather.clear();
        self.visuals.clear();
    }
}

#[derive(Debug)]
pub struct Scene {
    pub projectiles: Vec<Projectile>,
    pub flotsam: Vec<Flotsam>,
    pub weather: Vec<Weather>,
    pub visuals: Vec<Visual>,
    pub asteroids: AsteroidField,
    pub pending: Pending,
}

impl Scene {
    pub fn new(asteroid_wrap: f64) -> Self {
        Self {
            projectiles: Vec::new(),
            flotsam: Vec::new(),
            weather: Vec::new(),
            visuals: Vec::new(),
            asteroids: AsteroidField::new(asteroid_wrap),
            pending: Pending::default(),
        }
    }

    /// Move buffered records into the live lists.
    pub fn splice(&mut self) {
        self.projectiles.append(&mut self.pending.projectiles);
        self.flotsam.append(&mut self.pending.flotsam);
        self.weather.append(&mut self.pending.weather);
        self.visuals.append(&mut self.pending.visuals);
    }

    /// Forget everything tied to the system being left.
    pub fn clear(&mut self) {
        self.projectiles.clear();
        self.flotsam.clear();
        self.weather.clear();
        self.visuals.clear();
        self.asteroids.clear();
        self.pending.clear();
    }

    /// Drop dead and expired records.
    pub fn prune(&mut self) {
        self.projectiles.retain(|p| !p.dead && !p.expired);
        self.flotsam.retain(|f| !f.is_dead());
        self.weather.retain(|w| !w.is_dead());
        self.visuals.retain(|v| !v.is_dead());
        self.asteroids.prune();
    }
}

/// Notifications gathered over one tick, moved into the frame at the end.
#[derive(Debug, Default)]
pub struct Outbox {
    pub events: Vec<ShipEvent>,
    pub cues: Vec<SoundCue>,
}
