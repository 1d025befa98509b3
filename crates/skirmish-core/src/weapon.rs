//! Weapon stat blocks and the catalog that owns them.
//!
//! Definitions are loaded once (serde JSON) into a `WeaponCatalog` arena and
//! referred to everywhere else by `WeaponId`.

use serde::{Deserialize, Serialize};

use crate::enums::MountType;
use crate::error::ConfigError;
use crate::resources::ResourceLevels;
use crate::types::WeaponId;

/// Which mount kinds a weapon may be installed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountSupport {
    #[serde(default)]
    pub gun: bool,
    #[serde(default)]
    pub turret: bool,
}

impl MountSupport {
    pub fn accepts(&self, mount: MountType) -> bool {
        match mount {
            MountType::Gun => self.gun,
            MountType::Turret => self.turret,
        }
    }
}

/// Damage multiplier as a function of distance.
///
/// 1.0 up to `start`, linear down to `floor` at `end`, `floor` beyond.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropoffCurve {
    pub start: f64,
    pub end: f64,
    pub floor: f64,
}

impl DropoffCurve {
    pub fn evaluate(&self, distance: f64) -> f64 {
        if distance <= self.start {
            return 1.0;
        }
        if distance >= self.end || self.end <= self.start {
            return self.floor;
        }
        let t = (distance - self.start) / (self.end - self.start);
        1.0 + (self.floor - 1.0) * t
    }
}

/// Resources consumed by one shot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiringCost {
    pub energy: f64,
    pub heat: f64,
    pub fuel: f64,
    pub hull: f64,
    pub shields: f64,
    pub ammo: u32,
}

/// Static definition of one weapon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponDef {
    pub name: String,
    /// Must be declared; `None` is a configuration error at install time.
    pub mounts: Option<MountSupport>,

    // --- Projectile ---
    /// Muzzle speed added to the firing ship's velocity.
    pub velocity: f64,
    /// Projectile lifetime in ticks.
    pub lifetime: u32,
    /// Homing turn strength; 0 flies straight.
    pub homing: f64,
    /// Phasing projectiles only collide with their locked target.
    pub phasing: bool,
    /// Bodies a projectile may hit before it dies (0 is treated as 1).
    pub penetration: u32,
    /// Anti-missile resistance of the projectile; 0 means it cannot be shot down.
    pub missile_strength: f64,

    // --- Timing ---
    /// Ticks between bursts.
    pub reload: f64,
    /// Shots per burst.
    pub burst_count: u32,
    /// Ticks between shots inside a burst.
    pub burst_reload: f64,
    /// Multiple installed copies share one stream gate.
    pub streamed: bool,
    /// Turret slew rate in radians per tick.
    pub turret_turn: f64,

    // --- Damage ---
    /// Flat per-channel damage.
    pub damage: ResourceLevels,
    /// Damage as a fraction of the target's capacity (instantaneous channels).
    pub relative_damage: ResourceLevels,
    /// Hull damage dealt past the disabled threshold. Defaults to hull damage.
    pub disabled_damage: Option<f64>,
    pub hit_force: f64,
    pub piercing: f64,
    pub blast_radius: f64,
    pub trigger_radius: f64,
    /// Safe blasts only damage hostile bodies.
    pub safe: bool,
    pub dropoff: Option<DropoffCurve>,

    // --- Special mounts ---
    /// Anti-missile strength; nonzero makes this a point-defense weapon.
    pub anti_missile: f64,
    /// Tractor pull per tick; nonzero makes this a tractor beam.
    pub tractor_beam: f64,
    /// Reach of anti-missile and tractor beams.
    pub beam_range: f64,

    pub cost: FiringCost,
}

impl WeaponDef {
    /// Declared mount support, or the configuration error that refuses it.
    pub fn mount_support(&self) -> Result<MountSupport, ConfigError> {
        match self.mounts {
            Some(m) if m.gun || m.turret => Ok(m),
            _ => Err(ConfigError::MissingMountType(self.name.clone())),
        }
    }

    /// Maximum reach of the weapon.
    pub fn range(&self) -> f64 {
        let flight = self.velocity * self.lifetime as f64;
        if flight > 0.0 {
            flight
        } else {
            self.beam_range
        }
    }

    /// Shots per burst, at least one.
    pub fn burst(&self) -> u32 {
        self.burst_count.max(1)
    }

    /// Hits per projectile, at least one.
    pub fn hits(&self) -> u32 {
        self.penetration.max(1)
    }

    /// Ticks between shots inside a burst; non-burst weapons use `reload`.
    pub fn shot_interval(&self) -> f64 {
        if self.burst() > 1 {
            self.burst_reload
        } else {
            self.reload
        }
    }

    pub fn is_special(&self) -> bool {
        self.anti_missile > 0.0 || self.tractor_beam > 0.0
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidStat {
            weapon: self.name.clone(),
            reason: reason.to_string(),
        };
        let finite = [
            self.velocity,
            self.reload,
            self.burst_reload,
            self.blast_radius,
            self.trigger_radius,
            self.piercing,
            self.hit_force,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(invalid("non-finite stat"));
        }
        if self.reload < 0.0 || self.burst_reload < 0.0 {
            return Err(invalid("negative reload"));
        }
        if self.blast_radius < 0.0 || self.trigger_radius < 0.0 {
            return Err(invalid("negative radius"));
        }
        if let Some(curve) = self.dropoff {
            if curve.end < curve.start {
                return Err(invalid("dropoff end before start"));
            }
        }
        Ok(())
    }
}

/// Arena of weapon definitions addressed by `WeaponId`.
#[derive(Debug, Clone, Default)]
pub struct WeaponCatalog {
    defs: Vec<WeaponDef>,
}

impl WeaponCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and add a definition, returning its handle.
    pub fn insert(&mut self, def: WeaponDef) -> Result<WeaponId, ConfigError> {
        def.validate()?;
        let id = WeaponId(self.defs.len() as u32);
        self.defs.push(def);
        Ok(id)
    }

    /// Build a catalog from already-parsed definitions.
    pub fn from_defs(defs: Vec<WeaponDef>) -> Result<Self, ConfigError> {
        let mut catalog = Self::new();
        for def in defs {
            catalog.insert(def)?;
        }
        Ok(catalog)
    }

    /// Parse a JSON array of definitions.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let defs: Vec<WeaponDef> = serde_json::from_str(json)?;
        Self::from_defs(defs)
    }

    pub fn get(&self, id: WeaponId) -> Option<&WeaponDef> {
        self.defs.get(id.0 as usize)
    }

    pub fn find(&self, name: &str) -> Option<WeaponId> {
        self.defs
            .iter()
            .position(|d| d.name == name)
            .map(|i| WeaponId(i as u32))
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WeaponId, &WeaponDef)> {
        self.defs
            .iter()
            .enumerate()
            .map(|(i, d)| (WeaponId(i as u32), d))
    }

    /// Every definition that would be refused at install time.
    pub fn mount_errors(&self) -> Vec<ConfigError> {
        self.defs
            .iter()
            .filter_map(|d| d.mount_support().err())
            .collect()
    }
}
