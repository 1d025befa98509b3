//! Weapon mounts and their firing state machine.
//!
//! An `Armament` is the set of hardpoints on one ship plus the stream gates
//! that stagger copies of a streamed weapon. It is aged once per tick by
//! `step` and mutated by fire attempts, always on the calc thread.

use std::collections::BTreeMap;

use glam::DVec2;
use skirmish_core::enums::MountType;
use skirmish_core::error::ConfigError;
use skirmish_core::types::{angle_delta, angle_of, rotate, WeaponId};
use skirmish_core::weapon::{WeaponCatalog, WeaponDef};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArmamentError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Fixed or free-aiming mount, with the per-kind aim state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MountKind {
    /// Fires along the ship's facing, toed in toward a convergence point.
    Gun { convergence: f64 },
    /// Tracks its own angle relative to the ship's facing.
    Turret { angle: f64 },
}

impl MountKind {
    pub fn mount_type(&self) -> MountType {
        match self {
            MountKind::Gun { .. } => MountType::Gun,
            MountKind::Turret { .. } => MountType::Turret,
        }
    }

    /// Firing angle relative to the ship's facing.
    pub fn angle(&self) -> f64 {
        match *self {
            MountKind::Gun { convergence } => convergence,
            MountKind::Turret { angle } => angle,
        }
    }
}

/// Observable state of one mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountState {
    Empty,
    Idle,
    Reloading,
    Jammed,
}

/// Result of a fire attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// A shot left the mount; the caller spawns the projectile.
    Fired,
    /// Nothing happened and no state changed.
    Refused,
    /// The attempt was consumed without a shot.
    Jammed,
}

/// Turret tracking request for one mount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimCommand {
    pub index: usize,
    /// Desired angle relative to the ship's facing.
    pub angle: f64,
}

/// Timing copied from the weapon definition at install time.
#[derive(Debug, Clone, Copy)]
struct Timing {
    reload: f64,
    burst: u32,
    interval: f64,
    streamed: bool,
    turn: f64,
    range: f64,
}

impl Timing {
    fn of(def: &WeaponDef) -> Self {
        Self {
            reload: def.reload,
            burst: def.burst(),
            interval: def.shot_interval(),
            streamed: def.streamed,
            turn: def.turret_turn,
            range: def.range(),
        }
    }
}

/// One weapon slot.
#[derive(Debug, Clone)]
pub struct Hardpoint {
    pub offset: DVec2,
    pub kind: MountKind,
    weapon: Option<WeaponId>,
    timing: Option<Timing>,
    reload: f64,
    burst_reload: f64,
    burst_count: u32,
    jammed: bool,
}

impl Hardpoint {
    fn new(offset: DVec2, kind: MountKind) -> Self {
        Self {
            offset,
            kind,
            weapon: None,
            timing: None,
            reload: 0.0,
            burst_reload: 0.0,
            burst_count: 0,
            jammed: false,
        }
    }

    pub fn weapon(&self) -> Option<WeaponId> {
        self.weapon
    }

    pub fn mount_type(&self) -> MountType {
        self.kind.mount_type()
    }

    pub fn reload(&self) -> f64 {
        self.reload
    }

    pub fn state(&self) -> MountState {
        if self.weapon.is_none() {
            MountState::Empty
        } else if self.jammed {
            MountState::Jammed
        } else if self.is_ready() {
            MountState::Idle
        } else {
            MountState::Reloading
        }
    }

    pub fn is_ready(&self) -> bool {
        self.weapon.is_some() && !self.jammed && self.burst_reload <= 0.0 && self.burst_count > 0
    }

    /// Part way through a burst: later shots are not re-gated.
    pub fn burst_started(&self) -> bool {
        self.timing
            .is_some_and(|t| self.burst_count > 0 && self.burst_count < t.burst)
    }

    /// Whether the mount can bear on `angle` (relative to facing) this tick.
    pub fn can_bear(&self, angle: f64, cone: f64) -> bool {
        angle_delta(self.kind.angle(), angle).abs() <= cone
    }

    fn install(&mut self, id: WeaponId, def: &WeaponDef) {
        self.weapon = Some(id);
        self.timing = Some(Timing::of(def));
        self.reset();
        self.converge();
    }

    fn uninstall(&mut self) {
        self.weapon = None;
        self.timing = None;
        self.reload = 0.0;
        self.burst_reload = 0.0;
        self.burst_count = 0;
        self.jammed = false;
    }

    fn reset(&mut self) {
        self.reload = 0.0;
        self.burst_reload = 0.0;
        self.burst_count = self.timing.map_or(0, |t| t.burst);
        self.jammed = false;
    }

    /// Toe a gun in so its shots cross the centerline at weapon range.
    fn converge(&mut self) {
        if let MountKind::Gun { convergence } = &mut self.kind {
            let range = self.timing.map_or(0.0, |t| t.range);
            *convergence = if range > 0.0 {
                angle_of(DVec2::new(-self.offset.x, range - self.offset.y))
            } else {
                0.0
            };
        }
    }

    fn aim(&mut self, target: f64) {
        let turn = self.timing.map_or(0.0, |t| t.turn);
        if let MountKind::Turret { angle } = &mut self.kind {
            let delta = angle_delta(*angle, target);
            *angle += if turn > 0.0 {
                delta.clamp(-turn, turn)
            } else {
                delta
            };
        }
    }

    /// Spend one shot of the current burst.
    fn discharge(&mut self) {
        let Some(timing) = self.timing else {
            return;
        };
        self.burst_reload = timing.interval;
        self.burst_count = self.burst_count.saturating_sub(1);
        if self.burst_count == 0 {
            self.reload = timing.reload;
        }
    }

    fn step(&mut self) {
        self.jammed = false;
        let Some(timing) = self.timing else {
            return;
        };
        if self.reload > 0.0 {
            self.reload -= 1.0;
        }
        if self.burst_reload > 0.0 {
            self.burst_reload -= 1.0;
        }
        if self.burst_count == 0 && self.reload <= 0.0 {
            self.burst_count = timing.burst;
        }
    }
}

/// All hardpoints on a ship and the stream gates shared between them.
#[derive(Debug, Clone, Default)]
pub struct Armament {
    hardpoints: Vec<Hardpoint>,
    /// One entry per streamed weapon with at least one installed copy.
    gates: BTreeMap<WeaponId, f64>,
}

impl Armament {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_gun_port(&mut self, offset: DVec2) -> usize {
        self.hardpoints
            .push(Hardpoint::new(offset, MountKind::Gun { convergence: 0.0 }));
        self.hardpoints.len() - 1
    }

    pub fn add_turret(&mut self, offset: DVec2) -> usize {
        self.hardpoints
            .push(Hardpoint::new(offset, MountKind::Turret { angle: 0.0 }));
        self.hardpoints.len() - 1
    }

    pub fn hardpoints(&self) -> &[Hardpoint] {
        &self.hardpoints
    }

    pub fn get(&self, index: usize) -> Option<&Hardpoint> {
        self.hardpoints.get(index)
    }

    pub fn len(&self) -> usize {
        self.hardpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hardpoints.is_empty()
    }

    /// Copies of `id` currently installed.
    pub fn installed(&self, id: WeaponId) -> usize {
        self.hardpoints
            .iter()
            .filter(|h| h.weapon == Some(id))
            .count()
    }

    /// Current stream gate for a weapon, if one exists.
    pub fn gate(&self, id: WeaponId) -> Option<f64> {
        self.gates.get(&id).copied()
    }

    /// Install (positive `count`) or remove (negative) copies of a weapon.
    ///
    /// Returns the signed number of copies actually installed or removed.
    /// Weapons that do not declare a mount type are refused.
    pub fn add_weapon(
        &mut self,
        catalog: &WeaponCatalog,
        id: WeaponId,
        count: i32,
    ) -> Result<i32, ArmamentError> {
        let def = catalog.get(id).ok_or(ConfigError::UnknownWeapon(id))?;
        let support = def.mount_support().map_err(|err| {
            tracing::warn!(weapon = %def.name, "refusing install: {err}");
            err
        })?;

        let mut applied = 0;
        if count > 0 {
            for hardpoint in &mut self.hardpoints {
                if applied == count {
                    break;
                }
                if hardpoint.weapon.is_none() && support.accepts(hardpoint.mount_type()) {
                    hardpoint.install(id, def);
                    applied += 1;
                }
            }
            if applied > 0 && def.streamed {
                self.gates.entry(id).or_insert(0.0);
            }
        } else if count < 0 {
            for hardpoint in self.hardpoints.iter_mut().rev() {
                if applied == count {
                    break;
                }
                if hardpoint.weapon == Some(id) {
                    hardpoint.uninstall();
                    applied -= 1;
                }
            }
            if self.installed(id) == 0 {
                self.gates.remove(&id);
            }
        }
        Ok(applied)
    }

    /// Ready every mount and zero every gate.
    pub fn reload_all(&mut self) {
        for hardpoint in &mut self.hardpoints {
            hardpoint.reset();
        }
        for gate in self.gates.values_mut() {
            *gate = 0.0;
        }
    }

    /// Remove every weapon and drop every gate.
    pub fn uninstall_all(&mut self) {
        for hardpoint in &mut self.hardpoints {
            hardpoint.uninstall();
        }
        self.gates.clear();
    }

    /// Apply at most one tracking update per turret.
    pub fn aim(&mut self, commands: &[AimCommand]) {
        let mut aimed = vec![false; self.hardpoints.len()];
        for command in commands {
            let Some(hardpoint) = self.hardpoints.get_mut(command.index) else {
                continue;
            };
            if std::mem::replace(&mut aimed[command.index], true) {
                continue;
            }
            hardpoint.aim(command.angle);
        }
    }

    /// Attempt to fire a primary weapon.
    ///
    /// `jammed` is the caller's jam roll for this attempt.
    pub fn fire(&mut self, index: usize, catalog: &WeaponCatalog, jammed: bool) -> FireOutcome {
        let Some(hardpoint) = self.hardpoints.get(index) else {
            return FireOutcome::Refused;
        };
        let Some(id) = hardpoint.weapon else {
            return FireOutcome::Refused;
        };
        let Some(def) = catalog.get(id) else {
            return FireOutcome::Refused;
        };
        if def.is_special() || !hardpoint.is_ready() {
            return FireOutcome::Refused;
        }

        let gated = def.streamed && !hardpoint.burst_started();
        if gated && def.reload > 0.0 && self.gates.get(&id).is_some_and(|&g| g >= def.reload) {
            return FireOutcome::Refused;
        }

        let remaining = hardpoint.burst_count;
        if gated {
            let installed = self.installed(id).max(1) as f64;
            *self.gates.entry(id).or_insert(0.0) += def.reload * remaining as f64 / installed;
        }

        let hardpoint = &mut self.hardpoints[index];
        hardpoint.discharge();
        if jammed {
            hardpoint.jammed = true;
            return FireOutcome::Jammed;
        }
        FireOutcome::Fired
    }

    /// Fire a point-defense mount at a missile within beam range.
    pub fn fire_anti_missile(
        &mut self,
        index: usize,
        catalog: &WeaponCatalog,
        mount_position: DVec2,
        missile_position: DVec2,
    ) -> bool {
        let Some(def) = self.special(index, catalog) else {
            return false;
        };
        if def.anti_missile <= 0.0 || mount_position.distance(missile_position) > def.beam_range {
            return false;
        }
        self.hardpoints[index].discharge();
        true
    }

    /// Fire a tractor beam at flotsam within range, returning its pull.
    pub fn fire_tractor_beam(
        &mut self,
        index: usize,
        catalog: &WeaponCatalog,
        mount_position: DVec2,
        flotsam_position: DVec2,
    ) -> Option<DVec2> {
        let def = self.special(index, catalog)?;
        let offset = mount_position - flotsam_position;
        if def.tractor_beam <= 0.0 || offset.length() > def.beam_range {
            return None;
        }
        let pull = offset.try_normalize()? * def.tractor_beam;
        self.hardpoints[index].discharge();
        Some(pull)
    }

    fn special<'c>(&self, index: usize, catalog: &'c WeaponCatalog) -> Option<&'c WeaponDef> {
        let hardpoint = self.hardpoints.get(index)?;
        if !hardpoint.is_ready() {
            return None;
        }
        catalog.get(hardpoint.weapon?).filter(|d| d.is_special())
    }

    /// Age every mount by one tick and re-derive every stream gate.
    pub fn step(&mut self) {
        for hardpoint in &mut self.hardpoints {
            hardpoint.step();
        }
        let mut counts: BTreeMap<WeaponId, usize> = BTreeMap::new();
        for id in self.hardpoints.iter().filter_map(|h| h.weapon) {
            *counts.entry(id).or_insert(0) += 1;
        }
        self.gates.retain(|id, gate| {
            let installed = counts.get(id).copied().unwrap_or(0);
            if installed == 0 {
                return false;
            }
            let n = installed as f64;
            *gate = (*gate - n).max(1.0 - n);
            true
        });
    }

    /// Exchange the weapons on two mounts of the same kind.
    pub fn swap(&mut self, i: usize, j: usize) -> bool {
        if i == j || i >= self.hardpoints.len() || j >= self.hardpoints.len() {
            return false;
        }
        if self.hardpoints[i].mount_type() != self.hardpoints[j].mount_type() {
            return false;
        }
        let (a, b) = if i < j { (i, j) } else { (j, i) };
        let (left, right) = self.hardpoints.split_at_mut(b);
        let (x, y) = (&mut left[a], &mut right[0]);
        std::mem::swap(&mut x.weapon, &mut y.weapon);
        std::mem::swap(&mut x.timing, &mut y.timing);
        std::mem::swap(&mut x.reload, &mut y.reload);
        std::mem::swap(&mut x.burst_reload, &mut y.burst_reload);
        std::mem::swap(&mut x.burst_count, &mut y.burst_count);
        x.converge();
        y.converge();
        true
    }

    /// World position of a mount.
    pub fn mount_position(&self, index: usize, position: DVec2, facing: f64) -> DVec2 {
        self.hardpoints
            .get(index)
            .map_or(position, |h| position + rotate(h.offset, facing))
    }

    /// Longest reach among installed primary weapons.
    pub fn max_range(&self, catalog: &WeaponCatalog) -> f64 {
        self.hardpoints
            .iter()
            .filter_map(|h| catalog.get(h.weapon?))
            .filter(|d| !d.is_special())
            .map(|d| d.range())
            .fold(0.0, f64::max)
    }
}
