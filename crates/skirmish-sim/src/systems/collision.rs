//! Projectile collision resolution.
//!
//! Every live projectile is resolved against this tick's indices in three
//! stages: a trigger-radius proximity check, phasing weapons against their
//! locked target only, and otherwise line queries over ships, asteroids and
//! minables merged in ascending order of intersection fraction. Blast
//! weapons detonate on their first contact and damage everything inside
//! the blast radius through a circle query.

use glam::DVec2;
use hecs::{Entity, World};

use skirmish_core::attributes::ShipAttributes;
use skirmish_core::components::{Allegiance, Body, Presence, Vitals};
use skirmish_core::enums::{ShipEventKind, VisualKind};
use skirmish_core::events::{ShipEvent, SoundCue};
use skirmish_core::types::{GovernmentId, SystemId};
use skirmish_core::weapon::{WeaponCatalog, WeaponDef};

use crate::asteroids::AsteroidField;
use crate::damage::{DamageProfile, DamageTarget};
use crate::diplomacy::Diplomacy;
use crate::flotsam::Flotsam;
use crate::projectile::Projectile;
use crate::scene::{Outbox, Pending, Scene};
use crate::ship;
use crate::spatial::{Candidate, LineFilter, SpatialIndex};
use crate::visual::Visual;
use crate::world_setup::ship_id;

/// The per-category broad-phase indices, rebuilt every tick.
#[derive(Debug, Clone)]
pub struct Indices {
    pub ships: SpatialIndex<Entity>,
    pub asteroids: SpatialIndex<usize>,
    pub minables: SpatialIndex<usize>,
}

impl Indices {
    pub fn new(ship_cell: f64, ship_cells: usize, asteroid_cell: f64, asteroid_cells: usize, wrap: f64) -> Self {
        Self {
            ships: SpatialIndex::new(ship_cell, ship_cells),
            asteroids: SpatialIndex::new(asteroid_cell, asteroid_cells).with_wrap(wrap),
            minables: SpatialIndex::new(asteroid_cell, asteroid_cells),
        }
    }

    /// Index every body present in `system`.
    pub fn rebuild(&mut self, world: &World, field: &AsteroidField, system: SystemId, tick: u64) {
        self.ships.clear(tick);
        for (entity, (body, vitals, presence, allegiance)) in world
            .query::<(&Body, &Vitals, &Presence, &Allegiance)>()
            .iter()
        {
            if presence.system != system || presence.jump.is_some() || vitals.destroyed {
                continue;
            }
            self.ships
                .add(entity, body.position, body.radius, Some(allegiance.government));
        }
        self.ships.finish();

        self.asteroids.clear(tick);
        for (index, asteroid) in field.asteroids.iter().enumerate() {
            self.asteroids.add(index, asteroid.position, asteroid.radius, None);
        }
        self.asteroids.finish();

        self.minables.clear(tick);
        for (index, minable) in field.minables.iter().enumerate() {
            if !minable.dead {
                self.minables.add(index, minable.position, minable.radius, None);
            }
        }
        self.minables.finish();
    }
}

/// What a projectile ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionTarget {
    Ship(Entity),
    Asteroid(usize),
    Minable(usize),
    /// Proximity detonation without a direct hit.
    Nothing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    pub target: CollisionTarget,
    /// Position along the projectile's last move in `[0, 1]`.
    pub fraction: f64,
}

impl Collision {
    fn from_candidate<K>(candidate: Candidate<K>, target: impl Fn(K) -> CollisionTarget) -> Self {
        Self {
            target: target(candidate.key),
            fraction: candidate.fraction,
        }
    }
}

/// Who dealt a hit, for events and provocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Attacker {
    pub ship: Option<Entity>,
    pub government: Option<GovernmentId>,
}

/// Whether a projectile treats `ship` as something to go off against.
fn is_enemy(world: &World, diplomacy: &Diplomacy, projectile: &Projectile, ship: Entity) -> bool {
    if projectile.source == Some(ship) {
        return false;
    }
    if projectile.target == Some(ship) {
        return true;
    }
    let Ok(allegiance) = world.get::<&Allegiance>(ship) else {
        return false;
    };
    projectile
        .government
        .map_or(true, |g| diplomacy.is_hostile(g, allegiance.government))
}

/// Ordered collision records for one projectile's move this tick.
pub fn candidates(
    world: &World,
    indices: &mut Indices,
    diplomacy: &Diplomacy,
    projectile: &Projectile,
    def: &WeaponDef,
) -> Vec<Collision> {
    if def.trigger_radius > 0.0 {
        let nearby = indices.ships.circle(projectile.position, def.trigger_radius);
        if nearby
            .into_iter()
            .any(|ship| is_enemy(world, diplomacy, projectile, ship))
        {
            return vec![Collision {
                target: CollisionTarget::Nothing,
                fraction: 0.0,
            }];
        }
    }

    let (start, end) = (projectile.previous, projectile.position);

    if def.phasing {
        let Some(target) = projectile.target else {
            return Vec::new();
        };
        let filter = LineFilter {
            only: Some(target),
            ..Default::default()
        };
        return indices
            .ships
            .line(start, end, &filter)
            .into_iter()
            .map(|c| Collision::from_candidate(c, CollisionTarget::Ship))
            .collect();
    }

    let ship_filter = LineFilter {
        exclude: projectile.source,
        exclude_government: projectile.government,
        ..Default::default()
    };
    let mut hits: Vec<Collision> = indices
        .ships
        .line(start, end, &ship_filter)
        .into_iter()
        .map(|c| Collision::from_candidate(c, CollisionTarget::Ship))
        .collect();
    hits.extend(
        indices
            .asteroids
            .line(start, end, &LineFilter::default())
            .into_iter()
            .map(|c| Collision::from_candidate(c, CollisionTarget::Asteroid)),
    );
    hits.extend(
        indices
            .minables
            .line(start, end, &LineFilter::default())
            .into_iter()
            .map(|c| Collision::from_candidate(c, CollisionTarget::Minable)),
    );
    // Stable: equal fractions keep insertion order.
    hits.sort_by(|a, b| a.fraction.total_cmp(&b.fraction));
    hits
}

/// Apply one damage profile to a ship. Returns whether anything landed.
pub fn damage_ship(
    world: &mut World,
    target: Entity,
    profile: &DamageProfile,
    attacker: Attacker,
    diplomacy: &mut Diplomacy,
    outbox: &mut Outbox,
    tick: u64,
) -> bool {
    let Ok((body, vitals, attrs, allegiance)) =
        world.query_one_mut::<(&mut Body, &mut Vitals, &ShipAttributes, &Allegiance)>(target)
    else {
        return false;
    };
    if vitals.destroyed {
        return false;
    }
    let dealt = profile.calculate(&DamageTarget {
        levels: &vitals.levels,
        attributes: attrs,
        position: body.position,
        radius: body.radius,
        cloak: vitals.cloak,
        disabled: vitals.disabled,
    });
    if dealt.is_empty() {
        return false;
    }
    dealt.apply(&mut vitals.levels, &mut body.velocity, attrs.mass);
    let change = ship::update_status(vitals, attrs);

    let actor = attacker.ship.map(ship_id);
    let victim = ship_id(target);
    if change.disabled {
        tracing::debug!(ship = victim.0, "disabled");
        outbox.events.push(ShipEvent {
            kind: ShipEventKind::Disable,
            actor,
            target: victim,
            tick,
        });
    }
    if change.destroyed {
        outbox.events.push(ShipEvent {
            kind: ShipEventKind::Destroy,
            actor,
            target: victim,
            tick,
        });
    }
    if let Some(government) = attacker.government {
        if diplomacy.provoke(government, allegiance.government) {
            tracing::debug!(government = allegiance.government.0, "provoked");
            outbox.events.push(ShipEvent {
                kind: ShipEventKind::Provoke,
                actor,
                target: victim,
                tick,
            });
        }
    }
    true
}

/// Mutable state one projectile's resolution touches.
struct Resolver<'a> {
    world: &'a mut World,
    indices: &'a mut Indices,
    field: &'a mut AsteroidField,
    pending: &'a mut Pending,
    diplomacy: &'a mut Diplomacy,
    outbox: &'a mut Outbox,
    tick: u64,
}

impl Resolver<'_> {
    fn resolve(&mut self, projectile: &mut Projectile, def: &WeaponDef, hit: Collision) {
        let impact = match hit.target {
            CollisionTarget::Nothing => projectile.position,
            _ => projectile.previous.lerp(projectile.position, hit.fraction),
        };
        let profile = DamageProfile::projectile(def, impact, projectile.distance_traveled);
        let attacker = Attacker {
            ship: projectile.source,
            government: projectile.government,
        };

        if profile.is_blast() || hit.target == CollisionTarget::Nothing {
            self.detonate(&profile, projectile, attacker);
            projectile.dead = true;
            return;
        }

        match hit.target {
            CollisionTarget::Ship(ship) => {
                damage_ship(
                    self.world,
                    ship,
                    &profile,
                    attacker,
                    self.diplomacy,
                    self.outbox,
                    self.tick,
                );
            }
            CollisionTarget::Asteroid(_) => {
                projectile.dead = true;
            }
            CollisionTarget::Minable(index) => {
                if let Some(minable) = self.field.minables.get(index) {
                    let amount = profile.hull_damage_at(minable.position, minable.radius);
                    self.break_minable(index, amount);
                }
            }
            CollisionTarget::Nothing => {}
        }
        self.pending
            .visuals
            .push(Visual::new(VisualKind::Spark, impact, DVec2::ZERO));
        projectile.spend_hit();
    }

    fn detonate(&mut self, profile: &DamageProfile, projectile: &Projectile, attacker: Attacker) {
        let center = profile.origin();
        self.pending
            .visuals
            .push(Visual::new(VisualKind::Explosion, center, DVec2::ZERO));
        self.outbox.cues.push(SoundCue::Explosion { position: center });
        if !profile.is_blast() {
            return;
        }
        let def = profile.weapon();
        for ship in self.indices.ships.circle(center, def.blast_radius) {
            if def.safe && !is_enemy(self.world, self.diplomacy, projectile, ship) {
                continue;
            }
            damage_ship(
                self.world,
                ship,
                profile,
                attacker,
                self.diplomacy,
                self.outbox,
                self.tick,
            );
        }
        for index in self.indices.minables.circle(center, def.blast_radius) {
            if let Some(minable) = self.field.minables.get(index) {
                let amount = profile.hull_damage_at(minable.position, minable.radius);
                self.break_minable(index, amount);
            }
        }
    }

    fn break_minable(&mut self, index: usize, amount: f64) {
        if let Some(ore) = self.field.damage_minable(index, amount) {
            self.pending.visuals.push(Visual::new(
                VisualKind::Debris,
                ore.position,
                ore.velocity,
            ));
            self.pending.flotsam.push(Flotsam::new(
                &ore.commodity,
                ore.count,
                ore.position,
                ore.velocity,
                None,
            ));
        }
    }
}

/// Resolve every live projectile against this tick's indices.
pub fn run(
    world: &mut World,
    catalog: &WeaponCatalog,
    indices: &mut Indices,
    scene: &mut Scene,
    diplomacy: &mut Diplomacy,
    outbox: &mut Outbox,
    tick: u64,
) {
    let Scene {
        projectiles,
        asteroids,
        pending,
        ..
    } = scene;
    for projectile in projectiles.iter_mut() {
        if projectile.fresh || projectile.dead {
            continue;
        }
        let Some(def) = catalog.get(projectile.weapon) else {
            projectile.dead = true;
            continue;
        };
        let hits = candidates(world, indices, diplomacy, projectile, def);
        let mut resolver = Resolver {
            world: &mut *world,
            indices: &mut *indices,
            field: &mut *asteroids,
            pending: &mut *pending,
            diplomacy: &mut *diplomacy,
            outbox: &mut *outbox,
            tick,
        };
        for hit in hits {
            if projectile.dead {
                break;
            }
            resolver.resolve(projectile, def, hit);
        }
        if projectile.expired {
            projectile.dead = true;
        }
    }
}
