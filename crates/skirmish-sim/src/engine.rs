//! Simulation engine: the combat kernel.
//!
//! `SimulationEngine` owns the hecs ECS world, the per-system scene records,
//! the spatial indices and the weapon catalog. It processes player commands,
//! runs every system in a fixed order, and fills a reusable `Frame`.
//! Completely headless, enabling deterministic testing.

use std::collections::{BTreeSet, VecDeque};

use glam::DVec2;
use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use skirmish_core::commands::{PilotCommand, PlayerCommand};
use skirmish_core::components::{Body, Presence, ScanProgress};
use skirmish_core::constants::*;
use skirmish_core::enums::GamePhase;
use skirmish_core::error::ConfigError;
use skirmish_core::state::Frame;
use skirmish_core::types::{GovernmentId, SimTime, SystemId};
use skirmish_core::weapon::WeaponCatalog;

use crate::diplomacy::Diplomacy;
use crate::pilot::Pilot;
use crate::scene::{Outbox, Scene};
use crate::systems;
use crate::systems::arrival::ArrivalState;
use crate::systems::collision::Indices;
use crate::systems::movement::{MoveContext, MoveOutput};
use crate::systems::snapshot::FrameSource;
use crate::systems::spawner::Schedule;
use crate::universe::{ShipSpec, Universe};
use crate::world_setup::{self, entity_of, ship_id, Placement};

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Initial time scale (1.0 = normal).
    pub time_scale: f64,
    pub ship_cell_size: f64,
    pub ship_grid_cells: usize,
    pub asteroid_cell_size: f64,
    pub asteroid_grid_cells: usize,
    /// Period of the toroidal asteroid field.
    pub asteroid_wrap: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            time_scale: 1.0,
            ship_cell_size: SHIP_CELL_SIZE,
            ship_grid_cells: SHIP_GRID_CELLS,
            asteroid_cell_size: ASTEROID_CELL_SIZE,
            asteroid_grid_cells: ASTEROID_GRID_CELLS,
            asteroid_wrap: ASTEROID_FIELD_WRAP,
        }
    }
}

impl SimConfig {
    /// Reject sizes the broad phase and the asteroid field cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |setting: &str, reason: &str| ConfigError::InvalidSetting {
            setting: setting.into(),
            reason: reason.into(),
        };
        let lengths = [
            ("ship_cell_size", self.ship_cell_size),
            ("asteroid_cell_size", self.asteroid_cell_size),
            ("asteroid_wrap", self.asteroid_wrap),
        ];
        for (setting, value) in lengths {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(setting, "must be finite and positive"));
            }
        }
        if self.ship_grid_cells == 0 {
            return Err(invalid("ship_grid_cells", "must be at least 1"));
        }
        if self.asteroid_grid_cells == 0 {
            return Err(invalid("asteroid_grid_cells", "must be at least 1"));
        }
        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            return Err(invalid("time_scale", "must be finite and not negative"));
        }
        Ok(())
    }
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    time: SimTime,
    phase: GamePhase,
    time_scale: f64,
    rng: ChaCha8Rng,
    catalog: WeaponCatalog,
    universe: Box<dyn Universe>,
    diplomacy: Diplomacy,
    flagship: Option<Entity>,
    current_system: SystemId,
    scene: Scene,
    indices: Indices,
    schedule: Schedule,
    /// Planets that already launched their defense fleet this visit.
    defended: BTreeSet<usize>,
    command_queue: VecDeque<PlayerCommand>,
    /// Held flagship input, updated by steering commands.
    player: PilotCommand,
    clicks: Vec<DVec2>,
    outbox: Outbox,
    despawn_buffer: Vec<Entity>,
}

impl SimulationEngine {
    /// Create a new simulation engine with the given config.
    pub fn new(config: SimConfig, catalog: WeaponCatalog, universe: Box<dyn Universe>) -> Self {
        Self {
            world: World::new(),
            time: SimTime::default(),
            phase: GamePhase::default(),
            time_scale: config.time_scale.clamp(0.0, 4.0),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            catalog,
            universe,
            diplomacy: Diplomacy::default(),
            flagship: None,
            current_system: SystemId::default(),
            scene: Scene::new(config.asteroid_wrap),
            indices: Indices::new(
                config.ship_cell_size,
                config.ship_grid_cells,
                config.asteroid_cell_size,
                config.asteroid_grid_cells,
                config.asteroid_wrap,
            ),
            schedule: Schedule::default(),
            defended: BTreeSet::new(),
            command_queue: VecDeque::new(),
            player: PilotCommand::default(),
            clicks: Vec::new(),
            outbox: Outbox::default(),
            despawn_buffer: Vec::new(),
        }
    }

    /// Place the player's flagship and lay out the system it starts in.
    pub fn spawn_flagship(
        &mut self,
        spec: &ShipSpec,
        government: GovernmentId,
        system: SystemId,
        position: DVec2,
    ) -> Entity {
        let placement = Placement {
            government,
            personality: Default::default(),
            system,
            position,
            facing: 0.0,
        };
        let entity = world_setup::spawn_flagship(&mut self.world, &self.catalog, spec, placement);
        self.flagship = Some(entity);
        self.current_system = system;
        self.diplomacy.player = government;
        if let Some(star) = self.universe.system(system) {
            systems::arrival::prepare(
                &mut self.world,
                &self.catalog,
                star,
                &mut self.scene,
                &mut self.schedule,
                &mut self.rng,
                self.time.tick,
            );
        }
        entity
    }

    /// Spawn an AI ship.
    pub fn spawn_ship(&mut self, spec: &ShipSpec, placement: Placement) -> Entity {
        world_setup::spawn_ship(&mut self.world, &self.catalog, spec, placement)
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick, writing the result into `frame`.
    ///
    /// The frame is cleared first; its allocations are reused.
    pub fn step(&mut self, frame: &mut Frame) {
        self.process_commands();

        if self.phase == GamePhase::Active {
            self.run_systems();
            self.time.advance();
        }

        let source = FrameSource {
            world: &self.world,
            scene: &self.scene,
            system: self.universe.system(self.current_system),
            diplomacy: &self.diplomacy,
            flagship: self.flagship,
            current_system: self.current_system,
            time: self.time,
            phase: self.phase,
        };
        systems::snapshot::build_frame(&source, &mut self.outbox, frame);
    }

    /// Advance by one tick and return a freshly allocated frame.
    pub fn tick(&mut self) -> Frame {
        let mut frame = Frame::with_capacity();
        self.step(&mut frame);
        frame
    }

    /// Get the current game phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Get the current time scale.
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn catalog(&self) -> &WeaponCatalog {
        &self.catalog
    }

    pub fn universe(&self) -> &dyn Universe {
        self.universe.as_ref()
    }

    pub fn diplomacy(&self) -> &Diplomacy {
        &self.diplomacy
    }

    pub fn diplomacy_mut(&mut self) -> &mut Diplomacy {
        &mut self.diplomacy
    }

    pub fn flagship(&self) -> Option<Entity> {
        self.flagship
    }

    /// The system the flagship is in.
    pub fn current_system(&self) -> SystemId {
        self.current_system
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[cfg(test)]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[cfg(test)]
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single player command.
    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::Steer { thrust, turn, fire } => {
                self.player.thrust = thrust.clamp(-1.0, 1.0);
                self.player.turn = turn.clamp(-1.0, 1.0);
                self.player.fire = fire;
            }
            PlayerCommand::Click { point } => {
                self.clicks.push(point);
            }
            PlayerCommand::Target { ship } => {
                self.set_target(ship.and_then(entity_of));
            }
            PlayerCommand::Jump { destination } => {
                self.player.jump = Some(destination);
            }
            PlayerCommand::Cloak { enabled } => {
                self.player.cloak = enabled;
            }
            PlayerCommand::SetTimeScale { scale } => {
                self.time_scale = scale.clamp(0.0, 4.0);
            }
            PlayerCommand::Pause => {
                if self.phase == GamePhase::Active {
                    self.phase = GamePhase::Paused;
                }
            }
            PlayerCommand::Resume => {
                if self.phase == GamePhase::Paused {
                    self.phase = GamePhase::Active;
                }
            }
        }
    }

    /// Lock the flagship onto a ship, or clear its target.
    fn set_target(&mut self, target: Option<Entity>) {
        let Some(flagship) = self.flagship else {
            return;
        };
        let target = target.filter(|&t| t != flagship && self.world.contains(t));
        if let Ok((pilot, scan)) = self
            .world
            .query_one_mut::<(&mut Pilot, &mut ScanProgress)>(flagship)
        {
            if pilot.target != target {
                pilot.target = target;
                *scan = ScanProgress::default();
            }
        }
    }

    /// Turn deferred clicks into target selections.
    fn process_clicks(&mut self) {
        let clicks = std::mem::take(&mut self.clicks);
        let flagship = self.flagship;
        for point in clicks {
            let hit = self
                .world
                .query::<(&Body, &Presence)>()
                .iter()
                .filter(|(entity, (body, presence))| {
                    Some(*entity) != flagship
                        && presence.system == self.current_system
                        && presence.targetable
                        && body.mask_distance(point) <= 0.0
                })
                .min_by(|a, b| {
                    let da = a.1 .0.position.distance_squared(point);
                    let db = b.1 .0.position.distance_squared(point);
                    da.total_cmp(&db)
                })
                .map(|(entity, _)| entity);
            if hit.is_some() {
                self.set_target(hit);
            }
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        let tick = self.time.tick;

        // 1. The frame handoff happens outside the engine, in the app loop.
        // 2. Pilot decisions
        systems::pilot::run(
            &mut self.world,
            &self.catalog,
            self.universe.as_ref(),
            &self.diplomacy,
            &self.player,
            &mut self.outbox,
            tick,
        );
        self.player.jump = None;

        // 3. Stellar objects
        if let Some(star) = self.universe.system(self.current_system) {
            systems::stellar::run(
                &mut self.world,
                &self.catalog,
                star,
                &self.diplomacy,
                &mut self.defended,
                &mut self.rng,
                &mut self.outbox,
            );
        }

        // 4. Movement, hyperspace and firing
        let system = systems::movement::run(
            &mut self.world,
            self.flagship,
            self.current_system,
            &MoveContext {
                catalog: &self.catalog,
                universe: self.universe.as_ref(),
                tick,
            },
            &mut MoveOutput {
                rng: &mut self.rng,
                pending: &mut self.scene.pending,
                outbox: &mut self.outbox,
            },
        );

        // 5. System entry
        if system != self.current_system {
            if let Some(flagship) = self.flagship {
                systems::arrival::run(
                    &mut self.world,
                    &self.catalog,
                    self.universe.as_mut(),
                    flagship,
                    system,
                    ArrivalState {
                        scene: &mut self.scene,
                        schedule: &mut self.schedule,
                        defended: &mut self.defended,
                        rng: &mut self.rng,
                        outbox: &mut self.outbox,
                    },
                    tick,
                );
            }
            self.current_system = system;
        }

        // 6. Advance records
        systems::advance::run(
            &self.world,
            &self.catalog,
            &mut self.scene,
            self.current_system,
            tick,
        );

        // 7. Scheduled arrivals and deferred clicks
        if let Some(star) = self.universe.system(self.current_system) {
            systems::spawner::run(
                &mut self.world,
                &self.catalog,
                star,
                &mut self.schedule,
                &mut self.scene.pending,
                &mut self.rng,
                self.flagship.map(ship_id),
                &mut self.outbox,
                tick,
            );
        }
        self.process_clicks();

        // 8. Splice new records into the live lists
        self.scene.splice();

        // 9. Broad phase, point defense, projectile collisions
        self.indices
            .rebuild(&self.world, &self.scene.asteroids, self.current_system, tick);
        systems::point_defense::run(
            &mut self.world,
            &self.catalog,
            &mut self.scene,
            &self.diplomacy,
            self.current_system,
            &mut self.rng,
        );
        systems::collision::run(
            &mut self.world,
            &self.catalog,
            &mut self.indices,
            &mut self.scene,
            &mut self.diplomacy,
            &mut self.outbox,
            tick,
        );

        // 10. Weather damage
        systems::weather::run(
            &mut self.world,
            &self.catalog,
            &mut self.indices,
            &self.scene.weather,
            &mut self.diplomacy,
            &mut self.outbox,
            tick,
        );

        // 11. Flotsam collection and tractor pull
        systems::flotsam::run(&mut self.world, &mut self.indices, &mut self.scene.flotsam);

        // 12. Scanning
        systems::scanning::run(&mut self.world, self.current_system, &mut self.outbox, tick);

        // 13. Cleanup
        systems::cleanup::run(
            &mut self.world,
            &mut self.scene,
            self.current_system,
            &mut self.rng,
            &mut self.despawn_buffer,
            &mut self.outbox,
            tick,
        );
        if let Some(flagship) = self.flagship {
            if !self.world.contains(flagship) {
                tracing::debug!("flagship lost");
                self.flagship = None;
            }
        }
    }
}
