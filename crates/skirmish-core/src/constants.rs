//! Simulation constants and tuning parameters.
//!
//! Distances are in world units, durations in ticks unless a name says
//! otherwise. Speeds are units per tick.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Spatial index ---

/// Cell edge of the ship broad-phase grid.
pub const SHIP_CELL_SIZE: f64 = 256.0;

/// Cells per side of the ship grid table (power of two).
pub const SHIP_GRID_CELLS: usize = 32;

/// Cell edge of the asteroid / minable grid.
pub const ASTEROID_CELL_SIZE: f64 = 128.0;

/// Cells per side of the asteroid grid table (power of two).
pub const ASTEROID_GRID_CELLS: usize = 32;

/// Wrap period of an asteroid field (world units, square).
pub const ASTEROID_FIELD_WRAP: f64 = 4096.0;

// --- Damage model ---

/// Divisor term for disruption when computing shield bleed.
pub const DISRUPTION_BLEED_FACTOR: f64 = 0.01;

/// Quadratic trigger-radius term in blast falloff.
pub const BLAST_TRIGGER_FACTOR: f64 = 0.25;

// --- Damage over time ---

/// Multiplicative decay applied to every DoT channel each tick.
pub const DOT_DECAY: f64 = 0.99;

/// Hull lost per tick per point of corrosion.
pub const CORROSION_HULL_RATE: f64 = 1.0;

/// Shields lost per tick per point of discharge.
pub const DISCHARGE_SHIELD_RATE: f64 = 1.0;

/// Energy lost per tick per point of ionization.
pub const IONIZATION_ENERGY_RATE: f64 = 1.0;

/// Heat gained per tick per point of burning.
pub const BURNING_HEAT_RATE: f64 = 1.0;

/// Fuel lost per tick per point of leakage.
pub const LEAKAGE_FUEL_RATE: f64 = 1.0;

/// Thrust and turn are divided by `1 + slowness * SLOWNESS_FACTOR`.
pub const SLOWNESS_FACTOR: f64 = 0.05;

/// Chance of a weapon jam per point of scrambling, capped at 1.
pub const SCRAMBLE_JAM_CHANCE: f64 = 0.01;

/// Levels below this snap to zero.
pub const DOT_EPSILON: f64 = 1e-6;

// --- Ships ---

/// Heat is multiplied by this each tick (passive dissipation floor).
pub const BASE_HEAT_RETENTION: f64 = 0.999;

/// Ticks a hyperspace jump takes from engage to arrival.
pub const HYPERSPACE_TICKS: u32 = 100;

/// Distance from system center at which hyperspace arrivals appear.
pub const HYPERSPACE_ARRIVAL_DISTANCE: f64 = 2000.0;

/// Fuel spent to start a hyperspace jump.
pub const JUMP_FUEL: f64 = 100.0;

/// Acceleration applied while spooling up for a jump.
pub const HYPERSPACE_ACCELERATION: f64 = 0.5;

/// Range within which a planet reacts to hostile ships.
pub const PLANET_DEFENSE_RANGE: f64 = 1200.0;

/// Maximum distance from a disabled ship at which boarding succeeds.
pub const BOARDING_RANGE: f64 = 60.0;

/// Maximum relative speed for boarding.
pub const BOARDING_SPEED: f64 = 1.0;

/// Cloak level at and above which a ship is untargetable.
pub const CLOAK_UNTARGETABLE: f64 = 1.0;

// --- Projectiles ---

/// Homing turn rate multiplier (radians per tick per homing point).
pub const HOMING_TURN_RATE: f64 = 0.02;

// --- Flotsam ---

/// Ticks before flotsam expires.
pub const FLOTSAM_LIFETIME: u32 = 3600;

/// Ticks during which the ship that dumped flotsam cannot re-collect it.
pub const FLOTSAM_SOURCE_IMMUNITY: u32 = 300;

/// Drag applied to drifting flotsam velocity each tick.
pub const FLOTSAM_DRAG: f64 = 0.999;

/// Pickup distance from a ship's mask edge.
pub const FLOTSAM_PICKUP_RANGE: f64 = 10.0;

/// Ore tons dropped by a destroyed minable.
pub const MINABLE_ORE_YIELD: u32 = 5;

// --- Visuals ---

/// Lifetime of an explosion visual.
pub const EXPLOSION_LIFETIME: u32 = 45;

/// Lifetime of a spark visual.
pub const SPARK_LIFETIME: u32 = 12;

/// Explosion visuals spawned per destroyed ship.
pub const SHIP_EXPLOSION_COUNT: usize = 6;

// --- Scanning ---

/// Progress needed to complete a scan.
pub const SCAN_COMPLETE: f64 = 600.0;

// --- Frame ---

/// Draw entries reserved per frame buffer.
pub const FRAME_DRAW_CAPACITY: usize = 1024;

/// Radar entries reserved per frame buffer.
pub const FRAME_RADAR_CAPACITY: usize = 256;
