//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Top-level simulation state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Active,
    Paused,
}

/// The kind of mount a hardpoint is, fixed when the hull is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MountType {
    /// Fixed forward-firing mount.
    Gun,
    /// Free-aiming mount.
    Turret,
}

/// Pilot behavior phase, evaluated by the AI FSM.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PilotPhase {
    /// No target; holding position or drifting.
    #[default]
    Idle,
    /// Closing on and firing at a hostile target.
    Engage,
    /// Hull low; running from the fight.
    Retreat,
    /// Matching velocity with a disabled ship to board or assist it.
    Board,
    /// Leaving the system through hyperspace.
    Jump,
    /// Disabled; no control.
    Disabled,
}

/// What a scanner reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanKind {
    Cargo,
    Outfits,
}

/// Notification kinds consumed by AI, mission, and UI layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipEventKind {
    /// Hull dropped below the disabled threshold.
    Disable,
    /// Hull dropped below zero.
    Destroy,
    /// A non-hostile government was attacked.
    Provoke,
    /// A disabled hostile ship was boarded.
    Board,
    /// A disabled friendly ship was repaired in place.
    Assist,
    /// A ship became targetable in the flagship's system.
    Encounter,
    /// A scan completed.
    Scan(ScanKind),
}

/// Visual effect kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualKind {
    Explosion,
    Spark,
    Debris,
}

/// How a radar blip is colored relative to the flagship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RadarRelation {
    Player,
    Friendly,
    Neutral,
    Hostile,
    Inactive,
    Special,
}

/// What a draw-list entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawKind {
    Ship,
    Projectile,
    Asteroid,
    Minable,
    Flotsam,
    Visual(VisualKind),
    Planet,
}

/// Pilot temperament, selecting a behavior profile in the AI crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Personality {
    /// Fights, retreats when badly hurt, assists allies.
    #[default]
    Standard,
    /// Never retreats.
    Heroic,
    /// Retreats early and avoids boarding.
    Timid,
    /// Boards disabled hostiles for plunder.
    Plunderer,
    /// Patrols a system and never leaves on its own.
    Guard,
}
