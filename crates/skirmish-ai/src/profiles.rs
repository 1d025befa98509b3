//! Personality-specific behavior profiles.
//!
//! Consolidates per-personality parameters for the pilot FSM.

use skirmish_core::enums::Personality;

/// Behavioral profile for a personality.
pub struct PilotProfile {
    /// Hull fraction below which the pilot retreats. 0 disables retreat.
    pub retreat_hull: f64,
    /// Fraction of weapon range the pilot tries to hold against its target.
    pub standoff: f64,
    /// Whether disabled hostile ships are boarded.
    pub boards_hostiles: bool,
    /// Whether disabled friendly ships are assisted.
    pub assists_allies: bool,
    /// Ticks spent idle before leaving the system, if ever.
    pub idle_departure: Option<u32>,
    /// Largest facing error (radians) at which guns are fired.
    pub firing_cone: f64,
}

/// Get the behavioral profile for a given personality.
pub fn get_profile(personality: Personality) -> PilotProfile {
    match personality {
        Personality::Standard => PilotProfile {
            retreat_hull: 0.25,
            standoff: 0.6,
            boards_hostiles: false,
            assists_allies: true,
            idle_departure: Some(1800),
            firing_cone: 0.15,
        },
        Personality::Heroic => PilotProfile {
            retreat_hull: 0.0,
            standoff: 0.4,
            boards_hostiles: false,
            assists_allies: true,
            idle_departure: Some(1800),
            firing_cone: 0.2,
        },
        Personality::Timid => PilotProfile {
            retreat_hull: 0.6,
            standoff: 0.9,
            boards_hostiles: false,
            assists_allies: false,
            idle_departure: Some(600),
            firing_cone: 0.1,
        },
        Personality::Plunderer => PilotProfile {
            retreat_hull: 0.3,
            standoff: 0.5,
            boards_hostiles: true,
            assists_allies: false,
            idle_departure: Some(1800),
            firing_cone: 0.15,
        },
        Personality::Guard => PilotProfile {
            retreat_hull: 0.0,
            standoff: 0.6,
            boards_hostiles: false,
            assists_allies: true,
            idle_departure: None,
            firing_cone: 0.15,
        },
    }
}
