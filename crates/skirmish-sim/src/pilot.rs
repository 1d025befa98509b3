//! Pilot component: the AI (or player) controlling one ship.

use hecs::Entity;
use skirmish_core::commands::PilotCommand;
use skirmish_core::enums::{Personality, PilotPhase};

#[derive(Debug, Clone, Default)]
pub struct Pilot {
    pub personality: Personality,
    pub phase: PilotPhase,
    pub ticks_in_phase: u32,
    /// Locked target; a despawned entity reads as none.
    pub target: Option<Entity>,
    /// Control input for the current tick.
    pub command: PilotCommand,
}

impl Pilot {
    pub fn new(personality: Personality) -> Self {
        Self {
            personality,
            ..Self::default()
        }
    }
}
