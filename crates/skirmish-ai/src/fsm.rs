//! Pilot behavior finite state machine.
//!
//! Pure functions that compute phase transitions and control input for one
//! ship from a snapshot of its situation. No ECS dependency; operates on
//! plain data.

use glam::DVec2;
use skirmish_core::commands::PilotCommand;
use skirmish_core::constants::{BOARDING_RANGE, BOARDING_SPEED};
use skirmish_core::enums::{Personality, PilotPhase};
use skirmish_core::types::{angle_delta, angle_of, ShipId, SystemId};

use crate::profiles::{get_profile, PilotProfile};

/// Another ship as seen by the pilot.
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    pub id: ShipId,
    pub position: DVec2,
    pub velocity: DVec2,
    pub disabled: bool,
    pub hostile: bool,
}

/// Input to the pilot FSM for a single ship.
pub struct PilotContext {
    pub personality: Personality,
    pub phase: PilotPhase,
    pub disabled: bool,
    pub position: DVec2,
    pub velocity: DVec2,
    pub facing: f64,
    /// Radians per tick at full turn input.
    pub turn_rate: f64,
    pub hull_fraction: f64,
    /// Reach of the longest primary weapon, 0 if unarmed.
    pub weapon_range: f64,
    /// Nearest active hostile in the same system.
    pub enemy: Option<Contact>,
    /// Nearest disabled ship this pilot may board or assist.
    pub disabled_contact: Option<Contact>,
    /// A linked system to flee or depart to.
    pub exit: Option<SystemId>,
    /// Whether a hyperspace jump is already under way.
    pub jumping: bool,
    pub ticks_in_phase: u32,
}

/// What the pilot does to another ship this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PilotAction {
    Board(ShipId),
    Assist(ShipId),
}

/// Output from the pilot FSM.
pub struct PilotUpdate {
    pub new_phase: PilotPhase,
    pub phase_changed: bool,
    pub command: PilotCommand,
    /// Target to lock, `None` to clear.
    pub target: Option<ShipId>,
    pub action: Option<PilotAction>,
}

impl PilotUpdate {
    fn stay(ctx: &PilotContext, command: PilotCommand, target: Option<ShipId>) -> Self {
        Self {
            new_phase: ctx.phase,
            phase_changed: false,
            command,
            target,
            action: None,
        }
    }

    fn go(ctx: &PilotContext, phase: PilotPhase, command: PilotCommand, target: Option<ShipId>) -> Self {
        Self {
            new_phase: phase,
            phase_changed: phase != ctx.phase,
            command,
            target,
            action: None,
        }
    }
}

/// Evaluate the FSM for one ship.
pub fn evaluate(ctx: &PilotContext) -> PilotUpdate {
    if ctx.disabled {
        return PilotUpdate::go(ctx, PilotPhase::Disabled, PilotCommand::default(), None);
    }

    let profile = get_profile(ctx.personality);

    match ctx.phase {
        PilotPhase::Disabled => PilotUpdate::go(ctx, PilotPhase::Idle, PilotCommand::default(), None),
        PilotPhase::Jump => evaluate_jump(ctx),
        PilotPhase::Retreat => evaluate_retreat(ctx, &profile),
        PilotPhase::Board => evaluate_board(ctx, &profile),
        PilotPhase::Engage => evaluate_engage(ctx, &profile),
        PilotPhase::Idle => evaluate_idle(ctx, &profile),
    }
}

fn wants_retreat(ctx: &PilotContext, profile: &PilotProfile) -> bool {
    profile.retreat_hull > 0.0 && ctx.hull_fraction < profile.retreat_hull && ctx.enemy.is_some()
}

fn may_board(contact: &Contact, profile: &PilotProfile) -> bool {
    contact.disabled
        && ((contact.hostile && profile.boards_hostiles)
            || (!contact.hostile && profile.assists_allies))
}

fn evaluate_idle(ctx: &PilotContext, profile: &PilotProfile) -> PilotUpdate {
    if wants_retreat(ctx, profile) {
        return evaluate_retreat(ctx, profile);
    }
    if let Some(enemy) = ctx.enemy {
        if ctx.weapon_range > 0.0 {
            return PilotUpdate::go(ctx, PilotPhase::Engage, engage_command(ctx, &enemy, profile), Some(enemy.id));
        }
    }
    if let Some(contact) = ctx.disabled_contact.filter(|c| may_board(c, profile)) {
        return PilotUpdate::go(ctx, PilotPhase::Board, approach_command(ctx, &contact), Some(contact.id));
    }
    if let (Some(limit), Some(exit)) = (profile.idle_departure, ctx.exit) {
        if ctx.ticks_in_phase >= limit {
            return PilotUpdate::go(ctx, PilotPhase::Jump, jump_command(exit), None);
        }
    }
    PilotUpdate::stay(ctx, brake_command(ctx), None)
}

fn evaluate_engage(ctx: &PilotContext, profile: &PilotProfile) -> PilotUpdate {
    if wants_retreat(ctx, profile) {
        return evaluate_retreat(ctx, profile);
    }
    match ctx.enemy {
        Some(enemy) => PilotUpdate::stay(ctx, engage_command(ctx, &enemy, profile), Some(enemy.id)),
        None => PilotUpdate::go(ctx, PilotPhase::Idle, brake_command(ctx), None),
    }
}

fn evaluate_retreat(ctx: &PilotContext, profile: &PilotProfile) -> PilotUpdate {
    let Some(enemy) = ctx.enemy else {
        return PilotUpdate::go(ctx, PilotPhase::Idle, brake_command(ctx), None);
    };
    if let Some(exit) = ctx.exit {
        return PilotUpdate::go(ctx, PilotPhase::Jump, jump_command(exit), None);
    }
    let away = angle_of(ctx.position - enemy.position);
    let command = PilotCommand {
        thrust: 1.0,
        turn: turn_toward(ctx, away),
        ..Default::default()
    };
    // Cornered: keep shooting if the enemy happens to be ahead.
    let mut update = PilotUpdate::go(ctx, PilotPhase::Retreat, command, Some(enemy.id));
    update.command.fire = in_firing_cone(ctx, &enemy, profile);
    update
}

fn evaluate_board(ctx: &PilotContext, profile: &PilotProfile) -> PilotUpdate {
    if wants_retreat(ctx, profile) {
        return evaluate_retreat(ctx, profile);
    }
    let Some(contact) = ctx.disabled_contact.filter(|c| may_board(c, profile)) else {
        return PilotUpdate::go(ctx, PilotPhase::Idle, brake_command(ctx), None);
    };
    let distance = ctx.position.distance(contact.position);
    let relative_speed = (ctx.velocity - contact.velocity).length();
    if distance <= BOARDING_RANGE && relative_speed <= BOARDING_SPEED {
        let action = if contact.hostile {
            PilotAction::Board(contact.id)
        } else {
            PilotAction::Assist(contact.id)
        };
        let mut update = PilotUpdate::go(ctx, PilotPhase::Idle, PilotCommand::default(), None);
        update.action = Some(action);
        return update;
    }
    PilotUpdate::stay(ctx, approach_command(ctx, &contact), Some(contact.id))
}

fn evaluate_jump(ctx: &PilotContext) -> PilotUpdate {
    if ctx.jumping {
        return PilotUpdate::stay(ctx, PilotCommand::default(), None);
    }
    match ctx.exit {
        Some(exit) => PilotUpdate::stay(ctx, jump_command(exit), None),
        None => PilotUpdate::go(ctx, PilotPhase::Idle, PilotCommand::default(), None),
    }
}

// ---- Steering ----

/// Turn input that rotates the ship toward `angle`, saturating at ±1.
fn turn_toward(ctx: &PilotContext, angle: f64) -> f64 {
    let delta = angle_delta(ctx.facing, angle);
    if ctx.turn_rate <= 0.0 {
        return delta.signum();
    }
    (delta / ctx.turn_rate).clamp(-1.0, 1.0)
}

fn in_firing_cone(ctx: &PilotContext, enemy: &Contact, profile: &PilotProfile) -> bool {
    let to_enemy = enemy.position - ctx.position;
    let distance = to_enemy.length();
    distance <= ctx.weapon_range
        && angle_delta(ctx.facing, angle_of(to_enemy)).abs() <= profile.firing_cone
}

fn engage_command(ctx: &PilotContext, enemy: &Contact, profile: &PilotProfile) -> PilotCommand {
    let to_enemy = enemy.position - ctx.position;
    let distance = to_enemy.length();
    let bearing = angle_of(to_enemy);
    let facing_error = angle_delta(ctx.facing, bearing).abs();
    let thrust = if distance > ctx.weapon_range * profile.standoff && facing_error < 0.5 {
        1.0
    } else {
        0.0
    };
    PilotCommand {
        thrust,
        turn: turn_toward(ctx, bearing),
        fire: in_firing_cone(ctx, enemy, profile),
        aim: Some(enemy.position),
        ..Default::default()
    }
}

/// Close on a contact while matching its velocity.
fn approach_command(ctx: &PilotContext, contact: &Contact) -> PilotCommand {
    let offset = contact.position - ctx.position;
    let desired = contact.velocity + offset * 0.02;
    let correction = desired - ctx.velocity;
    if correction.length() <= BOARDING_SPEED * 0.5 {
        return PilotCommand::default();
    }
    let heading = angle_of(correction);
    let aligned = angle_delta(ctx.facing, heading).abs() < 0.3;
    PilotCommand {
        thrust: if aligned { 1.0 } else { 0.0 },
        turn: turn_toward(ctx, heading),
        ..Default::default()
    }
}

/// Turn against the current velocity and burn to a stop.
fn brake_command(ctx: &PilotContext) -> PilotCommand {
    if ctx.velocity.length() < 0.1 {
        return PilotCommand::default();
    }
    let heading = angle_of(-ctx.velocity);
    let aligned = angle_delta(ctx.facing, heading).abs() < 0.3;
    PilotCommand {
        thrust: if aligned { 1.0 } else { 0.0 },
        turn: turn_toward(ctx, heading),
        ..Default::default()
    }
}

fn jump_command(exit: SystemId) -> PilotCommand {
    PilotCommand {
        jump: Some(exit),
        ..Default::default()
    }
}
